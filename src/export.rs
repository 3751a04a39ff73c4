//! Raw byte views of flux curves for transport across process boundaries.
//!
//! Values are native-endian f64. Reading goes through bounds-checked casts,
//! so unaligned or truncated input is handled without pointer tricks.

use std::path::Path;
use thiserror::Error;

const VALUE_BYTES: usize = std::mem::size_of::<f64>();

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{len} bytes is not a whole number of f64 values")]
    Truncated { len: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Zero-copy view of a curve as bytes.
pub fn curve_as_bytes(curve: &[f64]) -> &[u8] {
    bytemuck::cast_slice(curve)
}

pub fn curve_from_bytes(bytes: &[u8]) -> Result<Vec<f64>, ExportError> {
    if bytes.len() % VALUE_BYTES != 0 {
        return Err(ExportError::Truncated { len: bytes.len() });
    }
    match bytemuck::try_cast_slice::<u8, f64>(bytes) {
        Ok(values) => Ok(values.to_vec()),
        // Misaligned buffer: copy value by value.
        Err(_) => Ok(bytes
            .chunks_exact(VALUE_BYTES)
            .map(bytemuck::pod_read_unaligned::<f64>)
            .collect()),
    }
}

pub fn write_curve(path: &Path, curve: &[f64]) -> Result<(), ExportError> {
    std::fs::write(path, curve_as_bytes(curve))?;
    Ok(())
}

pub fn read_curve(path: &Path) -> Result<Vec<f64>, ExportError> {
    curve_from_bytes(&std::fs::read(path)?)
}
