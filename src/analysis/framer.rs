//! Overlapping analysis windows over a mono signal.

use std::iter::FusedIterator;

/// Number of full windows of `window_size` samples, `hop_size` apart, in `len` samples.
pub fn frame_count(len: usize, window_size: usize, hop_size: usize) -> usize {
    if window_size == 0 || hop_size == 0 || len < window_size {
        return 0;
    }
    (len - window_size) / hop_size + 1
}

/// Contiguous windows starting at `0, hop, 2*hop, ...` while the window fits.
/// Clones walk the remaining windows independently.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    samples: &'a [f64],
    window_size: usize,
    hop_size: usize,
    offset: usize,
}

/// # Panics
///
/// Panics if `window_size` or `hop_size` is zero.
pub fn frames(samples: &[f64], window_size: usize, hop_size: usize) -> Frames<'_> {
    assert!(window_size > 0, "window size must be positive");
    assert!(hop_size > 0, "hop size must be positive");
    Frames {
        samples,
        window_size,
        hop_size,
        offset: 0,
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.offset.checked_add(self.window_size)?;
        if end > self.samples.len() {
            return None;
        }
        let frame = &self.samples[self.offset..end];
        self.offset = self.offset.saturating_add(self.hop_size);
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .samples
            .len()
            .checked_sub(self.offset)
            .map_or(0, |len| frame_count(len, self.window_size, self.hop_size));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl FusedIterator for Frames<'_> {}
