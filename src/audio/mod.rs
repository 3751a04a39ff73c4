pub mod decode;
pub mod metadata;
pub mod signal;

pub use decode::{decode_file, DecodeError, DecodedAudio};
pub use metadata::{AudioMetadata, TrackTags};
pub use signal::{mixdown, Signal};
