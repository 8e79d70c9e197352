pub(crate) mod decode;
pub(crate) mod media;

pub use decode::ImageAsset;
pub use media::{AudioAsset, MediaInput, MediaKind, sniff_mime};
