mod encoder;
mod storage;
mod types;

pub use encoder::{data_uri, encode_bytes, encode_image};
pub use storage::{discard_temp_image, write_temp_image};
pub use types::ImageKind;
