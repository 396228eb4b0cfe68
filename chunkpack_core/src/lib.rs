pub mod chunked;
pub mod codec;
pub mod error;
pub mod format;

pub use chunked::{ChunkedCodec, Session};
pub use codec::BlockCodec;
pub use error::{ChunkError, Result};
pub use format::{StreamHeader, FORMAT_VERSION, MAX_CHUNK};
