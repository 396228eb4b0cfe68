use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChunkError>;

/// Errors produced while writing or reading a chunked stream.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("incompatible stream version: expected {expected}, found {found}")]
    VersionMismatch { expected: f32, found: f32 },

    #[error("expected size and uncompressed size don't match\nexpected: {expected} got: {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("buffer needs {chunks} chunks but a stream holds at most {max_chunks}")]
    TooManyChunks { chunks: usize, max_chunks: usize },

    #[error("destination too small: chunk needs {needed} bytes, {capacity} available")]
    DestinationTooSmall { needed: usize, capacity: usize },

    #[error("no stream header has been read")]
    HeaderNotRead,

    /// A previous decode failed part-way; the decompressor state must be
    /// rebuilt with `reset()` before it is used again.
    #[error("decompressor state invalidated by a failed decode; call reset() first")]
    ScratchInvalidated,

    #[error("max chunk size must be between 1 and {max} bytes, got {requested}")]
    InvalidMaxChunk { requested: usize, max: usize },

    #[error("size {value} does not fit in this platform's usize")]
    SizeOverflow { value: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] anyhow::Error),
}
