use std::io::{Read, Write};

use crate::error::{ChunkError, Result};

/// Format version written at the start of every stream.
///
/// Stored as a little-endian `f32`; readers reject any stream whose version
/// field is not exactly this value.
pub const FORMAT_VERSION: f32 = 4.0;

/// Width of every size field in the header, in bytes.
///
/// Fixed at 8 (`u64` LE) regardless of the host's `usize` width so streams
/// written on one platform decode on any other.
pub const SIZE_WORD_LEN: usize = 8;

/// Safety margin added to a chunk's raw length when sizing compression output.
/// A conforming block codec never expands a chunk by more than this.
pub const COMPRESS_OVERHEAD: usize = 400;

/// Default (and largest allowed) uncompressed bytes per chunk.
pub const MAX_CHUNK: usize = u32::MAX as usize - COMPRESS_OVERHEAD;

/// Largest chunk count the 1-byte `chunk_count` field can hold.
pub const MAX_CHUNKS: usize = u8::MAX as usize;

/// Bytes occupied by the header fields that do not depend on the chunk count.
///   version:f32 + chunk_count:u8 + total_uncompressed_bytes:u64
///   = 4 + 1 + 8 = 13
pub const FIXED_HEADER_LEN: usize = 4 + 1 + SIZE_WORD_LEN;

// ── Header ─────────────────────────────────────────────────────────────────

/// Decoded stream header.
///
/// ```text
/// [version: f32 LE][chunk_count: u8][chunk_sizes: u64 LE × N][total: u64 LE]
/// ```
/// followed by `sum(chunk_sizes)` bytes of concatenated compressed chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamHeader {
    /// Compressed byte length of each chunk, in stream order.
    pub chunk_sizes: Vec<u64>,
    /// Decompressed byte length of all chunks combined.
    pub total_uncompressed_bytes: u64,
}

impl StreamHeader {
    /// Number of chunks that follow the header.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunk_sizes.len()
    }

    /// Serialized length of this header in bytes.
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN + self.chunk_count() * SIZE_WORD_LEN
    }

    /// Total compressed payload bytes (excluding the header).
    pub fn compressed_len(&self) -> u64 {
        self.chunk_sizes.iter().sum()
    }

    /// Number of whole `T` elements the stream decodes to.
    pub fn element_count<T>(&self) -> usize {
        let total = usize::try_from(self.total_uncompressed_bytes).unwrap_or(usize::MAX);
        total.checked_div(std::mem::size_of::<T>()).unwrap_or(0)
    }

    /// Compression ratio (uncompressed / compressed payload).
    pub fn ratio(&self) -> f64 {
        let compressed = self.compressed_len();
        if compressed == 0 {
            return 1.0;
        }
        self.total_uncompressed_bytes as f64 / compressed as f64
    }

    /// Serialize to exactly `encoded_len()` bytes.
    ///
    /// Fails with [`ChunkError::TooManyChunks`] if there are more chunk sizes
    /// than the 1-byte count field can describe.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = u8::try_from(self.chunk_count()).map_err(|_| ChunkError::TooManyChunks {
            chunks: self.chunk_count(),
            max_chunks: MAX_CHUNKS,
        })?;

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.push(count);
        for size in &self.chunk_sizes {
            buf.extend_from_slice(&size.to_le_bytes());
        }
        buf.extend_from_slice(&self.total_uncompressed_bytes.to_le_bytes());
        Ok(buf)
    }

    /// Write the serialized header to `writer`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Read a header from the current position of `reader`.
    ///
    /// The version is checked as soon as its 4 bytes are read; nothing past
    /// it is consumed when it does not match. On success the reader is left
    /// at the first payload byte.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut version_buf = [0u8; 4];
        reader.read_exact(&mut version_buf)?;
        let found = f32::from_le_bytes(version_buf);
        if found != FORMAT_VERSION {
            return Err(ChunkError::VersionMismatch {
                expected: FORMAT_VERSION,
                found,
            });
        }

        let mut count_buf = [0u8; 1];
        reader.read_exact(&mut count_buf)?;
        let count = count_buf[0] as usize;

        let mut word = [0u8; SIZE_WORD_LEN];
        let mut chunk_sizes = Vec::with_capacity(count);
        for _ in 0..count {
            reader.read_exact(&mut word)?;
            chunk_sizes.push(u64::from_le_bytes(word));
        }

        reader.read_exact(&mut word)?;
        let total_uncompressed_bytes = u64::from_le_bytes(word);

        Ok(Self {
            chunk_sizes,
            total_uncompressed_bytes,
        })
    }
}

/// Convert a size-word read from a stream into a host `usize`.
pub(crate) fn size_to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| ChunkError::SizeOverflow { value })
}
