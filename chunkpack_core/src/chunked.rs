use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::Pod;
use tracing::{debug, trace, warn};

use crate::codec::BlockCodec;
use crate::error::{ChunkError, Result};
use crate::format::{size_to_usize, StreamHeader, COMPRESS_OVERHEAD, MAX_CHUNK, MAX_CHUNKS};

/// Where a [`ChunkedCodec`] is in its read session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// Fresh, reset, or after a rejected header.
    Idle,
    /// Header parsed; the payload is next in the stream.
    HeaderRead,
    /// Payload decoded into a destination buffer.
    Decoded,
}

/// Splits typed buffers into independently compressed chunks and reads them back.
///
/// # Write
/// [`write_compressed`] views the source as bytes, cuts it into chunks of at
/// most `max_chunk` bytes, compresses each with the block codec, and writes
/// the header followed by the concatenated compressed chunks.
///
/// # Read
/// Two modes:
/// 1. [`read_header`] alone, then [`get_size`] to size a destination,
///    then [`read_compressed_block`] to decode the payload.
/// 2. [`read_all`] when the destination is already sized.
///
/// Decoding verifies that the chunks decompress to exactly the total the
/// header declares. A failed decode drops the decompressor scratch state; the
/// instance refuses further decodes until [`reset`] rebuilds it.
///
/// [`write_compressed`]: ChunkedCodec::write_compressed
/// [`read_header`]: ChunkedCodec::read_header
/// [`get_size`]: ChunkedCodec::get_size
/// [`read_compressed_block`]: ChunkedCodec::read_compressed_block
/// [`read_all`]: ChunkedCodec::read_all
/// [`reset`]: ChunkedCodec::reset
pub struct ChunkedCodec<T, C: BlockCodec> {
    codec: C,
    max_chunk: usize,
    header: Option<StreamHeader>,
    session: Session,
    compress_state: C::CompressState,
    /// `None` once a decode has failed part-way.
    decompress_state: Option<C::DecompressState>,
    _elem: PhantomData<fn() -> T>,
}

impl<T: Pod, C: BlockCodec> ChunkedCodec<T, C> {
    const ELEM_SIZE: usize = {
        assert!(size_of::<T>() > 0, "element type must not be zero-sized");
        size_of::<T>()
    };

    /// Create a codec that cuts chunks at [`MAX_CHUNK`] bytes.
    pub fn new(codec: C) -> Result<Self> {
        Self::with_max_chunk(codec, MAX_CHUNK)
    }

    /// Create a codec with a lower chunk limit.
    ///
    /// `max_chunk` must be in `1..=MAX_CHUNK`.
    pub fn with_max_chunk(codec: C, max_chunk: usize) -> Result<Self> {
        if max_chunk == 0 || max_chunk > MAX_CHUNK {
            return Err(ChunkError::InvalidMaxChunk {
                requested: max_chunk,
                max: MAX_CHUNK,
            });
        }
        let _ = Self::ELEM_SIZE;

        let compress_state = codec.compress_state()?;
        let decompress_state = codec.decompress_state()?;
        Ok(Self {
            codec,
            max_chunk,
            header: None,
            session: Session::Idle,
            compress_state,
            decompress_state: Some(decompress_state),
            _elem: PhantomData,
        })
    }

    #[inline]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Largest number of uncompressed bytes put in one chunk.
    #[inline]
    pub fn max_chunk(&self) -> usize {
        self.max_chunk
    }

    #[inline]
    pub fn session(&self) -> Session {
        self.session
    }

    /// The most recently parsed header, if the session still holds one.
    pub fn header(&self) -> Option<&StreamHeader> {
        self.header.as_ref()
    }

    /// Clear parsed header metadata and rebuild both scratch states.
    ///
    /// Only fails if the block codec cannot allocate new scratch state, in
    /// which case the instance stays unable to decode.
    pub fn reset(&mut self) -> Result<()> {
        self.header = None;
        self.session = Session::Idle;
        self.decompress_state = None;

        self.compress_state = self.codec.compress_state()?;
        self.decompress_state = Some(self.codec.decompress_state()?);
        Ok(())
    }

    /// Parse the stream header, leaving `input` at the first payload byte.
    ///
    /// Any previously parsed header is discarded first, so a rejected stream
    /// leaves the instance idle and ready for the next one.
    pub fn read_header<R: Read>(&mut self, input: &mut R) -> Result<()> {
        self.header = None;
        self.session = Session::Idle;

        let header = StreamHeader::read_from(input)?;
        debug!(
            chunks = header.chunk_count(),
            compressed_bytes = header.compressed_len(),
            total_bytes = header.total_uncompressed_bytes,
            "read stream header"
        );
        self.header = Some(header);
        self.session = Session::HeaderRead;
        Ok(())
    }

    /// Number of `T` elements the parsed stream decodes to (0 with no header).
    pub fn get_size(&self) -> usize {
        self.header
            .as_ref()
            .map_or(0, |h| h.element_count::<T>())
    }

    /// Decode the payload that follows a header read by [`read_header`].
    ///
    /// Chunks are decompressed in order into `destination` back to back.
    /// `destination` must hold at least [`get_size`](ChunkedCodec::get_size)
    /// elements. Returns the number of `T` elements written.
    ///
    /// [`read_header`]: ChunkedCodec::read_header
    pub fn read_compressed_block<R: Read>(
        &mut self,
        input: &mut R,
        destination: &mut [T],
    ) -> Result<usize> {
        let Some(header) = self
            .header
            .as_ref()
            .filter(|_| self.session == Session::HeaderRead)
        else {
            return Err(ChunkError::HeaderNotRead);
        };
        let dst: &mut [u8] = bytemuck::cast_slice_mut(destination);
        let needed = size_to_usize(header.total_uncompressed_bytes)?;
        if dst.len() < needed {
            return Err(ChunkError::DestinationTooSmall {
                needed,
                capacity: dst.len(),
            });
        }

        let mut state = self
            .decompress_state
            .take()
            .ok_or(ChunkError::ScratchInvalidated)?;

        match decode_chunks(&self.codec, &mut state, header, input, dst) {
            Ok(decoded) => {
                self.decompress_state = Some(state);
                self.session = Session::Decoded;
                Ok(decoded as usize / Self::ELEM_SIZE)
            }
            Err(err) => {
                warn!(codec = self.codec.name(), error = %err, "decode failed, decompressor state dropped");
                Err(err)
            }
        }
    }

    /// [`read_header`](ChunkedCodec::read_header) followed by
    /// [`read_compressed_block`](ChunkedCodec::read_compressed_block).
    pub fn read_all<R: Read>(&mut self, input: &mut R, destination: &mut [T]) -> Result<usize> {
        self.read_header(input)?;
        self.read_compressed_block(input, destination)
    }

    /// Compress `source` and write header plus payload to `output`.
    ///
    /// Nothing is written when the buffer needs more chunks than the header
    /// can count. Returns the number of chunks written.
    pub fn write_compressed<W: Write>(&mut self, source: &[T], output: &mut W) -> Result<usize> {
        let raw: &[u8] = bytemuck::cast_slice(source);
        let length = raw.len();

        let chunks = length.div_ceil(self.max_chunk);
        if chunks > MAX_CHUNKS {
            return Err(ChunkError::TooManyChunks {
                chunks,
                max_chunks: MAX_CHUNKS,
            });
        }

        let mut payload = Vec::with_capacity(length + COMPRESS_OVERHEAD);
        let mut chunk_sizes = Vec::with_capacity(chunks);
        for (idx, chunk) in raw.chunks(self.max_chunk).enumerate() {
            let compressed = self.codec.compress(&mut self.compress_state, chunk)?;
            trace!(chunk = idx, raw = chunk.len(), compressed = compressed.len(), "compressed chunk");
            chunk_sizes.push(compressed.len() as u64);
            payload.extend_from_slice(&compressed);
        }

        let header = StreamHeader {
            chunk_sizes,
            total_uncompressed_bytes: length as u64,
        };
        header.write_to(output)?;
        output.write_all(&payload)?;
        output.flush()?;

        debug!(
            codec = self.codec.name(),
            chunks,
            raw_bytes = length,
            compressed_bytes = payload.len(),
            "wrote chunked stream"
        );
        Ok(chunks)
    }
}

fn decode_chunks<C: BlockCodec, R: Read>(
    codec: &C,
    state: &mut C::DecompressState,
    header: &StreamHeader,
    input: &mut R,
    dst: &mut [u8],
) -> Result<u64> {
    let total = size_to_usize(header.total_uncompressed_bytes)?;
    let mut decoded = 0usize;
    if total > 0 {
        let mut compressed = Vec::new();
        for (idx, &size) in header.chunk_sizes.iter().enumerate() {
            let size = size_to_usize(size)?;
            compressed.clear();
            input.by_ref().take(size as u64).read_to_end(&mut compressed)?;
            if compressed.len() != size {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("chunk {idx} truncated: expected {size} bytes, got {}", compressed.len()),
                )
                .into());
            }

            // A chunk claiming more than the header has left is corrupt.
            let raw_len = codec.decompressed_size(&compressed)?;
            if raw_len > total - decoded {
                return Err(ChunkError::SizeMismatch {
                    expected: header.total_uncompressed_bytes,
                    actual: (decoded + raw_len) as u64,
                });
            }

            let written = codec.decompress(state, &compressed, &mut dst[decoded..decoded + raw_len])?;
            trace!(chunk = idx, compressed = size, raw = raw_len, written, "decoded chunk");
            decoded += written;
            if written != raw_len {
                return Err(ChunkError::SizeMismatch {
                    expected: header.total_uncompressed_bytes,
                    actual: decoded as u64,
                });
            }
        }
    }

    let decoded = decoded as u64;
    if decoded != header.total_uncompressed_bytes {
        return Err(ChunkError::SizeMismatch {
            expected: header.total_uncompressed_bytes,
            actual: decoded,
        });
    }
    Ok(decoded)
}
