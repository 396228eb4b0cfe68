use chunkpack_core::BlockCodec;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::{size_prefix, split_size_prefix, SIZE_PREFIX_LEN};

/// Raw DEFLATE block codec.
///
/// Blocks are a `u32` LE raw length followed by a raw (headerless) deflate
/// stream. The `flate2` compressor and decompressor are kept as scratch state
/// and reset before every chunk.
pub struct DeflateCodec {
    /// Compression level (0 = store, 9 = best).
    pub level: u32,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl DeflateCodec {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl BlockCodec for DeflateCodec {
    type CompressState = Compress;
    type DecompressState = Decompress;

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress_state(&self) -> anyhow::Result<Compress> {
        if self.level > 9 {
            anyhow::bail!("deflate level must be 0-9, got {}", self.level);
        }
        Ok(Compress::new(Compression::new(self.level), false))
    }

    fn decompress_state(&self) -> anyhow::Result<Decompress> {
        Ok(Decompress::new(false))
    }

    fn compress(&self, state: &mut Compress, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        state.reset();
        let mut out = Vec::with_capacity(SIZE_PREFIX_LEN + raw.len() + 64);
        out.extend_from_slice(&size_prefix(self.name(), raw.len())?);

        // compress_vec only fills spare capacity, so grow until the stream ends.
        loop {
            let consumed = state.total_in() as usize;
            match state.compress_vec(&raw[consumed..], &mut out, FlushCompress::Finish)? {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => out.reserve(out.capacity().max(64)),
            }
        }
        Ok(out)
    }

    fn decompressed_size(&self, compressed: &[u8]) -> anyhow::Result<usize> {
        Ok(split_size_prefix(self.name(), compressed)?.0)
    }

    fn decompress(&self, state: &mut Decompress, compressed: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        let (raw_len, body) = split_size_prefix(self.name(), compressed)?;
        let limit = raw_len.min(dst.len());
        state.reset(false);
        match state.decompress(body, &mut dst[..limit], FlushDecompress::Finish)? {
            Status::StreamEnd => Ok(state.total_out() as usize),
            _ => anyhow::bail!(
                "deflate block did not end within its declared {} bytes",
                raw_len
            ),
        }
    }
}
