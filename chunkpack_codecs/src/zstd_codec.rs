use chunkpack_core::BlockCodec;
use zstd::bulk::{Compressor, Decompressor};
use zstd::zstd_safe::get_frame_content_size;

/// Zstandard block codec.
///
/// Each chunk becomes one zstd frame at the configured level (default: 3)
/// with its content size recorded in the frame header, which is what the
/// size probe reads. The compression and decompression contexts are kept as
/// scratch state and reused for every chunk.
///
/// Best for: general structured data where size matters.
pub struct ZstdCodec {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl BlockCodec for ZstdCodec {
    type CompressState = Compressor<'static>;
    type DecompressState = Decompressor<'static>;

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress_state(&self) -> anyhow::Result<Compressor<'static>> {
        Ok(Compressor::new(self.level)?)
    }

    fn decompress_state(&self) -> anyhow::Result<Decompressor<'static>> {
        Ok(Decompressor::new()?)
    }

    fn compress(&self, state: &mut Compressor<'static>, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let compressed = state.compress(raw)?;
        Ok(compressed)
    }

    fn decompressed_size(&self, compressed: &[u8]) -> anyhow::Result<usize> {
        match get_frame_content_size(compressed) {
            Ok(Some(size)) => Ok(usize::try_from(size)?),
            Ok(None) => anyhow::bail!("zstd frame does not record its content size"),
            Err(_) => anyhow::bail!("invalid zstd frame header"),
        }
    }

    fn decompress(
        &self,
        state: &mut Decompressor<'static>,
        compressed: &[u8],
        dst: &mut [u8],
    ) -> anyhow::Result<usize> {
        let written = state.decompress_to_buffer(compressed, dst)?;
        Ok(written)
    }
}
