use chunkpack_core::BlockCodec;
use lz4_flex::block::{compress_prepend_size, decompress_into};

use crate::split_size_prefix;

/// LZ4 block codec.
///
/// Blocks use the `lz4_flex` size-prepended layout: a `u32` LE raw length
/// followed by the LZ4 block, so the size probe never touches the body.
/// The compressor keeps no state between calls.
///
/// Best for: hot data where decode speed matters more than size reduction.
pub struct Lz4Codec;

impl BlockCodec for Lz4Codec {
    type CompressState = ();
    type DecompressState = ();

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress_state(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn decompress_state(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn compress(&self, _state: &mut (), raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        if u32::try_from(raw.len()).is_err() {
            anyhow::bail!("lz4 chunk of {} bytes exceeds the u32 size prefix", raw.len());
        }
        Ok(compress_prepend_size(raw))
    }

    fn decompressed_size(&self, compressed: &[u8]) -> anyhow::Result<usize> {
        Ok(split_size_prefix(self.name(), compressed)?.0)
    }

    fn decompress(&self, _state: &mut (), compressed: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        let (raw_len, body) = split_size_prefix(self.name(), compressed)?;
        let limit = raw_len.min(dst.len());
        let written = decompress_into(body, &mut dst[..limit])
            .map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))?;
        Ok(written)
    }
}
