use chunkpack_core::BlockCodec;

use crate::{size_prefix, split_size_prefix, SIZE_PREFIX_LEN};

/// No-op codec: stores chunks verbatim behind a 4-byte length prefix.
///
/// Useful for:
/// - Verifying the framing round-trip independently of any compressor.
/// - Data that is already compressed, where further compression would only
///   expand it.
pub struct PassThroughCodec;

impl BlockCodec for PassThroughCodec {
    type CompressState = ();
    type DecompressState = ();

    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn compress_state(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn decompress_state(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn compress(&self, _state: &mut (), raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(SIZE_PREFIX_LEN + raw.len());
        out.extend_from_slice(&size_prefix(self.name(), raw.len())?);
        out.extend_from_slice(raw);
        Ok(out)
    }

    fn decompressed_size(&self, compressed: &[u8]) -> anyhow::Result<usize> {
        Ok(split_size_prefix(self.name(), compressed)?.0)
    }

    fn decompress(&self, _state: &mut (), compressed: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        let (raw_len, body) = split_size_prefix(self.name(), compressed)?;
        if body.len() != raw_len || dst.len() < raw_len {
            anyhow::bail!(
                "passthrough block declares {} bytes but carries {} (destination {})",
                raw_len,
                body.len(),
                dst.len()
            );
        }
        dst[..raw_len].copy_from_slice(body);
        Ok(raw_len)
    }
}
