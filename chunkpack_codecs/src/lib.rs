mod deflate_codec;
mod lz4_codec;
mod passthrough;
mod zstd_codec;

pub use deflate_codec::DeflateCodec;
pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use zstd_codec::ZstdCodec;

/// Bytes of the little-endian `u32` raw-length prefix used by the
/// passthrough, LZ4 and Deflate block layouts.
pub const SIZE_PREFIX_LEN: usize = 4;

/// Split a block into its `u32` LE raw-length prefix and body.
pub(crate) fn split_size_prefix<'a>(codec: &str, block: &'a [u8]) -> anyhow::Result<(usize, &'a [u8])> {
    if block.len() < SIZE_PREFIX_LEN {
        anyhow::bail!(
            "{} block too short for its size prefix: {} bytes",
            codec,
            block.len()
        );
    }
    let (prefix, body) = block.split_at(SIZE_PREFIX_LEN);
    let raw_len = u32::from_le_bytes(prefix.try_into()?);
    Ok((raw_len as usize, body))
}

/// Encode a chunk length as the `u32` LE prefix.
pub(crate) fn size_prefix(codec: &str, raw_len: usize) -> anyhow::Result<[u8; SIZE_PREFIX_LEN]> {
    let len = u32::try_from(raw_len)
        .map_err(|_| anyhow::anyhow!("{} chunk of {} bytes exceeds the u32 size prefix", codec, raw_len))?;
    Ok(len.to_le_bytes())
}
