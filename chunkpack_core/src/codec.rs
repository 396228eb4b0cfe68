/// Block compression abstraction used by [`ChunkedCodec`](crate::ChunkedCodec).
///
/// Each `BlockCodec` implementation:
/// - Compresses every chunk independently; no state may carry meaning from
///   one chunk to the next. Scratch state exists only to avoid reallocating
///   working memory between calls.
/// - Embeds enough of a size header in each compressed block that
///   [`decompressed_size`](BlockCodec::decompressed_size) can answer without
///   decompressing.
/// - Never expands a chunk by more than
///   [`COMPRESS_OVERHEAD`](crate::format::COMPRESS_OVERHEAD) bytes.
pub trait BlockCodec: Send {
    /// Reusable compressor working memory.
    type CompressState: Send;
    /// Reusable decompressor working memory.
    type DecompressState: Send;

    /// Human-readable codec name for diagnostics.
    fn name(&self) -> &'static str;

    /// Allocate fresh compressor scratch state.
    fn compress_state(&self) -> anyhow::Result<Self::CompressState>;

    /// Allocate fresh decompressor scratch state.
    fn decompress_state(&self) -> anyhow::Result<Self::DecompressState>;

    /// Compress a single chunk.
    fn compress(&self, state: &mut Self::CompressState, raw: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Read the uncompressed length recorded in a compressed block.
    fn decompressed_size(&self, compressed: &[u8]) -> anyhow::Result<usize>;

    /// Decompress a single block into `dst`, returning the bytes written.
    ///
    /// `dst` is sized to exactly [`decompressed_size`](BlockCodec::decompressed_size)
    /// of the same block.
    fn decompress(
        &self,
        state: &mut Self::DecompressState,
        compressed: &[u8],
        dst: &mut [u8],
    ) -> anyhow::Result<usize>;
}
