//! Block transforms: raw generator words to distribution samples
//!
//! A transform maps one four-word generator block to four scalars. Keeping
//! the mapping block-local is what lets the fill engine address any element
//! by counter arithmetic: element `i` of the stream is word `i % 4` of block
//! `i / 4`, regardless of which worker produced it.

use super::{box_muller, u32_to_uniform, BLOCK_WORDS};

/// Maps a generator block to [`BLOCK_WORDS`] scalar samples
///
/// Implementations must be pure: the output depends only on the input block,
/// never on position in the stream or prior calls.
pub trait BlockTransform {
    /// Transform four raw words into four samples (as f64)
    fn apply(block: [u32; 4]) -> [f64; BLOCK_WORDS];
}

/// Paired uniform-to-Gaussian transform (Box-Muller)
///
/// Words (0,1) produce the first pair of standard normals, words (2,3) the
/// second. Entries are i.i.d. N(0, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxMuller;

impl BlockTransform for BoxMuller {
    #[inline]
    fn apply(block: [u32; 4]) -> [f64; BLOCK_WORDS] {
        let (z0, z1) = box_muller(u32_to_uniform(block[0]), u32_to_uniform(block[1]));
        let (z2, z3) = box_muller(u32_to_uniform(block[2]), u32_to_uniform(block[3]));
        [z0, z1, z2, z3]
    }
}

/// Affine rescale of each word to the uniform distribution on [-1, 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitUniform;

impl BlockTransform for UnitUniform {
    #[inline]
    fn apply(block: [u32; 4]) -> [f64; BLOCK_WORDS] {
        let mut out = [0.0; BLOCK_WORDS];
        for (o, &w) in out.iter_mut().zip(block.iter()) {
            *o = 2.0 * u32_to_uniform(w) - 1.0;
        }
        out
    }
}
