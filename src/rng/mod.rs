//! Counter-based random number generation
//!
//! Every random value in this crate is a pure function of an [`RngState`]:
//! a (counter, key) pair fed to a counter-based block generator. Advancing the
//! counter by a known amount yields an independent, reproducible position in
//! the stream, which is what makes parallel and offset-addressable sampling
//! deterministic.
//!
//! # Algorithms
//!
//! - [`philox::Philox4x32`]: Philox4x32-10 (Salmon et al. 2011), the default
//! - [`threefry::ThreeFry4x32`]: ThreeFry4x32-20 (Salmon et al. 2011)

pub mod philox;
pub mod threefry;
pub mod transforms;

use std::f64::consts::PI;

/// Number of 32-bit words produced per generator call
pub const BLOCK_WORDS: usize = 4;

/// State of a counter-based generator: a counter and a key
///
/// Pure value type. The only mutation is [`RngState::incr`], which advances
/// the counter by a precomputed stride. Two states are interchangeable iff
/// both the counter and the key match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngState {
    /// 128-bit counter, least-significant word first
    pub ctr: [u32; 4],
    /// 64-bit key, least-significant word first
    pub key: [u32; 2],
}

impl RngState {
    /// Create a state with the given key and a zero counter
    ///
    /// This is the canonical way to seed an operator: the 32-bit key is the
    /// only external entropy source.
    #[inline]
    pub fn from_key(key: u32) -> Self {
        Self {
            ctr: [0; 4],
            key: [key, 0],
        }
    }

    /// Create a state from explicit counter and key words
    #[inline]
    pub fn new(ctr: [u32; 4], key: [u32; 2]) -> Self {
        Self { ctr, key }
    }

    /// Advance the counter by `n` blocks, propagating carries
    #[inline]
    pub fn incr(&mut self, n: u64) {
        let mut carry = n;
        for word in self.ctr.iter_mut() {
            if carry == 0 {
                break;
            }
            let sum = u64::from(*word) + (carry & 0xFFFF_FFFF);
            *word = sum as u32;
            carry = (carry >> 32) + (sum >> 32);
        }
    }

    /// Return a copy advanced by `n` blocks
    #[inline]
    pub fn advanced(mut self, n: u64) -> Self {
        self.incr(n);
        self
    }
}

impl Default for RngState {
    fn default() -> Self {
        Self::from_key(0)
    }
}

/// A counter-based block generator
///
/// `generate` is a pure function of the state: no hidden state, no aliasing.
/// Reproducibility of the whole crate reduces to this contract plus
/// deterministic offset arithmetic.
pub trait CounterRng {
    /// Produce one block of four pseudorandom words from a state
    fn generate(state: &RngState) -> [u32; 4];
}

/// Box-Muller transform: convert two uniform values to two standard normals
///
/// Shared by all generators so Gaussian output depends only on the word
/// stream, not on the generator choice.
#[inline(always)]
pub(crate) fn box_muller(u1: f64, u2: f64) -> (f64, f64) {
    // Clamp to avoid log(0) and ensure valid range
    let u1 = u1.clamp(1e-10, 1.0 - 1e-10);

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;

    (r * theta.cos(), r * theta.sin())
}

/// Convert u32 to uniform float in [0, 1)
///
/// Uses the top 24 bits for good distribution.
#[inline(always)]
pub(crate) fn u32_to_uniform(u: u32) -> f64 {
    (u >> 8) as f64 / (1u64 << 24) as f64
}
