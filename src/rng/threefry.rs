//! ThreeFry4x32-20 block generator
//!
//! 20-round Threefish-based cipher from Salmon et al. "Parallel Random
//! Numbers: As Easy as 1, 2, 3" (2011)

use super::{CounterRng, RngState};

const THREEFRY_ROTATION_32X4: [[u32; 2]; 8] = [
    [10, 26],
    [11, 21],
    [13, 27],
    [23, 5],
    [6, 20],
    [17, 11],
    [25, 10],
    [18, 20],
];

const THREEFRY_PARITY32: u32 = 0x1BD1_1BDA;

/// ThreeFry round function
#[inline(always)]
fn threefry_round(x: &mut [u32; 4], ks: &[u32; 5], r: usize) {
    // Add round key every 4 rounds
    if r % 4 == 0 {
        let d = r / 4;
        x[0] = x[0].wrapping_add(ks[d % 5]);
        x[1] = x[1].wrapping_add(ks[(d + 1) % 5]);
        x[2] = x[2].wrapping_add(ks[(d + 2) % 5]);
        x[3] = x[3].wrapping_add(ks[(d + 3) % 5]).wrapping_add(d as u32);
    }

    // MIX: add + rotate
    let rot = &THREEFRY_ROTATION_32X4[r % 8];

    x[0] = x[0].wrapping_add(x[1]);
    x[1] = x[1].rotate_left(rot[0]) ^ x[0];

    x[2] = x[2].wrapping_add(x[3]);
    x[3] = x[3].rotate_left(rot[1]) ^ x[2];

    // Permute
    x.swap(1, 3);
}

/// ThreeFry4x32-20: alternate counter-based generator
///
/// The 64-bit key of [`RngState`] is zero-extended to the four key words the
/// cipher expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeFry4x32;

impl CounterRng for ThreeFry4x32 {
    #[inline]
    fn generate(state: &RngState) -> [u32; 4] {
        let key = [state.key[0], state.key[1], 0, 0];
        let ks = [
            key[0],
            key[1],
            key[2],
            key[3],
            key[0] ^ key[1] ^ key[2] ^ key[3] ^ THREEFRY_PARITY32,
        ];

        let mut x = state.ctr;

        for r in 0..20 {
            threefry_round(&mut x, &ks, r);
        }

        // Final key addition
        x[0] = x[0].wrapping_add(ks[0]);
        x[1] = x[1].wrapping_add(ks[1]);
        x[2] = x[2].wrapping_add(ks[2]);
        x[3] = x[3].wrapping_add(ks[3]).wrapping_add(5);

        x
    }
}
