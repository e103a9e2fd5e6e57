//! Reproducible per-node noise.
//!
//! The perturbation of a node depends only on its id and the layout seed, so it does not change
//! when unrelated nodes are filtered in or out.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn unit(bits: u64) -> f64 {
    // 53 significant bits → [0, 1), then stretch to [-1, 1).
    let x = (bits >> 11) as f64 / (1u64 << 53) as f64;
    x * 2.0 - 1.0
}

/// Two independent values in `[-1, 1)`: angular and radial noise.
pub(crate) fn node_noise(id: &str, seed: u64) -> (f64, f64) {
    let mut state = fnv1a(id.as_bytes()) ^ seed.rotate_left(17);
    let a = splitmix64(&mut state);
    let r = splitmix64(&mut state);
    (unit(a), unit(r))
}
