use xxhash_rust::xxh3::xxh3_64_with_seed;

const MASK_32: u64 = 0xFFFF_FFFF;

/// Fixed-point 64-bit avalanche mix (the MurmurHash3 finalizer).
///
/// Bijective and branch-free. Every output bit depends on every input bit,
/// which lets us slice two independent 32-bit lanes out of one call.
#[inline]
pub fn scramble(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// Maps a 32-bit lane into `[0, range)` by multiply-and-shift.
///
/// `lane` must be below 2^32 and `range` at most 2^32; the result is then
/// approximately uniform, not bit-identical to `lane % range`.
#[inline]
pub fn reduce(lane: u64, range: u64) -> u64 {
    debug_assert!(lane <= MASK_32);
    debug_assert!(range <= 1 << 32);
    (lane * range) >> 32
}

/// Four 32-bit lanes derived from one key: the two halves of the key itself
/// and the two halves of its scrambled value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lanes(pub [u64; 4]);

impl Lanes {
    #[inline]
    pub fn from_key(key: u64) -> Self {
        let mixed = scramble(key);
        Self([key & MASK_32, key >> 32, mixed & MASK_32, mixed >> 32])
    }
}

/// Hashes an arbitrary byte key down to a 64-bit key with XXH3.
#[inline]
pub fn fingerprint(bytes: &[u8], seed: u64) -> u64 {
    xxh3_64_with_seed(bytes, seed ^ 0x9E37_79B9_7F4A_7C15)
}
