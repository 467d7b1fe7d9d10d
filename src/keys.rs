use rand::{Error, RngCore, SeedableRng};

/// Produces the 64-bit keys a hypergraph is built from.
///
/// Every [`RngCore`] is a key source, so callers pass whatever seeded
/// generator they own; there is no process-wide random state.
pub trait KeySource {
    fn next_key(&mut self) -> u64;
}

impl<R: RngCore + ?Sized> KeySource for R {
    #[inline]
    fn next_key(&mut self) -> u64 {
        self.next_u64()
    }
}

/// Marsaglia/Vigna xorshift64* generator.
#[derive(Clone, Debug)]
pub struct XorShift64Star(u64);

impl XorShift64Star {
    pub fn seeded(mut s: u64) -> Self {
        // The all-zero state is a fixed point.
        if s == 0 {
            s = 0x9E37_79B9_7F4A_7C15
        }
        Self(s)
    }
}

impl RngCore for XorShift64Star {
    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift64Star {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seeded(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::seeded(state)
    }
}
