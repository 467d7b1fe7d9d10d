use crate::error::{invalid, PeelError};
use crate::hash::{reduce, Lanes};
use std::fmt;

/// Largest capacity any strategy accepts: lanes are 32 bits wide.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// The three slots of one hyperedge. Pairwise distinct, all below the
/// capacity of the strategy that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Element {
    pub h0: usize,
    pub h1: usize,
    pub h2: usize,
}

impl Element {
    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        [self.h0, self.h1, self.h2]
    }

    #[inline]
    fn shifted(self, by: usize) -> Self {
        Self {
            h0: self.h0 + by,
            h1: self.h1 + by,
            h2: self.h2 + by,
        }
    }
}

/// Maps a 64-bit key to three distinct slots in `[0, capacity())`.
///
/// Implementations are immutable after construction, so one instance can be
/// shared by any number of hypergraph builds, including concurrent ones.
pub trait HashGen {
    fn capacity(&self) -> usize;
    fn get(&self, key: u64) -> Element;
}

impl<H: HashGen + ?Sized> HashGen for &H {
    #[inline]
    fn capacity(&self) -> usize {
        (**self).capacity()
    }
    #[inline]
    fn get(&self, key: u64) -> Element {
        (**self).get(key)
    }
}

fn check_capacity(m: usize) -> Result<(), PeelError> {
    if m < 3 {
        return Err(invalid(format!("capacity {m} cannot hold 3 distinct slots")));
    }
    if m > MAX_CAPACITY {
        return Err(invalid(format!("capacity {m} exceeds {MAX_CAPACITY}")));
    }
    Ok(())
}

/// Three distinct values in `[0, max)` from lanes 0..=2, no rejection loop.
/// Requires `max >= 3`. Lane 3 is left for the caller.
#[inline]
fn three_distinct(lanes: &Lanes, max: usize) -> Element {
    let [l0, l1, l2, _] = lanes.0;
    let max = max as u64;
    let h0 = reduce(l0, max);
    let off1 = 1 + reduce(l1, max - 1);
    let mut off2 = 2 + reduce(l2, max - 2);
    if off2 <= off1 {
        off2 -= 1;
    }
    let wrap = |x: u64| if x >= max { x - max } else { x };
    Element {
        h0: h0 as usize,
        h1: wrap(h0 + off1) as usize,
        h2: wrap(h0 + off2) as usize,
    }
}

/// Three slots anywhere in `[0, m)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Uniform {
    m: usize,
}

impl Uniform {
    pub fn new(m: usize) -> Result<Self, PeelError> {
        check_capacity(m)?;
        Ok(Self { m })
    }
}

impl HashGen for Uniform {
    #[inline]
    fn capacity(&self) -> usize {
        self.m
    }

    #[inline]
    fn get(&self, key: u64) -> Element {
        three_distinct(&Lanes::from_key(key), self.m)
    }
}

/// `m` is split into `segments` equal blocks; a key gets one slot in each of
/// three consecutive blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segmented {
    m: usize,
    segments: usize,
    segment_len: usize,
}

impl Segmented {
    pub fn new(m: usize, segments: usize) -> Result<Self, PeelError> {
        check_capacity(m)?;
        if segments < 3 {
            return Err(invalid(format!(
                "{segments} segments; at least 3 are needed"
            )));
        }
        if m % segments != 0 {
            return Err(invalid(format!(
                "capacity {m} is not a multiple of {segments} segments"
            )));
        }
        Ok(Self {
            m,
            segments,
            segment_len: m / segments,
        })
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn segment_len(&self) -> usize {
        self.segment_len
    }
}

impl HashGen for Segmented {
    #[inline]
    fn capacity(&self) -> usize {
        self.m
    }

    #[inline]
    fn get(&self, key: u64) -> Element {
        let Lanes([l0, l1, l2, l3]) = Lanes::from_key(key);
        let len = self.segment_len as u64;
        let start = reduce(l0, (self.segments - 2) as u64);
        Element {
            h0: (start * len + reduce(l1, len)) as usize,
            h1: ((start + 1) * len + reduce(l2, len)) as usize,
            h2: ((start + 2) * len + reduce(l3, len)) as usize,
        }
    }
}

/// Uniform placement inside a window of width `d`, the window itself placed
/// anywhere in `[0, m)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandLimited {
    m: usize,
    d: usize,
}

impl BandLimited {
    pub fn new(m: usize, d: usize) -> Result<Self, PeelError> {
        check_capacity(m)?;
        if d < 3 {
            return Err(invalid(format!("bandwidth {d} cannot hold 3 distinct slots")));
        }
        if d >= m {
            return Err(invalid(format!("bandwidth {d} must be below capacity {m}")));
        }
        Ok(Self { m, d })
    }

    pub fn bandwidth(&self) -> usize {
        self.d
    }
}

impl HashGen for BandLimited {
    #[inline]
    fn capacity(&self) -> usize {
        self.m
    }

    #[inline]
    fn get(&self, key: u64) -> Element {
        let lanes = Lanes::from_key(key);
        let start = reduce(lanes.0[3], (self.m - self.d + 1) as u64);
        three_distinct(&lanes, self.d).shifted(start as usize)
    }
}

/// Runtime choice among the three strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Uniform(Uniform),
    Segmented(Segmented),
    BandLimited(BandLimited),
}

impl HashGen for Strategy {
    #[inline]
    fn capacity(&self) -> usize {
        match self {
            Strategy::Uniform(h) => h.capacity(),
            Strategy::Segmented(h) => h.capacity(),
            Strategy::BandLimited(h) => h.capacity(),
        }
    }

    #[inline]
    fn get(&self, key: u64) -> Element {
        match self {
            Strategy::Uniform(h) => h.get(key),
            Strategy::Segmented(h) => h.get(key),
            Strategy::BandLimited(h) => h.get(key),
        }
    }
}

/// A strategy family, independent of capacity. Sweeps vary `m` and
/// instantiate a fresh [`Strategy`] for each value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Uniform,
    /// Fixed number of segments `L`; `m` is rounded down to a multiple of it.
    Segmented { segments: usize },
    /// Bandwidth `d = m / quotient`, or 3 when `m <= 3 * quotient`.
    BandLimited { quotient: usize },
}

impl StrategyKind {
    /// `m` must be a multiple of this for [`StrategyKind::instantiate`] to succeed.
    pub fn force_multiple(&self) -> usize {
        match self {
            StrategyKind::Segmented { segments } => (*segments).max(1),
            _ => 1,
        }
    }

    pub fn round_capacity(&self, m: usize) -> usize {
        let k = self.force_multiple();
        m / k * k
    }

    pub fn instantiate(&self, m: usize) -> Result<Strategy, PeelError> {
        Ok(match *self {
            StrategyKind::Uniform => Strategy::Uniform(Uniform::new(m)?),
            StrategyKind::Segmented { segments } => {
                Strategy::Segmented(Segmented::new(m, segments)?)
            }
            StrategyKind::BandLimited { quotient } => {
                if quotient < 2 {
                    return Err(invalid(format!(
                        "bandwidth quotient {quotient} leaves no room for the window"
                    )));
                }
                let d = if m > 3 * quotient { m / quotient } else { 3 };
                Strategy::BandLimited(BandLimited::new(m, d)?)
            }
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Uniform => write!(f, "uniform"),
            StrategyKind::Segmented { segments } => write!(f, "segmented(l={segments})"),
            StrategyKind::BandLimited { quotient } => write!(f, "band(m/{quotient})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn assert_valid(e: Element, m: usize) {
        let [a, b, c] = e.indices();
        assert!(a < m && b < m && c < m, "{e:?} out of [0, {m})");
        assert!(a != b && b != c && a != c, "{e:?} not distinct");
    }

    fn check_all<H: HashGen>(h: &H, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for key in [0, 1, u64::MAX, u32::MAX as u64, 1 << 32] {
            assert_valid(h.get(key), h.capacity());
        }
        for _ in 0..20_000 {
            assert_valid(h.get(rng.next_u64()), h.capacity());
        }
    }

    #[test]
    fn uniform_distinct_in_range() {
        for m in [3, 4, 5, 10, 97, 1000, 123_000, MAX_CAPACITY] {
            check_all(&Uniform::new(m).unwrap(), m as u64);
        }
    }

    #[test]
    fn uniform_capacity_three_covers_every_slot() {
        let h = Uniform::new(3).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let mut idx = h.get(rng.next_u64()).indices();
            idx.sort_unstable();
            assert_eq!(idx, [0, 1, 2]);
        }
    }

    #[test]
    fn uniform_is_roughly_balanced() {
        let m = 16;
        let h = Uniform::new(m).unwrap();
        let mut hits = vec![0usize; m];
        let mut rng = StdRng::seed_from_u64(11);
        let draws = 60_000;
        for _ in 0..draws {
            for i in h.get(rng.next_u64()).indices() {
                hits[i] += 1;
            }
        }
        let expected = 3 * draws / m;
        for (slot, &c) in hits.iter().enumerate() {
            assert!(
                c > expected * 9 / 10 && c < expected * 11 / 10,
                "slot {slot} hit {c} times, expected ~{expected}"
            );
        }
    }

    #[test]
    fn segmented_uses_three_consecutive_blocks() {
        let h = Segmented::new(300, 12).unwrap();
        assert_eq!(h.segment_len(), 25);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20_000 {
            let e = h.get(rng.next_u64());
            assert_valid(e, 300);
            let (b0, b1, b2) = (e.h0 / 25, e.h1 / 25, e.h2 / 25);
            assert_eq!(b1, b0 + 1);
            assert_eq!(b2, b0 + 2);
            assert!(b2 < 12);
        }
    }

    #[test]
    fn segmented_three_segments_is_pinned() {
        let h = Segmented::new(30, 3).unwrap();
        check_all(&h, 5);
        let e = h.get(0xabcdef);
        assert!(e.h0 < 10 && (10..20).contains(&e.h1) && (20..30).contains(&e.h2));
    }

    #[test]
    fn band_limited_stays_inside_window() {
        for (m, d) in [(4, 3), (100, 3), (1000, 10), (1000, 999), (123_000, 1230)] {
            let h = BandLimited::new(m, d).unwrap();
            check_all(&h, d as u64);
            let mut rng = StdRng::seed_from_u64(m as u64);
            for _ in 0..5000 {
                let idx = h.get(rng.next_u64()).indices();
                let lo = *idx.iter().min().unwrap();
                let hi = *idx.iter().max().unwrap();
                assert!(hi - lo < d, "{idx:?} spans more than {d}");
            }
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(Uniform::new(0), Err(PeelError::InvalidParameter(_))));
        assert!(Uniform::new(2).is_err());
        assert!(Uniform::new(MAX_CAPACITY + 1).is_err());
        assert!(Segmented::new(300, 7).is_err());
        assert!(Segmented::new(300, 2).is_err());
        assert!(Segmented::new(0, 3).is_err());
        assert!(BandLimited::new(100, 100).is_err());
        assert!(BandLimited::new(100, 200).is_err());
        assert!(BandLimited::new(100, 2).is_err());
        assert!(BandLimited::new(3, 3).is_err());
    }

    #[test]
    fn strategy_matches_concrete_variant() {
        let seg = Segmented::new(300, 12).unwrap();
        let dynamic = StrategyKind::Segmented { segments: 12 }.instantiate(300).unwrap();
        assert_eq!(dynamic, Strategy::Segmented(seg));
        for key in [1u64, 42, 0xffff_0000_1234] {
            assert_eq!(dynamic.get(key), seg.get(key));
        }
    }

    #[test]
    fn kind_rounding_and_bandwidth() {
        let kind = StrategyKind::Segmented { segments: 25 };
        assert_eq!(kind.round_capacity(1234), 1225);
        assert_eq!(StrategyKind::Uniform.round_capacity(1234), 1234);

        let band = StrategyKind::BandLimited { quotient: 10 };
        match band.instantiate(1000).unwrap() {
            Strategy::BandLimited(b) => assert_eq!(b.bandwidth(), 100),
            other => panic!("unexpected {other:?}"),
        }
        match band.instantiate(20).unwrap() {
            Strategy::BandLimited(b) => assert_eq!(b.bandwidth(), 3),
            other => panic!("unexpected {other:?}"),
        }
        assert!(StrategyKind::BandLimited { quotient: 1 }.instantiate(1000).is_err());
        assert_eq!(band.to_string(), "band(m/10)");
    }
}
