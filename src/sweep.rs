//! Monte-Carlo drivers over the hypergraph core: trial batches, success
//! curves and a stochastic search for the smallest peelable `m/n`.

use crate::error::{invalid, PeelError};
use crate::hypergraph::Hypergraph;
use crate::strategy::{HashGen, StrategyKind};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Starting ratio for uniform hypergraphs (threshold ~1.222).
pub const BASIC_LOW_BOUND: f64 = 1.22;
/// Starting ratio for segmented and band-limited hypergraphs.
pub const ORIENTABLE_LOW_BOUND: f64 = 1.12;

/// Outcomes remembered by [`find_min_ratio`].
const WINDOW: usize = 32;

/// Parameters of [`find_min_ratio`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// First `m/n` ratio tried.
    pub initial_ratio: f64,
    /// Largest step, taken when the recent success rate is far from 1/2.
    pub step_size: f64,
    /// The step shrinks by this factor per recent outcome on the minority side.
    pub step_decay: f64,
    pub iterations: usize,
    /// `m` is rounded down to a multiple of this (and of the strategy's own).
    pub force_multiple: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_ratio: BASIC_LOW_BOUND,
            step_size: 0.01,
            step_decay: 0.6,
            iterations: 1000,
            force_multiple: 1,
        }
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<(), PeelError> {
        if !(self.initial_ratio > 0.0) {
            return Err(invalid(format!("initial ratio {}", self.initial_ratio)));
        }
        if !(self.step_size > 0.0) {
            return Err(invalid(format!("step size {}", self.step_size)));
        }
        if !(self.step_decay > 0.0 && self.step_decay <= 1.0) {
            return Err(invalid(format!("step decay {} not in (0, 1]", self.step_decay)));
        }
        if self.iterations == 0 || self.force_multiple == 0 {
            return Err(invalid("iterations and force_multiple must be positive"));
        }
        Ok(())
    }
}

/// One point of a success-probability curve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    pub ratio: f64,
    pub m: usize,
    pub successes: usize,
    pub trials: usize,
}

impl CurvePoint {
    pub fn probability(&self) -> f64 {
        self.successes as f64 / self.trials as f64
    }
}

/// Builds and peels `trials` hypergraphs with `n` keys over `m` slots and
/// returns how many peeled.
///
/// Each trial draws its keys from a `StdRng` seeded by `rng`, so the count is
/// the same whether or not trials run in parallel.
pub fn run_trials<H, R>(
    trials: usize,
    n: usize,
    m: usize,
    strategy: &H,
    rng: &mut R,
) -> Result<usize, PeelError>
where
    H: HashGen + Sync,
    R: RngCore + ?Sized,
{
    let seeds: Vec<u64> = (0..trials).map(|_| rng.next_u64()).collect();
    let trial = |&seed: &u64| -> Result<bool, PeelError> {
        let mut keys = StdRng::seed_from_u64(seed);
        Ok(Hypergraph::build(n, m, &mut keys, strategy)?.is_peelable())
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<bool> = {
        use rayon::prelude::*;
        seeds.par_iter().map(trial).collect::<Result<_, _>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<bool> = seeds.iter().map(trial).collect::<Result<_, _>>()?;

    Ok(outcomes.into_iter().filter(|&ok| ok).count())
}

/// Success probability of `kind` at each `m/n` ratio.
pub fn success_curve<R>(
    n: usize,
    ratios: &[f64],
    trials: usize,
    kind: StrategyKind,
    rng: &mut R,
) -> Result<Vec<CurvePoint>, PeelError>
where
    R: RngCore + ?Sized,
{
    if trials == 0 {
        return Err(invalid("a curve point needs at least one trial"));
    }
    let mut points = Vec::with_capacity(ratios.len());
    for &ratio in ratios {
        let m = kind.round_capacity((n as f64 * ratio) as usize);
        let strategy = kind.instantiate(m)?;
        let successes = run_trials(trials, n, m, &strategy, rng)?;
        let point = CurvePoint {
            ratio,
            m,
            successes,
            trials,
        };
        log::info!("{kind} n={n} m={m} p={:.3}", point.probability());
        points.push(point);
    }
    Ok(points)
}

/// Stochastic search for the `m/n` ratio at which `kind` peels with
/// probability about 1/2.
///
/// Every iteration builds one hypergraph at the current ratio and moves the
/// ratio down after a success, up after a failure. The step is
/// `step_size * step_decay^k`, `k` being the number of minority outcomes among
/// the last 32, so it shrinks as the recent success rate nears 1/2.
pub fn find_min_ratio<R>(
    n: usize,
    kind: StrategyKind,
    cfg: &SearchConfig,
    rng: &mut R,
) -> Result<f64, PeelError>
where
    R: RngCore + ?Sized,
{
    cfg.validate()?;
    let multiple = lcm(cfg.force_multiple, kind.force_multiple());
    let decay: Vec<f64> = std::iter::successors(Some(1.0), |d| Some(d * cfg.step_decay))
        .take(WINDOW / 2 + 1)
        .collect();

    let mut ratio = cfg.initial_ratio;
    let mut window = 0u32;
    let mut successes = 0usize;
    for i in 0..cfg.iterations {
        let m = (n as f64 * ratio) as usize / multiple * multiple;
        let strategy = kind.instantiate(m)?;

        if window >> (WINDOW - 1) & 1 == 1 {
            successes -= 1;
        }
        window <<= 1;
        let peeled = Hypergraph::build(n, m, rng, &strategy)?.is_peelable();
        if peeled {
            window |= 1;
            successes += 1;
        }

        let k = successes.min(WINDOW - successes);
        let step = cfg.step_size * decay[k];
        ratio += if peeled { -step } else { step };
        log::debug!("{kind} n={n} iter={i} m={m} peeled={peeled} next={ratio:.5}");
    }
    log::info!("{kind} n={n} m/n={ratio:.6}");
    Ok(ratio)
}

fn lcm(a: usize, b: usize) -> usize {
    fn gcd(a: usize, b: usize) -> usize {
        if b == 0 { a } else { gcd(b, a % b) }
    }
    a / gcd(a, b) * b
}
