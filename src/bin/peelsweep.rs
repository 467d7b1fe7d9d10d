use anyhow::{ensure, Result};
use clap::{Parser, Subcommand, ValueEnum};
use peelgraph::sweep::{
    find_min_ratio, run_trials, success_curve, SearchConfig, BASIC_LOW_BOUND, ORIENTABLE_LOW_BOUND,
};
use peelgraph::{StrategyKind, XorShift64Star};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Peelability experiments on random 3-uniform hypergraphs", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Hash strategy mapping keys to slots.
    #[arg(short, long, value_enum, default_value_t = Kind::Uniform)]
    strategy: Kind,
    /// Number of segments for the segmented strategy.
    #[arg(long, default_value_t = 12)]
    segments: usize,
    /// Bandwidth is m divided by this, for the band strategy.
    #[arg(long, default_value_t = 25)]
    quotient: usize,
    /// A 64-bit seed for the key generator.
    #[arg(long, default_value_t = 314159)]
    seed: u64,
    /// Draw keys with xorshift64* instead of the standard generator.
    #[arg(long)]
    xorshift: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Uniform,
    Segmented,
    Band,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Peel a batch of hypergraphs with fixed n and m.
    Trials {
        n: usize,
        m: usize,
        #[arg(short, long, default_value_t = 100)]
        trials: usize,
    },
    /// Success probability over a range of m/n ratios.
    Curve {
        n: usize,
        #[arg(long, default_value_t = 1.20)]
        from: f64,
        #[arg(long, default_value_t = 1.29)]
        to: f64,
        #[arg(long, default_value_t = 0.01)]
        step: f64,
        #[arg(short, long, default_value_t = 100)]
        trials: usize,
    },
    /// Search for the m/n ratio peeling with probability ~1/2.
    Search {
        n: usize,
        /// Starting ratio; defaults to a bound suited to the strategy.
        #[arg(long)]
        start: Option<f64>,
        #[arg(short, long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long, default_value_t = 0.01)]
        step_size: f64,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;

    let args = Args::parse();
    let kind = match args.strategy {
        Kind::Uniform => StrategyKind::Uniform,
        Kind::Segmented => StrategyKind::Segmented {
            segments: args.segments,
        },
        Kind::Band => StrategyKind::BandLimited {
            quotient: args.quotient,
        },
    };
    let mut rng: Box<dyn RngCore> = if args.xorshift {
        Box::new(XorShift64Star::seed_from_u64(args.seed))
    } else {
        Box::new(StdRng::seed_from_u64(args.seed))
    };

    let t0 = Instant::now();
    match args.command {
        Command::Trials { n, m, trials } => {
            let strategy = kind.instantiate(m)?;
            let ok = run_trials(trials, n, m, &strategy, &mut *rng)?;
            println!(
                "{kind} n={n} m={m} m/n={:.4} p={:.4} ({ok}/{trials})",
                m as f64 / n as f64,
                ok as f64 / trials as f64
            );
        }
        Command::Curve {
            n,
            from,
            to,
            step,
            trials,
        } => {
            ensure!(step > 0.0 && to >= from, "empty ratio range");
            let count = ((to - from) / step).round() as usize + 1;
            let ratios: Vec<f64> = (0..count).map(|i| from + i as f64 * step).collect();
            for p in success_curve(n, &ratios, trials, kind, &mut *rng)? {
                println!("n={n} m={} p={:.4}", p.m, p.probability());
            }
        }
        Command::Search {
            n,
            start,
            iterations,
            step_size,
        } => {
            let initial_ratio = start.unwrap_or(match kind {
                StrategyKind::Uniform => BASIC_LOW_BOUND,
                _ => ORIENTABLE_LOW_BOUND,
            });
            let cfg = SearchConfig {
                initial_ratio,
                step_size,
                iterations,
                ..Default::default()
            };
            let ratio = find_min_ratio(n, kind, &cfg, &mut *rng)?;
            println!("{kind} n={n} m/n={ratio:.10}");
        }
    }
    log::info!("done in {:.3} s", t0.elapsed().as_secs_f64());
    Ok(())
}
