//! peelgraph — random 3-uniform hypergraphs and the peel-to-empty test
//! behind XOR / fuse filters.
//!
//! - A [`HashGen`] strategy maps each 64-bit key to 3 distinct slots.
//! - A [`Hypergraph`] folds every key into per-slot degree + XOR state, no
//!   edge list.
//! - Peeling removes degree-1 slots until nothing is left (peelable) or a
//!   2-core remains.
//! - [`sweep`] runs Monte-Carlo batches over `m/n` ratios on top of that.

mod error;
mod hash;
mod hypergraph;
mod keys;
mod strategy;
pub mod sweep;

pub use error::PeelError;
pub use hash::{fingerprint, reduce, scramble, Lanes};
pub use hypergraph::{Hypergraph, PeelOrder, PeelReport, Slot};
pub use keys::{KeySource, XorShift64Star};
pub use strategy::{
    BandLimited, Element, HashGen, Segmented, Strategy, StrategyKind, Uniform, MAX_CAPACITY,
};
