use crate::error::{invalid, PeelError};
use crate::keys::KeySource;
use crate::strategy::HashGen;
use hashbrown::HashSet;

/// Per-vertex state.
///
/// `mask` is the XOR of the keys of all live edges through this slot, so
/// when `degree == 1` it *is* the key of the one remaining edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    pub degree: u32,
    pub mask: u64,
}

/// Work-list discipline used while peeling. Either one yields the same
/// outcome; only the visiting order changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PeelOrder {
    /// LIFO.
    #[default]
    Stack,
    /// FIFO, as in classic BDZ.
    Queue,
}

/// Outcome of a peel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeelReport {
    pub edges: usize,
    pub peeled: usize,
}

impl PeelReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.peeled == self.edges
    }

    /// Edges left in the residual 2-core.
    #[inline]
    pub fn core_edges(&self) -> usize {
        self.edges - self.peeled
    }
}

/// Random 3-uniform hypergraph with `m` slots, one edge per key.
///
/// No edge list is stored: an edge is re-derived from its key through the
/// strategy, and its key is recovered from the XOR mask of a degree-1 slot.
///
/// Pass `&strategy` to share one strategy across many hypergraphs.
#[derive(Clone, Debug)]
pub struct Hypergraph<H> {
    slots: Vec<Slot>,
    edges: usize,
    strategy: H,
}

impl<H: HashGen> Hypergraph<H> {
    /// Draws `n` keys from `keys` and inserts one edge per key.
    ///
    /// Keys are not checked for uniqueness: with 64-bit random keys a repeat
    /// is a birthday-bound event. Use [`Hypergraph::from_keys`] for key sets
    /// that may contain duplicates.
    pub fn build<K>(n: usize, m: usize, keys: &mut K, strategy: H) -> Result<Self, PeelError>
    where
        K: KeySource + ?Sized,
    {
        let mut graph = Self::empty(n, m, strategy)?;
        for _ in 0..n {
            graph.insert(keys.next_key());
        }
        log::trace!("built hypergraph: n={n} m={m}");
        Ok(graph)
    }

    /// Builds from an explicit key set, rejecting duplicate keys.
    pub fn from_keys<I>(keys: I, m: usize, strategy: H) -> Result<Self, PeelError>
    where
        I: IntoIterator<Item = u64>,
    {
        let keys: Vec<u64> = keys.into_iter().collect();
        let mut seen = HashSet::with_capacity_and_hasher(keys.len(), ahash::RandomState::new());
        for &k in &keys {
            if !seen.insert(k) {
                return Err(PeelError::DuplicateKey(k));
            }
        }
        let mut graph = Self::empty(keys.len(), m, strategy)?;
        for k in keys {
            graph.insert(k);
        }
        Ok(graph)
    }

    fn empty(n: usize, m: usize, strategy: H) -> Result<Self, PeelError> {
        if n == 0 {
            return Err(invalid("a hypergraph needs at least one key"));
        }
        if n > u32::MAX as usize {
            return Err(invalid(format!("{n} keys overflow slot degrees")));
        }
        if m < 3 {
            return Err(invalid(format!("capacity {m} cannot hold 3 distinct slots")));
        }
        if strategy.capacity() != m {
            return Err(invalid(format!(
                "strategy capacity {} differs from hypergraph capacity {m}",
                strategy.capacity()
            )));
        }
        Ok(Self {
            slots: vec![Slot::default(); m],
            edges: n,
            strategy,
        })
    }

    #[inline]
    fn insert(&mut self, key: u64) {
        for v in self.strategy.get(key).indices() {
            let slot = &mut self.slots[v];
            slot.degree += 1;
            slot.mask ^= key;
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Live edges. Equal to the key count until the graph is peeled.
    pub fn remaining(&self) -> usize {
        self.edges
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn strategy(&self) -> &H {
        &self.strategy
    }

    /// Peels with a LIFO work list; `true` iff every edge is removed.
    pub fn is_peelable(self) -> bool {
        self.peel(PeelOrder::Stack).is_complete()
    }

    /// Repeatedly removes a degree-1 slot together with its only edge.
    ///
    /// 1) seed the work list with every degree-1 slot and its mask
    /// 2) pop; skip the entry if its slot dropped to degree 0 meanwhile
    /// 3) otherwise XOR the key out of its 3 slots and enqueue any slot left
    ///    at degree 1
    ///
    /// Stops as soon as the last edge is gone. Consumes the hypergraph: its
    /// slot table no longer describes the original graph afterwards.
    pub fn peel(mut self, order: PeelOrder) -> PeelReport {
        let mut remaining = self.edges;
        let mut work: Vec<(usize, u64)> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.degree == 1)
            .map(|(v, s)| (v, s.mask))
            .collect();
        let mut head = 0usize;

        loop {
            let next = match order {
                PeelOrder::Stack => work.pop(),
                PeelOrder::Queue => {
                    let item = work.get(head).copied();
                    head += 1;
                    item
                }
            };
            let Some((v, key)) = next else { break };
            if self.slots[v].degree == 0 {
                continue;
            }
            debug_assert_eq!(self.slots[v].degree, 1);

            for u in self.strategy.get(key).indices() {
                let slot = &mut self.slots[u];
                if slot.degree > 0 {
                    slot.mask ^= key;
                    slot.degree -= 1;
                    if slot.degree == 1 {
                        work.push((u, slot.mask));
                    }
                }
            }

            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }

        PeelReport {
            edges: self.edges,
            peeled: self.edges - remaining,
        }
    }
}
