//! Parent selection strategies for reproduction.

use crate::agent::Agent;
use neurosketch_core::{RandomSource, SelectionKind};

/// Picks which agent of the finished episode parents each child.
///
/// `ranked` is sorted by points, best first, and is never empty.
pub trait SelectionPolicy {
    fn name(&self) -> &'static str;

    /// Index into `ranked` of the parent of child number `child_index`
    fn select_parent(
        &self,
        ranked: &[Agent],
        child_index: usize,
        rng: &mut dyn RandomSource,
    ) -> usize;
}

/// Every agent is equally likely, regardless of rank
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelection;

impl SelectionPolicy for UniformSelection {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn select_parent(&self, ranked: &[Agent], _child_index: usize, rng: &mut dyn RandomSource) -> usize {
        rng.index(ranked.len())
    }
}

/// Child `i` draws uniformly from the top `max(i, 1)` ranked agents, so the
/// first children all descend from the winner and later ones widen the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankBiasedSelection;

impl SelectionPolicy for RankBiasedSelection {
    fn name(&self) -> &'static str {
        "rank_biased"
    }

    fn select_parent(&self, ranked: &[Agent], child_index: usize, rng: &mut dyn RandomSource) -> usize {
        let pool = child_index.clamp(1, ranked.len());
        rng.index(pool)
    }
}

pub fn policy_for(kind: SelectionKind) -> Box<dyn SelectionPolicy> {
    match kind {
        SelectionKind::Uniform => Box::new(UniformSelection),
        SelectionKind::RankBiased => Box::new(RankBiasedSelection),
    }
}
