//! Scoring and per-episode statistics.

use crate::LineageId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Score card of one agent at a point in an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentScore {
    pub lineage_id: LineageId,
    /// Ticks survived plus the ages of every agent it eliminated
    pub points: u64,
    pub age: u64,
    pub kills: u32,
    pub playing: bool,
}

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Fewer than two agents still playing
    Elimination,
    /// The frame budget ran out
    FrameBudget,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Elimination => write!(f, "elimination"),
            EndReason::FrameBudget => write!(f, "frame_budget"),
        }
    }
}

/// Aggregate statistics for the members of one lineage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageStats {
    pub lineage_id: LineageId,
    pub members: u32,
    pub total_points: u64,
    pub best_points: u64,
}

impl LineageStats {
    pub fn new(lineage_id: LineageId) -> Self {
        Self {
            lineage_id,
            members: 0,
            total_points: 0,
            best_points: 0,
        }
    }

    pub fn update(&mut self, score: &AgentScore) {
        self.members += 1;
        self.total_points += score.points;
        self.best_points = self.best_points.max(score.points);
    }

    pub fn mean_points(&self) -> f64 {
        if self.members == 0 {
            0.0
        } else {
            self.total_points as f64 / self.members as f64
        }
    }
}

/// What one finished episode looked like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub generation: u64,
    pub frames: u64,
    pub reason: EndReason,
    pub population: usize,
    pub survivors: usize,
    pub best_points: u64,
    pub mean_points: f64,
    pub total_kills: u32,
    pub lineages: Vec<LineageStats>,
}

impl EpisodeSummary {
    pub fn from_scores<'a>(
        generation: u64,
        frames: u64,
        reason: EndReason,
        scores: impl IntoIterator<Item = &'a AgentScore>,
    ) -> Self {
        let mut population = 0usize;
        let mut survivors = 0usize;
        let mut best_points = 0u64;
        let mut total_points = 0u64;
        let mut total_kills = 0u32;
        let mut by_lineage: HashMap<LineageId, LineageStats> = HashMap::new();

        for score in scores {
            population += 1;
            if score.playing {
                survivors += 1;
            }
            best_points = best_points.max(score.points);
            total_points += score.points;
            total_kills += score.kills;
            by_lineage
                .entry(score.lineage_id)
                .or_insert_with(|| LineageStats::new(score.lineage_id))
                .update(score);
        }

        let mut lineages: Vec<LineageStats> = by_lineage.into_values().collect();
        lineages.sort_by(|a, b| {
            b.best_points
                .cmp(&a.best_points)
                .then(b.members.cmp(&a.members))
        });

        let mean_points = if population == 0 {
            0.0
        } else {
            total_points as f64 / population as f64
        };

        Self {
            generation,
            frames,
            reason,
            population,
            survivors,
            best_points,
            mean_points,
            total_kills,
            lineages,
        }
    }
}
