//! Episode engine for an evolving population of network-driven agents.

use crate::agent::Agent;
use crate::selection::{policy_for, SelectionPolicy};
use neurosketch_core::{
    AgentScore, EndReason, EpisodeSummary, PopulationConfig, RandomSource, Result, Vec2,
};
use neurosketch_net::Mutator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::{debug, info, instrument, trace};

/// One agent taking another out of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elimination {
    /// Index of the hunter in the population before this tick's ranking
    pub hunter: usize,
    /// Index of the eliminated agent, same numbering
    pub victim: usize,
    /// Points awarded to the hunter, the victim's age
    pub reward: u64,
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub generation: u64,
    pub frame: u64,
    /// Agents still playing once eliminations were applied
    pub playing: usize,
    pub eliminations: Vec<Elimination>,
    /// Set on the tick that ended the episode. The population has already
    /// been replaced by the next generation when this is returned.
    pub episode: Option<EpisodeSummary>,
}

pub struct Population<R = ChaCha8Rng> {
    config: PopulationConfig,
    mutator: Mutator,
    selection: Box<dyn SelectionPolicy>,
    agents: Vec<Agent>,
    frames: u64,
    generation: u64,
    rng: R,
}

impl Population<ChaCha8Rng> {
    /// Population driven by a seeded ChaCha stream
    pub fn new(config: PopulationConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> Population<R> {
    /// Validate `config` and create the first generation from random genotypes
    pub fn with_rng(config: PopulationConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let mut population = Self {
            mutator: Mutator::new(config.mutation.clone()),
            selection: policy_for(config.selection),
            config,
            agents: Vec::new(),
            frames: 0,
            generation: 0,
            rng,
        };
        population.reset();
        Ok(population)
    }

    /// Swap the parent selection strategy used by later resets
    pub fn set_selection(&mut self, selection: Box<dyn SelectionPolicy>) {
        self.selection = selection;
    }

    /// Start a new episode.
    ///
    /// With no previous population the agents are random. Otherwise each child
    /// `i` clones a parent picked by the selection policy from the previous
    /// agents (best first) and receives `i` point mutations.
    pub fn reset(&mut self) -> &[Agent] {
        self.generation += 1;
        let mut previous = mem::take(&mut self.agents);
        let mut next = Vec::with_capacity(self.config.pop_size);

        if previous.is_empty() {
            for _ in 0..self.config.pop_size {
                next.push(Agent::random(&self.config, &mut self.rng));
            }
        } else {
            rank(&mut previous);
            for index in 0..self.config.pop_size {
                let parent = self
                    .selection
                    .select_parent(&previous, index, &mut self.rng)
                    .min(previous.len() - 1);
                next.push(Agent::offspring(
                    &previous[parent],
                    index,
                    &self.mutator,
                    &self.config,
                    &mut self.rng,
                ));
            }
        }

        debug!(
            event = "population_reset",
            generation = self.generation,
            pop_size = next.len(),
            selection = self.selection.name(),
            inherited = !previous.is_empty(),
            "New generation created"
        );

        self.agents = next;
        self.frames = 0;
        &self.agents
    }

    /// Advance every agent by one frame of `dt` seconds.
    ///
    /// Three barriers keep the outcome independent of agent order: all playing
    /// agents move, then every head/tail contact is resolved against the
    /// post-move positions, then survivors sense each other. When the episode
    /// ends the summary is taken and the next generation is bred before returning.
    #[instrument(level = "trace", skip(self))]
    pub fn tick(&mut self, dt: f64) -> Result<TickReport> {
        self.frames += 1;

        for agent in self.agents.iter_mut() {
            agent.step(self.config.max_speed, dt)?;
        }

        let eliminations = self.resolve_contacts();
        self.sense();
        rank(&mut self.agents);

        let playing = self.playing_count();
        let reason = if playing < 2 {
            Some(EndReason::Elimination)
        } else if self.frames >= self.config.max_frames {
            Some(EndReason::FrameBudget)
        } else {
            None
        };

        let mut report = TickReport {
            generation: self.generation,
            frame: self.frames,
            playing,
            eliminations,
            episode: None,
        };

        if let Some(reason) = reason {
            report.episode = Some(self.summarize(reason));
            self.reset();
        }

        Ok(report)
    }

    /// Tick until the current episode ends and return its summary
    pub fn run_episode(&mut self, dt: f64) -> Result<EpisodeSummary> {
        loop {
            if let Some(summary) = self.tick(dt)?.episode {
                return Ok(summary);
            }
        }
    }

    /// Every ordered pair of distinct playing agents where the first one's
    /// head touches the second one's tail. All hits count, including mutual ones.
    fn resolve_contacts(&mut self) -> Vec<Elimination> {
        let playing: Vec<usize> = self.playing_indices();
        let mut hits = Vec::new();
        for &hunter in &playing {
            for &victim in &playing {
                if hunter != victim && self.agents[hunter].reaches(&self.agents[victim]) {
                    hits.push((hunter, victim));
                }
            }
        }

        let eliminations: Vec<Elimination> = hits
            .into_iter()
            .map(|(hunter, victim)| {
                let reward = self.agents[victim].age;
                self.agents[victim].eliminate();
                let winner = &mut self.agents[hunter];
                winner.points += reward;
                winner.kills += 1;
                trace!(
                    event = "elimination",
                    hunter,
                    victim,
                    reward,
                    frame = self.frames,
                    "Agent eliminated"
                );
                Elimination {
                    hunter,
                    victim,
                    reward,
                }
            })
            .collect();

        eliminations
    }

    /// Point each playing agent at the nearest tail among the other playing agents
    fn sense(&mut self) {
        let tails: Vec<(usize, Vec2)> = self
            .playing_indices()
            .into_iter()
            .map(|i| (i, self.agents[i].tail))
            .collect();

        for &(index, _) in &tails {
            let agent = &self.agents[index];
            let mut nearest = None;
            let mut nearest_distance = self.config.no_neighbor_distance;
            for &(other, tail) in &tails {
                if other == index {
                    continue;
                }
                let rel = agent.relative_to(tail);
                let distance = rel.length();
                // strict, so the first of equally near neighbors is kept
                if distance < nearest_distance {
                    nearest_distance = distance;
                    nearest = Some(rel);
                }
            }
            self.agents[index].sense(nearest, self.config.no_neighbor_distance);
        }
    }

    fn summarize(&self, reason: EndReason) -> EpisodeSummary {
        let scores: Vec<AgentScore> = self.agents.iter().map(Agent::score).collect();
        let summary = EpisodeSummary::from_scores(self.generation, self.frames, reason, &scores);

        info!(
            event = "episode_summary",
            generation = summary.generation,
            frames = summary.frames,
            reason = %summary.reason,
            survivors = summary.survivors,
            best_points = summary.best_points,
            mean_points = summary.mean_points,
            total_kills = summary.total_kills,
            lineages = summary.lineages.len(),
            "Episode complete"
        );

        summary
    }

    fn playing_indices(&self) -> Vec<usize> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.playing)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn playing_count(&self) -> usize {
        self.agents.iter().filter(|a| a.playing).count()
    }

    /// Agents ranked by points, best first, as of the last tick
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable access for hosts that place or perturb agents between ticks
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Highest ranked agent still playing
    pub fn best(&self) -> Option<&Agent> {
        self.agents.iter().find(|a| a.playing)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Episodes started so far, the first being 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn selection(&self) -> &dyn SelectionPolicy {
        self.selection.as_ref()
    }
}

/// Stable sort by points, best first
fn rank(agents: &mut [Agent]) {
    agents.sort_by(|a, b| b.points.cmp(&a.points));
}
