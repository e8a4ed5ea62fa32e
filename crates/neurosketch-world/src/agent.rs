//! Agent state and per-tick behavior.

use neurosketch_core::{AgentScore, LineageId, PopulationConfig, RandomSource, Result, Vec2};
use neurosketch_net::{Activations, Mutator, Network};
use serde::{Deserialize, Serialize};

/// Output channel driving forward speed
pub const SPEED: usize = 0;
/// Output channel subtracted from the turn angle
pub const TURN_MINUS: usize = 1;
/// Output channel added to the turn angle
pub const TURN_PLUS: usize = 2;
/// First channel fed back from outputs into the next tick's inputs
pub const MEMORY: usize = 3;

/// A segmented agent: a head that steers and a tail that trails it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub lineage_id: LineageId,
    pub head: Vec2,
    pub tail: Vec2,
    /// Unit vector of travel
    pub heading: Vec2,
    pub size: f64,
    pub playing: bool,
    pub age: u64,
    pub points: u64,
    pub kills: u32,
    pub network: Network,
    pub activations: Activations,
    pub inputs: Vec<f64>,
    pub outputs: Vec<f64>,
    /// Display tag inherited with drift
    pub hue: f64,
    /// Nearest tail last seen, in this agent's heading frame
    pub rel: Vec2,
    pub nearest_distance: f64,
}

impl Agent {
    /// Place a new agent with the given genotype at a random spot and heading
    pub fn spawn<R: RandomSource + ?Sized>(
        config: &PopulationConfig,
        network: Network,
        lineage_id: LineageId,
        hue: f64,
        rng: &mut R,
    ) -> Self {
        let head = rng.unit_point();
        let heading = rng.unit_vector();
        let width = network.width();
        let activations = Activations::for_network(&network);

        Self {
            lineage_id,
            head,
            tail: (head - heading * config.agent_size).wrap_unit(),
            heading,
            size: config.agent_size,
            playing: true,
            age: 0,
            points: 0,
            kills: 0,
            network,
            activations,
            inputs: vec![0.0; width],
            outputs: vec![0.0; width],
            hue,
            rel: Vec2::ZERO,
            nearest_distance: config.no_neighbor_distance,
        }
    }

    /// First-generation agent with a fresh random genotype and lineage
    pub fn random<R: RandomSource + ?Sized>(config: &PopulationConfig, rng: &mut R) -> Self {
        let network = Network::random(&config.network, rng);
        let hue = rng.next_f64();
        Self::spawn(config, network, LineageId::new(), hue, rng)
    }

    /// Child of `parent` carrying `mutations` point mutations of its genotype
    pub fn offspring<R: RandomSource + ?Sized>(
        parent: &Agent,
        mutations: usize,
        mutator: &Mutator,
        config: &PopulationConfig,
        rng: &mut R,
    ) -> Self {
        let mut network = parent.network.clone();
        mutator.mutate(&mut network, mutations, rng);
        let hue = (parent.hue + (rng.next_f64() - 0.5) * config.hue_drift).rem_euclid(1.0);
        Self::spawn(config, network, parent.lineage_id, hue, rng)
    }

    /// Evaluate the network on the current inputs
    pub fn think(&mut self) -> Result<()> {
        let outputs = self.network.activate(&self.inputs, &mut self.activations)?;
        self.outputs.clear();
        self.outputs.extend_from_slice(outputs);
        Ok(())
    }

    /// Turn by the differential signal, advance by the speed signal, wrap, drag the tail
    pub fn steer(&mut self, max_speed: f64, dt: f64) {
        let turn = self.outputs[TURN_PLUS] - self.outputs[TURN_MINUS];
        self.heading = self.heading.rotate(turn);
        let stride = self.outputs[SPEED] * max_speed * dt;
        self.head = (self.head + self.heading * stride).wrap_unit();
        self.follow();
    }

    /// Keep the tail exactly `size` behind the head along the last offset
    fn follow(&mut self) {
        let offset = (self.tail - self.head).relative_wrap().with_length(self.size);
        let offset = if offset == Vec2::ZERO {
            self.heading * -self.size
        } else {
            offset
        };
        self.tail = (self.head + offset).wrap_unit();
    }

    /// Age, think and move. Does nothing once the agent is out.
    pub fn step(&mut self, max_speed: f64, dt: f64) -> Result<()> {
        if !self.playing {
            return Ok(());
        }
        self.age += 1;
        self.points += 1;
        self.think()?;
        self.steer(max_speed, dt);
        Ok(())
    }

    /// Whether this agent's head is within `size` of `other`'s tail
    pub fn reaches(&self, other: &Agent) -> bool {
        self.head.toroidal_distance(&other.tail) < self.size
    }

    /// Shortest displacement from this head to `point`, rotated into the heading frame
    pub fn relative_to(&self, point: Vec2) -> Vec2 {
        (point - self.head)
            .relative_wrap()
            .rotate(-self.heading.angle())
    }

    /// Take the agent out of play. Returns false if it already was.
    pub fn eliminate(&mut self) -> bool {
        std::mem::replace(&mut self.playing, false)
    }

    /// Build next tick's inputs from the nearest neighbor, if one was seen.
    ///
    /// Without a neighbor `rel` keeps its previous value and the distance
    /// falls back to `no_neighbor_distance`.
    pub fn sense(&mut self, nearest: Option<Vec2>, no_neighbor_distance: f64) {
        match nearest {
            Some(rel) => {
                self.rel = rel;
                self.nearest_distance = rel.length();
            }
            None => self.nearest_distance = no_neighbor_distance,
        }

        let proximity = 0.5 / (0.5 + self.rel.length());
        let direction = self.rel.with_length(0.5);
        self.inputs[0] = proximity;
        self.inputs[1] = direction.x + 0.5;
        self.inputs[2] = direction.y + 0.5;
        for channel in MEMORY..self.inputs.len() {
            self.inputs[channel] = self.outputs[channel];
        }
    }

    pub fn score(&self) -> AgentScore {
        AgentScore {
            lineage_id: self.lineage_id,
            points: self.points,
            age: self.age,
            kills: self.kills,
            playing: self.playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn agent(seed: u64) -> Agent {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Agent::random(&PopulationConfig::default(), &mut rng)
    }

    #[test]
    fn test_agent_creation() {
        let a = agent(1);
        assert!(a.playing);
        assert_eq!(a.age, 0);
        assert_eq!(a.points, 0);
        assert_eq!(a.inputs.len(), 4);
        assert_eq!(a.outputs.len(), 4);
        assert_eq!(a.activations.layers().len(), 4);
        assert!(close(a.heading.length(), 1.0));
        assert!(close(a.head.toroidal_distance(&a.tail), a.size));
    }

    #[test]
    fn test_step_ages_and_moves() {
        let mut a = agent(2);
        a.step(0.3, 1.0 / 60.0).unwrap();

        assert_eq!(a.age, 1);
        assert_eq!(a.points, 1);
        assert!(a.outputs.iter().all(|&o| o > 0.0 && o < 1.0));
        assert!((0.0..1.0).contains(&a.head.x) && (0.0..1.0).contains(&a.head.y));
        assert!(close(a.head.toroidal_distance(&a.tail), a.size));
    }

    #[test]
    fn test_steer_wraps_and_turns() {
        let mut a = agent(3);
        a.head = Vec2::new(0.99, 0.5);
        a.heading = Vec2::new(1.0, 0.0);
        a.tail = Vec2::new(0.97, 0.5);
        a.outputs = vec![1.0, 0.0, 0.0, 0.0];

        a.steer(0.6, 0.1);
        assert!(close(a.head.x, 0.05));
        assert!(close(a.head.y, 0.5));
        // tail stays behind across the seam
        assert!(close(a.tail.x, 0.05 - a.size));

        a.outputs = vec![0.0, 0.0, FRAC_PI_2, 0.0];
        a.steer(0.6, 0.1);
        assert!(close(a.heading.x, 0.0));
        assert!(close(a.heading.y, 1.0));
    }

    #[test]
    fn test_eliminated_agent_is_frozen() {
        let mut a = agent(4);
        assert!(a.eliminate());
        assert!(!a.eliminate());

        let head = a.head;
        a.step(0.3, 1.0).unwrap();
        assert_eq!(a.age, 0);
        assert_eq!(a.head, head);
    }

    #[test]
    fn test_reaches_other_tail() {
        let mut hunter = agent(5);
        let mut prey = agent(6);
        hunter.head = Vec2::new(0.001, 0.5);
        prey.tail = Vec2::new(0.995, 0.5);
        assert!(hunter.reaches(&prey));

        prey.tail = Vec2::new(0.9, 0.5);
        assert!(!hunter.reaches(&prey));
    }

    #[test]
    fn test_relative_to_uses_heading_frame() {
        let mut a = agent(7);
        a.head = Vec2::new(0.5, 0.5);
        a.heading = Vec2::new(0.0, 1.0);

        // straight ahead ends up on the local +x axis
        let rel = a.relative_to(Vec2::new(0.5, 0.6));
        assert!(close(rel.x, 0.1));
        assert!(close(rel.y, 0.0));
    }

    #[test]
    fn test_sense_builds_inputs() {
        let mut a = agent(8);
        a.outputs = vec![0.1, 0.2, 0.3, 0.75];

        a.sense(Some(Vec2::new(0.5, 0.0)), 2.0);
        assert!(close(a.inputs[0], 0.5));
        assert!(close(a.inputs[1], 1.0));
        assert!(close(a.inputs[2], 0.5));
        assert_eq!(a.inputs[3], 0.75);
        assert!(close(a.nearest_distance, 0.5));
    }

    #[test]
    fn test_sense_without_neighbor_keeps_rel() {
        let mut a = agent(9);
        a.sense(Some(Vec2::new(0.0, -0.25)), 2.0);
        let rel = a.rel;

        a.sense(None, 2.0);
        assert_eq!(a.rel, rel);
        assert_eq!(a.nearest_distance, 2.0);
        assert!(close(a.inputs[0], 0.5 / 0.75));
        assert!(close(a.inputs[2], 0.0));
    }

    #[test]
    fn test_offspring_inherits() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let config = PopulationConfig::default();
        let parent = Agent::random(&config, &mut rng);

        let clone = Agent::offspring(&parent, 0, &Mutator::default(), &config, &mut rng);
        assert_eq!(clone.network, parent.network);
        assert_eq!(clone.lineage_id, parent.lineage_id);
        assert!((clone.hue - parent.hue).abs() <= 0.05 || (clone.hue - parent.hue).abs() >= 0.95);
        assert!(clone.playing);

        let mutant = Agent::offspring(&parent, 5, &Mutator::default(), &config, &mut rng);
        assert_ne!(mutant.network, parent.network);
        assert_eq!(mutant.network.weight_count(), parent.network.weight_count());
    }

    #[test]
    fn test_snapshot_restores_behavior() {
        let mut a = agent(11);
        a.step(0.3, 1.0 / 60.0).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        let mut restored: Agent = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.lineage_id, a.lineage_id);
        assert_eq!(restored.age, a.age);
        assert_eq!(restored.network.weight_count(), a.network.weight_count());
        a.step(0.3, 1.0 / 60.0).unwrap();
        restored.step(0.3, 1.0 / 60.0).unwrap();
        for (x, y) in restored.outputs.iter().zip(&a.outputs) {
            assert!((x - y).abs() < 1e-9);
        }
        assert!(restored.head.toroidal_distance(&a.head) < 1e-9);
    }
}
