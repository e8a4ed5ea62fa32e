//! Double-buffered cellular automaton over a toroidal grid.

use crate::grid::Grid;
use neurosketch_core::{Position, RandomSource};
use std::mem;
use tracing::trace;

/// Local update rule: next value of a cell from its own value and its
/// Moore neighborhood (clockwise from north).
pub trait Rule<T> {
    fn apply(&self, center: T, neighbors: &[T; 8]) -> T;
}

impl<T, F> Rule<T> for F
where
    F: Fn(T, &[T; 8]) -> T,
{
    fn apply(&self, center: T, neighbors: &[T; 8]) -> T {
        self(center, neighbors)
    }
}

/// Conway's Game of Life on 0/1 cells.
///
/// A live cell survives with 2 or 3 live neighbors, a dead cell is born with
/// exactly 3. Any other center value passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameOfLife;

impl Rule<u8> for GameOfLife {
    fn apply(&self, center: u8, neighbors: &[u8; 8]) -> u8 {
        let total: u32 = neighbors.iter().map(|&n| u32::from(n)).sum();
        match (center, total) {
            (1, 2) | (1, 3) => 1,
            (1, _) => 0,
            (0, 3) => 1,
            _ => center,
        }
    }
}

impl<T: Copy + Default> Grid<T> {
    /// Write the successor of `self` under `rule` into `next`.
    ///
    /// Only `self` is read, so no cell ever sees a value produced in the same step.
    /// `next` is resized to match if its dimensions differ.
    pub fn step_into<R: Rule<T> + ?Sized>(&self, rule: &R, next: &mut Grid<T>) {
        if !next.same_shape(self) {
            *next = self.clone();
        }
        for index in 0..self.len() {
            let pos = self.index_to_pos(index);
            let value = rule.apply(self.get(pos), &self.neighbors(pos));
            next.set(pos, value);
        }
    }

    /// Freshly allocated successor grid; `self` is left untouched
    pub fn step<R: Rule<T> + ?Sized>(&self, rule: &R) -> Grid<T> {
        let mut next = self.clone();
        self.step_into(rule, &mut next);
        next
    }
}

/// Initializer that makes every column divisible by `period` live and leaves
/// the rest undefined.
pub fn column_stripes(period: i32) -> impl Fn(i32, i32) -> Option<u8> {
    move |col, _row| (col.rem_euclid(period) == 0).then_some(1)
}

/// Initializer that makes each cell live with probability `density`
pub fn random_soup<R: RandomSource + ?Sized>(
    density: f64,
    rng: &mut R,
) -> impl FnMut(i32, i32) -> Option<u8> + '_ {
    move |_col, _row| (rng.next_f64() < density).then_some(1)
}

/// Owns the current and next buffers and swaps them after each step
pub struct Automaton<T, R> {
    current: Grid<T>,
    next: Grid<T>,
    rule: R,
    generation: u64,
}

impl<T: Copy + Default, R: Rule<T>> Automaton<T, R> {
    pub fn new(initial: Grid<T>, rule: R) -> Self {
        let next = initial.clone();
        Self {
            current: initial,
            next,
            rule,
            generation: 0,
        }
    }

    /// Advance one generation
    pub fn step(&mut self) -> &Grid<T> {
        self.current.step_into(&self.rule, &mut self.next);
        mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        trace!(generation = self.generation, "Automaton stepped");
        &self.current
    }

    /// Replace the state and restart the generation count
    pub fn reset(&mut self, grid: Grid<T>) {
        self.next = grid.clone();
        self.current = grid;
        self.generation = 0;
    }

    pub fn current(&self) -> &Grid<T> {
        &self.current
    }

    /// Mutable access for external edits between steps
    pub fn current_mut(&mut self) -> &mut Grid<T> {
        &mut self.current
    }

    pub fn get(&self, pos: Position) -> T {
        self.current.get(pos)
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
