//! 2D toroidal grid of cell values.

use neurosketch_core::{Direction, Error, Position, Result};
use serde::{Deserialize, Serialize};

/// A 2D toroidal grid.
///
/// Every integer coordinate resolves to exactly one cell by Euclidean wrap;
/// `T::default()` is the grid's zero value. Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>")]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

/// Unchecked wire form of a [`Grid`]
#[derive(Deserialize)]
struct RawGrid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = Error;

    fn try_from(raw: RawGrid<T>) -> Result<Self> {
        if raw.width <= 0 || raw.height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                raw.width, raw.height
            )));
        }
        let expected = raw.width as usize * raw.height as usize;
        if raw.cells.len() != expected {
            return Err(Error::Validation(format!(
                "{}x{} grid needs {} cells, got {}",
                raw.width,
                raw.height,
                expected,
                raw.cells.len()
            )));
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        })
    }
}

impl<T: Copy + Default> Grid<T> {
    /// All-zero grid
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let size = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            cells: vec![T::default(); size],
        })
    }

    /// Fill every cell by calling `init(col, row)` once per coordinate.
    ///
    /// `None` leaves the cell at the zero value.
    pub fn from_fn<F>(width: i32, height: i32, mut init: F) -> Result<Self>
    where
        F: FnMut(i32, i32) -> Option<T>,
    {
        let mut grid = Self::new(width, height)?;
        for row in 0..height {
            for col in 0..width {
                if let Some(value) = init(col, row) {
                    let index = grid.pos_to_index(Position::new(col, row));
                    grid.cells[index] = value;
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `other` has the same dimensions
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Get cell at position (with toroidal wrapping)
    pub fn get(&self, pos: Position) -> T {
        self.cells[self.wrapped_index(pos)]
    }

    /// Get mutable cell at position
    pub fn get_mut(&mut self, pos: Position) -> &mut T {
        let index = self.wrapped_index(pos);
        &mut self.cells[index]
    }

    /// Set cell at position
    pub fn set(&mut self, pos: Position, value: T) {
        let index = self.wrapped_index(pos);
        self.cells[index] = value;
    }

    /// Moore neighborhood of `pos`, clockwise from north
    pub fn neighbors(&self, pos: Position) -> [T; 8] {
        Direction::all().map(|dir| {
            let (dx, dy) = dir.to_delta();
            self.get(pos.offset_wrapped(dx, dy, self.width, self.height))
        })
    }

    /// Reset every cell to the zero value
    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }

    /// Number of cells matching `pred`
    pub fn count<P>(&self, pred: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.cells.iter().filter(|cell| pred(cell)).count()
    }

    /// Write every cell of `pattern` relative to `origin`, wrapping at the edges
    pub fn stamp(&mut self, pattern: &Pattern<T>, origin: Position) {
        for &(dx, dy, value) in &pattern.cells {
            let pos = origin.offset_wrapped(dx, dy, self.width, self.height);
            self.set(pos, value);
        }
    }

    fn wrapped_index(&self, pos: Position) -> usize {
        self.pos_to_index(pos.wrap(self.width, self.height))
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index % self.width as usize) as i32;
        let y = (index / self.width as usize) as i32;
        Position::new(x, y)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }
}

/// A set of cell writes relative to an origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern<T> {
    pub cells: Vec<(i32, i32, T)>,
}

impl<T> Pattern<T> {
    pub fn new(cells: Vec<(i32, i32, T)>) -> Self {
        Self { cells }
    }
}

impl Pattern<u8> {
    /// Three live cells in a horizontal row centered on the origin
    pub fn blinker() -> Self {
        Self::new(vec![(-1, 0, 1), (0, 0, 1), (1, 0, 1)])
    }

    /// Glider heading south-east, written into the origin's Moore neighborhood.
    ///
    /// The origin cell itself is left untouched.
    pub fn glider() -> Self {
        Self::new(vec![
            (0, -1, 1),
            (1, -1, 0),
            (1, 0, 1),
            (1, 1, 1),
            (0, 1, 1),
            (-1, 1, 1),
            (-1, 0, 0),
            (-1, -1, 0),
        ])
    }
}
