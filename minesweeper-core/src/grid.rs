use core::fmt;
use std::collections::VecDeque;
use std::ops::{Add, Index, IndexMut};

pub static UP_LEFT: Coord = Coord::new(-1, -1);
pub static UP: Coord = Coord::new(-1, 0);
pub static UP_RIGHT: Coord = Coord::new(-1, 1);
pub static LEFT: Coord = Coord::new(0, -1);
pub static CENTER: Coord = Coord::new(0, 0);
pub static RIGHT: Coord = Coord::new(0, 1);
pub static DOWN_LEFT: Coord = Coord::new(1, -1);
pub static DOWN: Coord = Coord::new(1, 0);
pub static DOWN_RIGHT: Coord = Coord::new(1, 1);

pub static OFFSETS: [Coord; 8] = [UP_LEFT, UP, UP_RIGHT, LEFT, RIGHT, DOWN_LEFT, DOWN, DOWN_RIGHT];
pub static CENTER_AND_OFFSETS: [Coord; 9] = [UP_LEFT, UP, UP_RIGHT, LEFT, CENTER, RIGHT, DOWN_LEFT, DOWN, DOWN_RIGHT];

/// A (row, col) pair. Signed so that off-grid neighbours and bad input can be
/// represented and rejected by the grid instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
  pub row: i32,
  pub col: i32,
}

impl Coord {
  pub const fn new(row: i32, col: i32) -> Coord {
    Coord { row, col }
  }

  /// The cell itself followed by its Moore neighbourhood, unclipped.
  pub fn with_neighbours(self) -> impl Iterator<Item = Coord> {
    CENTER_AND_OFFSETS.iter().map(move |&offset| offset + self)
  }

  /// The Moore neighbourhood, unclipped.
  pub fn neighbours(self) -> impl Iterator<Item = Coord> {
    OFFSETS.iter().map(move |&offset| offset + self)
  }
}

impl fmt::Debug for Coord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.row, self.col)
  }
}

impl From<(i32, i32)> for Coord {
  fn from((row, col): (i32, i32)) -> Self {
    Coord::new(row, col)
  }
}

impl Add<Coord> for Coord {
  type Output = Coord;

  fn add(self, rhs: Coord) -> Self::Output {
    Coord::new(self.row + rhs.row, self.col + rhs.col)
  }
}

/// Row-major rectangular storage. The grid owns every element; callers only
/// ever get borrows.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
  pub rows: u32,
  pub cols: u32,
  cells: Vec<T>,
}

impl<T> Grid<T> {
  pub fn new(rows: u32, cols: u32, default: T) -> Self
  where
    T: Clone,
  {
    Self {
      rows,
      cols,
      cells: vec![default; rows as usize * cols as usize],
    }
  }

  /// Builds a grid by calling `init` once per coordinate in row-major order.
  pub fn from_fn(rows: u32, cols: u32, mut init: impl FnMut(Coord) -> T) -> Self {
    let cells = CoordIterator::new(rows, cols).map(&mut init).collect();
    Self { rows, cols, cells }
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn contains(&self, pos: Coord) -> bool {
    self.coord_to_index(pos).is_some()
  }

  fn coord_to_index(&self, pos: Coord) -> Option<usize> {
    match (usize::try_from(pos.row), usize::try_from(pos.col)) {
      (Ok(row), Ok(col)) if row < self.rows as usize && col < self.cols as usize => Some(col + row * self.cols as usize),
      _ => None,
    }
  }

  pub fn get(&self, pos: Coord) -> Option<&T> {
    self.coord_to_index(pos).and_then(|i| self.cells.get(i))
  }

  pub fn get_mut(&mut self, pos: Coord) -> Option<&mut T> {
    self.coord_to_index(pos).and_then(|i| self.cells.get_mut(i))
  }

  /// In-bounds neighbours of `pos`, excluding `pos` itself.
  pub fn neighbours(&self, pos: Coord) -> impl Iterator<Item = Coord> + '_ {
    pos.neighbours().filter(move |&n| self.contains(n))
  }

  pub fn get_around(&self, pos: Coord) -> impl Iterator<Item = &T> {
    pos.neighbours().flat_map(|n| self.get(n))
  }

  pub fn coords(&self) -> CoordIterator {
    CoordIterator::new(self.rows, self.cols)
  }

  pub fn enumerate(&self) -> impl Iterator<Item = (Coord, &T)> {
    self.coords().zip(self.cells.iter())
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.cells.iter()
  }
}

impl<T> Index<Coord> for Grid<T> {
  type Output = T;

  fn index(&self, index: Coord) -> &Self::Output {
    self.get(index).unwrap_or_else(|| {
      panic!(
        "Cannot access cell {:?} on grid with size {}x{}",
        index, self.rows, self.cols
      )
    })
  }
}

impl<T> IndexMut<Coord> for Grid<T> {
  fn index_mut(&mut self, index: Coord) -> &mut T {
    let (rows, cols) = (self.rows, self.cols);
    self.get_mut(index).unwrap_or_else(|| {
      panic!(
        "Cannot mut-access cell {:?} on grid with size {}x{}",
        index, rows, cols
      )
    })
  }
}

pub struct CoordIterator {
  next: Coord,
  rows: i32,
  cols: i32,
}

impl CoordIterator {
  pub fn new(rows: u32, cols: u32) -> Self {
    Self {
      next: if cols == 0 { Coord::new(rows as i32, 0) } else { Coord::new(0, 0) },
      rows: rows as i32,
      cols: cols as i32,
    }
  }
}

impl Iterator for CoordIterator {
  type Item = Coord;

  fn next(&mut self) -> Option<Self::Item> {
    let pos = &mut self.next;
    if pos.row >= self.rows {
      None
    } else {
      let result = *pos;
      pos.col += 1;
      if pos.col >= self.cols {
        pos.col = 0;
        pos.row += 1;
      }
      Some(result)
    }
  }
}

/// Work queue for breadth-first walks over a grid. Each coordinate is
/// enqueued at most once; off-grid coordinates are dropped.
#[derive(Clone)]
pub struct GridExplorer {
  queue: VecDeque<Coord>,
  visited: Grid<bool>,
}

impl GridExplorer {
  pub fn enqueue(&mut self, pos: Coord) -> bool {
    if let Some(seen) = self.visited.get_mut(pos) {
      if !*seen {
        *seen = true;
        self.queue.push_back(pos);
        return true;
      }
    }
    false
  }

  pub fn enqueue_all(&mut self, all: impl IntoIterator<Item = Coord>) {
    for pos in all {
      self.enqueue(pos);
    }
  }

  pub fn pop(&mut self) -> Option<Coord> {
    self.queue.pop_front()
  }
}

impl<T> From<&Grid<T>> for GridExplorer {
  fn from(grid: &Grid<T>) -> Self {
    Self {
      queue: VecDeque::new(),
      visited: Grid::new(grid.rows, grid.cols, false),
    }
  }
}
