use std::collections::BTreeSet;

use log::trace;
use rand::Rng;

use crate::board::Cell;
use crate::error::{Error, Result};
use crate::grid::{Coord, Grid};

/// The set of coordinates currently holding a mine. Kept in sync with the
/// `has_mine` bits of the grid it was placed on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MineField {
  mines: BTreeSet<Coord>,
}

impl MineField {
  /// Draws `mine_count` distinct coordinates uniformly, resampling whenever a
  /// draw hits a coordinate that already has a mine.
  pub fn place_random<R: Rng + ?Sized>(grid: &mut Grid<Cell>, mine_count: u32, rng: &mut R) -> Result<Self> {
    if mine_count as usize > grid.len() {
      return Err(Error::InvalidConfiguration {
        rows: grid.rows,
        cols: grid.cols,
        mines: mine_count,
      });
    }

    let mut field = Self::default();
    field.clear_all(grid);
    while field.len() < mine_count as usize {
      let pos = Coord::new(rng.gen_range(0..grid.rows) as i32, rng.gen_range(0..grid.cols) as i32);
      if field.mines.insert(pos) {
        grid[pos].has_mine = true;
      }
    }
    trace!("placed {} random mines on {}x{} grid", mine_count, grid.rows, grid.cols);
    Ok(field)
  }

  /// Replaces whatever is on the grid with exactly the given mines.
  /// Duplicate coordinates collapse into one mine.
  pub fn place_explicit(grid: &mut Grid<Cell>, coords: &[Coord]) -> Result<Self> {
    if let Some(&outside) = coords.iter().find(|&&pos| !grid.contains(pos)) {
      return Err(Error::OutOfGrid(outside));
    }

    let mut field = Self::default();
    field.clear_all(grid);
    for &pos in coords {
      field.mines.insert(pos);
      grid[pos].has_mine = true;
    }
    Ok(field)
  }

  /// Removes the mine at `pos`, if any. Returns whether one was removed.
  pub fn remove(&mut self, grid: &mut Grid<Cell>, pos: Coord) -> bool {
    match grid.get_mut(pos) {
      Some(cell) if cell.has_mine => {
        cell.has_mine = false;
        self.mines.remove(&pos);
        true
      }
      _ => false,
    }
  }

  fn clear_all(&mut self, grid: &mut Grid<Cell>) {
    let placed: Vec<Coord> = grid.enumerate().filter(|(_, cell)| cell.has_mine).map(|(pos, _)| pos).collect();
    for pos in placed {
      grid[pos].has_mine = false;
    }
    self.mines.clear();
  }

  pub fn contains(&self, pos: Coord) -> bool {
    self.mines.contains(&pos)
  }

  pub fn len(&self) -> usize {
    self.mines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mines.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
    self.mines.iter().copied()
  }
}
