use core::fmt;

use log::trace;
use rand::Rng;

use crate::error::{Error, Result};
use crate::grid::{Coord, Grid, GridExplorer};
use crate::minefield::MineField;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameState {
  /// Nothing revealed yet; the next reveal is guaranteed safe.
  Start,
  Ongoing,
  Win,
  Lose,
}

impl GameState {
  pub fn is_terminal(self) -> bool {
    matches!(self, GameState::Win | GameState::Lose)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
  pub row: i32,
  pub col: i32,
  pub has_mine: bool,
  pub is_revealed: bool,
  pub is_flagged: bool,
}

impl Cell {
  pub fn new(pos: Coord) -> Self {
    Self {
      row: pos.row,
      col: pos.col,
      has_mine: false,
      is_revealed: false,
      is_flagged: false,
    }
  }

  pub fn coord(&self) -> Coord {
    Coord::new(self.row, self.col)
  }

  /// Neither revealed nor flagged.
  pub fn is_unknown(&self) -> bool {
    !self.is_revealed && !self.is_flagged
  }
}

/// What a player is allowed to see of a cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellView {
  pub revealed: bool,
  pub flagged: bool,
  /// Only known once the cell is revealed.
  pub adjacent_mines: Option<u8>,
  /// Only disclosed after the game has ended.
  pub mine: Option<bool>,
}

/// Why a reveal or flag did nothing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Ignored {
  OutOfBounds,
  AlreadyRevealed,
  GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MoveOutcome {
  Applied(GameState),
  Ignored(GameState, Ignored),
}

impl MoveOutcome {
  pub fn state(self) -> GameState {
    match self {
      MoveOutcome::Applied(state) | MoveOutcome::Ignored(state, _) => state,
    }
  }

  pub fn is_applied(self) -> bool {
    matches!(self, MoveOutcome::Applied(_))
  }
}

/// One game instance. Owns its grid and mines; never shared between threads
/// while being played.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
  grid: Grid<Cell>,
  mines: MineField,
  mine_count: u32,
  state: GameState,
}

impl Board {
  pub fn new(rows: u32, cols: u32, mine_count: u32) -> Result<Self> {
    Self::with_rng(rows, cols, mine_count, &mut rand::thread_rng())
  }

  pub fn with_rng<R: Rng + ?Sized>(rows: u32, cols: u32, mine_count: u32, rng: &mut R) -> Result<Self> {
    let capacity = rows as u64 * cols as u64;
    if capacity == 0 || mine_count as u64 > capacity - 1 {
      return Err(Error::InvalidConfiguration {
        rows,
        cols,
        mines: mine_count,
      });
    }

    let mut grid = Grid::from_fn(rows, cols, Cell::new);
    let mines = MineField::place_random(&mut grid, mine_count, rng)?;
    Ok(Self {
      grid,
      mines,
      mine_count,
      state: GameState::Start,
    })
  }

  /// Replaces the random layout with an explicit one. Meant for reproducible
  /// setups; `mine_count` follows the new layout.
  pub fn set_mines(&mut self, coords: &[Coord]) -> Result<()> {
    self.mines = MineField::place_explicit(&mut self.grid, coords)?;
    self.mine_count = self.mines.len() as u32;
    Ok(())
  }

  pub fn reveal(&mut self, row: i32, col: i32) -> MoveOutcome {
    let pos = Coord::new(row, col);
    let cell = match self.grid.get(pos) {
      Some(cell) => cell,
      None => return MoveOutcome::Ignored(self.state, Ignored::OutOfBounds),
    };
    if self.state.is_terminal() {
      return MoveOutcome::Ignored(self.state, Ignored::GameOver);
    }
    if cell.is_revealed {
      return MoveOutcome::Ignored(self.state, Ignored::AlreadyRevealed);
    }

    if self.state == GameState::Start {
      for safe in pos.with_neighbours() {
        if self.mines.remove(&mut self.grid, safe) {
          trace!("cleared mine at {:?} for safe first reveal", safe);
        }
      }
      self.state = GameState::Ongoing;
    }

    if self.grid[pos].has_mine {
      self.state = GameState::Lose;
      return MoveOutcome::Applied(self.state);
    }

    self.flood_reveal(pos);

    if self.is_cleared() {
      self.state = GameState::Win;
    }
    MoveOutcome::Applied(self.state)
  }

  /// Reveals `start` and, through every zero-count cell reached, all of its
  /// mine-free neighbours.
  fn flood_reveal(&mut self, start: Coord) {
    let mut explorer = GridExplorer::from(&self.grid);
    explorer.enqueue(start);

    while let Some(pos) = explorer.pop() {
      let cell = &mut self.grid[pos];
      cell.is_revealed = true;
      cell.is_flagged = false;
      if self.adjacent_mines(pos) == 0 {
        let next: Vec<Coord> = self
          .grid
          .neighbours(pos)
          .filter(|&n| !self.grid[n].has_mine && !self.grid[n].is_revealed)
          .collect();
        explorer.enqueue_all(next);
      }
    }
  }

  pub fn flag(&mut self, row: i32, col: i32) -> MoveOutcome {
    match self.grid.get_mut(Coord::new(row, col)) {
      None => MoveOutcome::Ignored(self.state, Ignored::OutOfBounds),
      Some(cell) if cell.is_revealed => MoveOutcome::Ignored(self.state, Ignored::AlreadyRevealed),
      Some(cell) => {
        cell.is_flagged = !cell.is_flagged;
        MoveOutcome::Applied(self.state)
      }
    }
  }

  /// Win means no mine-free cell is left hidden. Flags play no part.
  fn is_cleared(&self) -> bool {
    self.grid.iter().all(|cell| cell.has_mine || cell.is_revealed)
  }

  pub fn adjacent_mines(&self, pos: Coord) -> u8 {
    self.grid.get_around(pos).filter(|cell| cell.has_mine).count() as u8
  }

  pub fn cell_view(&self, row: i32, col: i32) -> Option<CellView> {
    let pos = Coord::new(row, col);
    let cell = self.grid.get(pos)?;
    Some(CellView {
      revealed: cell.is_revealed,
      flagged: cell.is_flagged,
      adjacent_mines: cell.is_revealed.then(|| self.adjacent_mines(pos)),
      mine: self.state.is_terminal().then_some(cell.has_mine),
    })
  }

  pub fn game_state(&self) -> GameState {
    self.state
  }

  pub fn grid(&self) -> &Grid<Cell> {
    &self.grid
  }

  pub fn cell(&self, pos: Coord) -> Option<&Cell> {
    self.grid.get(pos)
  }

  pub fn dimensions(&self) -> (u32, u32) {
    (self.grid.rows, self.grid.cols)
  }

  pub fn mine_count(&self) -> u32 {
    self.mine_count
  }

  pub fn mine_coordinates(&self) -> impl Iterator<Item = Coord> + '_ {
    self.mines.iter()
  }

  pub fn flagged_count(&self) -> u32 {
    self.grid.iter().filter(|cell| cell.is_flagged).count() as u32
  }

  /// Mines still to be found from a player's point of view. Can go negative
  /// when the player over-flags.
  pub fn mines_remaining(&self) -> i64 {
    self.mine_count as i64 - self.flagged_count() as i64
  }

  pub fn revealed_count(&self) -> u32 {
    self.grid.iter().filter(|cell| cell.is_revealed).count() as u32
  }
}

impl fmt::Display for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let show_mines = self.state.is_terminal();
    for row in 0..self.grid.rows as i32 {
      for col in 0..self.grid.cols as i32 {
        let pos = Coord::new(row, col);
        let cell = &self.grid[pos];
        match self.adjacent_mines(pos) {
          _ if show_mines && cell.has_mine => write!(f, " M ")?,
          0 if cell.is_revealed => write!(f, " . ")?,
          n if cell.is_revealed => write!(f, " {} ", n)?,
          _ if cell.is_flagged => write!(f, " f ")?,
          _ => write!(f, " X ")?,
        }
      }
      writeln!(f)?;
    }

    Ok(())
  }
}

impl fmt::Debug for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Board {}x{} {:?}, {} mines", self.grid.rows, self.grid.cols, self.state, self.mine_count)?;
    fmt::Display::fmt(self, f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn board_with(rows: u32, cols: u32, mines: &[(i32, i32)]) -> Board {
    let mut board = Board::new(rows, cols, 0).unwrap();
    let coords: Vec<Coord> = mines.iter().map(|&m| Coord::from(m)).collect();
    board.set_mines(&coords).unwrap();
    board
  }

  #[test]
  fn new_board_starts_hidden() {
    let board = Board::new(10, 10, 0).unwrap();
    assert_eq!(board.dimensions(), (10, 10));
    assert_eq!(board.game_state(), GameState::Start);
    assert!(board.grid().iter().all(|cell| !cell.is_revealed && !cell.is_flagged));
  }

  #[test]
  fn construction_rejects_full_board() {
    assert!(matches!(Board::new(3, 3, 9), Err(Error::InvalidConfiguration { .. })));
    assert!(matches!(Board::new(0, 3, 0), Err(Error::InvalidConfiguration { .. })));
    assert!(Board::new(3, 3, 8).is_ok());
  }

  #[test]
  fn first_reveal_clears_whole_neighbourhood() {
    let mut board = board_with(5, 5, &[(1, 1), (1, 2), (2, 2), (3, 3), (4, 4)]);
    assert_eq!(board.reveal(2, 2), MoveOutcome::Applied(GameState::Win));
    let left: Vec<Coord> = board.mine_coordinates().collect();
    assert_eq!(left, vec![Coord::new(4, 4)]);
    assert!(board.cell(Coord::new(3, 3)).is_some_and(|cell| !cell.has_mine));
  }

  #[test]
  fn hitting_a_mine_loses_without_revealing_it() {
    let wall = [(0, 2), (1, 2), (2, 2), (3, 2), (4, 2)];
    let mut board = board_with(5, 5, &wall);
    assert_eq!(board.reveal(0, 0), MoveOutcome::Applied(GameState::Ongoing));
    assert!(!board.cell(Coord::new(0, 4)).unwrap().is_revealed);
    assert_eq!(board.reveal(4, 2), MoveOutcome::Applied(GameState::Lose));
    assert!(!board.cell(Coord::new(4, 2)).unwrap().is_revealed);
  }

  #[test]
  fn terminal_board_ignores_reveals() {
    let mut board = board_with(4, 4, &[(3, 3), (3, 0)]);
    board.reveal(0, 0);
    assert_eq!(board.reveal(3, 3).state(), GameState::Lose);
    assert_eq!(board.reveal(3, 0), MoveOutcome::Ignored(GameState::Lose, Ignored::GameOver));
  }

  #[test]
  fn flood_stops_at_numbered_cells() {
    // Both mines sit in the bottom row; the zero region reaches everything else.
    let mut board = board_with(6, 6, &[(5, 5), (5, 4)]);
    board.reveal(0, 0);
    assert!(board.cell(Coord::new(4, 4)).unwrap().is_revealed);
    assert!(!board.cell(Coord::new(5, 5)).unwrap().is_revealed);
    assert_eq!(board.cell_view(4, 4).unwrap().adjacent_mines, Some(2));
    assert_eq!(board.game_state(), GameState::Win);
  }

  #[test]
  fn flood_reveal_drops_flags() {
    let mut board = board_with(5, 5, &[(4, 4)]);
    board.flag(2, 0);
    board.reveal(0, 0);
    let cell = board.cell(Coord::new(2, 0)).unwrap();
    assert!(cell.is_revealed);
    assert!(!cell.is_flagged);
  }

  #[test]
  fn cell_view_hides_mines_until_the_end() {
    let mut board = board_with(4, 4, &[(3, 3), (0, 3)]);
    assert_eq!(board.cell_view(3, 3).unwrap().mine, None);
    assert_eq!(board.cell_view(3, 3).unwrap().adjacent_mines, None);
    board.reveal(0, 0);
    board.reveal(3, 3);
    assert_eq!(board.cell_view(3, 3).unwrap().mine, Some(true));
    assert_eq!(board.cell_view(-1, 0), None);
  }

  #[test]
  fn flag_bookkeeping() {
    let mut board = board_with(4, 4, &[(3, 3)]);
    assert_eq!(board.mines_remaining(), 1);
    board.flag(3, 3);
    board.flag(3, 2);
    assert_eq!(board.flagged_count(), 2);
    assert_eq!(board.mines_remaining(), -1);
    assert_eq!(board.flag(9, 9), MoveOutcome::Ignored(GameState::Start, Ignored::OutOfBounds));
  }

  #[test]
  fn display_shows_solution_after_loss() {
    let mut board = board_with(3, 3, &[(2, 2), (0, 2)]);
    board.reveal(0, 0);
    board.reveal(2, 2);
    let text = board.to_string();
    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().nth(2).unwrap().ends_with(" M "));
  }
}
