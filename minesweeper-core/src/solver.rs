use core::fmt;
use std::collections::BTreeSet;
use std::str::FromStr;

use log::trace;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, GameState, MoveOutcome};
use crate::estimator::ProbabilityEstimator;
use crate::grid::Coord;

/// Per-game solver bookkeeping. Both fields only ever move one way: the
/// candidate set shrinks and the confirmed count grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
  candidates: BTreeSet<Coord>,
  confirmed_mines: u32,
}

impl Session {
  pub fn new(board: &Board) -> Self {
    Self {
      candidates: board.grid().coords().collect(),
      confirmed_mines: 0,
    }
  }

  pub fn candidates(&self) -> &BTreeSet<Coord> {
    &self.candidates
  }

  pub fn confirmed_mines(&self) -> u32 {
    self.confirmed_mines
  }

  fn drop_candidate(&mut self, pos: Coord) -> bool {
    self.candidates.remove(&pos)
  }
}

/// Chooses the next cell to reveal.
///
/// Returns `None` when no candidate is left. Implementations may flag cells on
/// the board and must remove the returned cell from the session.
///
/// Object-safe so the harness can pick one at runtime.
pub trait Policy {
  fn choose(&mut self, board: &mut Board, session: &mut Session) -> Option<Coord>;
}

/// Flags proven mines, then reveals the candidate with the lowest estimated
/// mine probability.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimatorPolicy {
  estimator: ProbabilityEstimator,
}

impl EstimatorPolicy {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Policy for EstimatorPolicy {
  fn choose(&mut self, board: &mut Board, session: &mut Session) -> Option<Coord> {
    let estimate = self.estimator.estimate(board, &session.candidates, session.confirmed_mines);

    for &pos in &estimate.resolved {
      session.drop_candidate(pos);
    }
    for &pos in &estimate.certain_mines {
      if session.drop_candidate(pos) {
        board.flag(pos.row, pos.col);
        session.confirmed_mines += 1;
        trace!("flagged certain mine at {:?}", pos);
      }
    }

    let (pos, p) = estimate.safest()?;
    session.drop_candidate(pos);
    trace!("revealing {:?} (p = {:.3})", pos, p);
    Some(pos)
  }
}

/// Reveals a uniformly random unknown candidate. Never flags.
pub struct RandomPolicy<R = StdRng> {
  rng: R,
}

impl<R: Rng> RandomPolicy<R> {
  pub fn new(rng: R) -> Self {
    Self { rng }
  }
}

impl<R: Rng> Policy for RandomPolicy<R> {
  fn choose(&mut self, board: &mut Board, session: &mut Session) -> Option<Coord> {
    session
      .candidates
      .retain(|&pos| board.cell(pos).is_some_and(|cell| cell.is_unknown()));
    if session.candidates.is_empty() {
      return None;
    }

    let index = self.rng.gen_range(0..session.candidates.len());
    let pos = *session.candidates.iter().nth(index)?;
    session.drop_candidate(pos);
    trace!("randomly revealing {:?}", pos);
    Some(pos)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
  #[default]
  Estimator,
  Random,
}

impl PolicyKind {
  pub fn build(self, rng: StdRng) -> Box<dyn Policy + Send> {
    match self {
      PolicyKind::Estimator => Box::new(EstimatorPolicy::new()),
      PolicyKind::Random => Box::new(RandomPolicy::new(rng)),
    }
  }
}

impl fmt::Display for PolicyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PolicyKind::Estimator => write!(f, "estimator"),
      PolicyKind::Random => write!(f, "random"),
    }
  }
}

impl FromStr for PolicyKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "estimator" | "best" => Ok(PolicyKind::Estimator),
      "random" => Ok(PolicyKind::Random),
      other => Err(format!("unknown policy '{}', expected 'estimator' or 'random'", other)),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GameSummary {
  pub state: GameState,
  pub moves: u32,
  pub flagged: u32,
}

/// Drives one board to a terminal state.
pub struct Solver<'a, P: Policy + ?Sized> {
  board: &'a mut Board,
  session: Session,
  policy: &'a mut P,
}

impl<'a, P: Policy + ?Sized> Solver<'a, P> {
  pub fn new(board: &'a mut Board, policy: &'a mut P) -> Self {
    Self {
      session: Session::new(board),
      board,
      policy,
    }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn board(&self) -> &Board {
    &*self.board
  }

  /// Plays a single move. `None` once the policy has nothing left to try.
  pub fn step(&mut self) -> Option<MoveOutcome> {
    let pos = self.policy.choose(self.board, &mut self.session)?;
    Some(self.board.reveal(pos.row, pos.col))
  }

  pub fn play(&mut self) -> GameSummary {
    let mut moves = 0;
    while !self.board.game_state().is_terminal() {
      match self.step() {
        Some(_) => moves += 1,
        None => break,
      }
    }

    GameSummary {
      state: self.board.game_state(),
      moves,
      flagged: self.board.flagged_count(),
    }
  }
}
