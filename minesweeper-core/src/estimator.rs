use std::collections::BTreeSet;

use crate::board::Board;
use crate::grid::Coord;

/// Result of one pass of [`ProbabilityEstimator::estimate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Estimate {
  /// Mine likelihood for every candidate that is still unknown and not
  /// proven to be a mine, in candidate iteration order.
  pub probabilities: Vec<(Coord, f64)>,
  /// Candidates that some revealed number forces to be mines.
  pub certain_mines: Vec<Coord>,
  /// Candidates that are already revealed or flagged.
  pub resolved: Vec<Coord>,
}

impl Estimate {
  /// Lowest-probability cell. The first one seen wins ties.
  pub fn safest(&self) -> Option<(Coord, f64)> {
    let mut best: Option<(Coord, f64)> = None;
    for &(pos, p) in &self.probabilities {
      match best {
        Some((_, lowest)) if lowest <= p => (),
        _ => best = Some((pos, p)),
      }
    }
    best
  }
}

/// Local constraint heuristic over revealed numbers.
///
/// Each revealed numbered neighbour `n` of a candidate contributes
/// `(count(n) - flags around n) / unknowns around n`; the candidate's
/// probability is the mean of those terms. Candidates with no numbered
/// neighbour get the uniform density of the remaining mines.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProbabilityEstimator;

impl ProbabilityEstimator {
  pub fn estimate(&self, board: &Board, candidates: &BTreeSet<Coord>, confirmed_mines: u32) -> Estimate {
    let grid = board.grid();
    let prior = if candidates.is_empty() {
      0.0
    } else {
      (board.mine_count().saturating_sub(confirmed_mines)) as f64 / candidates.len() as f64
    };

    let mut estimate = Estimate::default();
    for &pos in candidates {
      match grid.get(pos) {
        Some(cell) if cell.is_unknown() => (),
        _ => {
          estimate.resolved.push(pos);
          continue;
        }
      }

      let mut terms = Vec::new();
      let mut certain = false;
      for n in grid.neighbours(pos) {
        let clue = &grid[n];
        if !clue.is_revealed {
          continue;
        }
        let count = board.adjacent_mines(n) as u32;
        if count == 0 {
          continue;
        }

        let (mut unknown, mut flagged) = (0u32, 0u32);
        for cell in grid.get_around(n) {
          if cell.is_flagged {
            flagged += 1;
          } else if !cell.is_revealed {
            unknown += 1;
          }
        }
        if unknown == 0 {
          continue;
        }

        let left = (count as f64 - flagged as f64).max(0.0);
        if count >= flagged && count - flagged == unknown {
          certain = true;
        }
        terms.push((left / unknown as f64).min(1.0));
      }

      if certain {
        estimate.certain_mines.push(pos);
      } else if terms.is_empty() {
        estimate.probabilities.push((pos, prior));
      } else {
        let mean = terms.iter().sum::<f64>() / terms.len() as f64;
        estimate.probabilities.push((pos, mean));
      }
    }

    estimate
  }
}
