use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::{Board, GameState};
use crate::config::{BatchConfig, Validate};
use crate::error::Result;
use crate::solver::{GameSummary, PolicyKind, Solver};

/// Receives a callback from whichever worker just finished a game. Must be
/// cheap; it runs on the worker threads.
pub trait BatchObserver: Sync {
  fn on_game_finished(&self, _played: u64, _won: u64, _summary: &GameSummary) {}
}

pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Counters shared by all workers of a batch. Only ever incremented.
#[derive(Debug, Default)]
pub struct BatchCounters {
  played: AtomicU64,
  won: AtomicU64,
}

impl BatchCounters {
  /// Records one finished game and returns the (played, won) totals as seen
  /// right after this game.
  pub fn record(&self, state: GameState) -> (u64, u64) {
    let won = if state == GameState::Win {
      self.won.fetch_add(1, Ordering::Relaxed) + 1
    } else {
      self.won.load(Ordering::Relaxed)
    };
    let played = self.played.fetch_add(1, Ordering::Relaxed) + 1;
    (played, won)
  }

  pub fn played(&self) -> u64 {
    self.played.load(Ordering::Relaxed)
  }

  pub fn won(&self) -> u64 {
    self.won.load(Ordering::Relaxed)
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchReport {
  pub games_played: u64,
  pub games_won: u64,
  pub elapsed: Duration,
  pub win_rate: f64,
  pub policy: PolicyKind,
  pub seed: u64,
}

impl fmt::Display for BatchReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let secs = self.elapsed.as_secs();
    writeln!(
      f,
      "Number of games won: {} out of {} games.",
      self.games_won, self.games_played
    )?;
    writeln!(
      f,
      "Total time to complete the {} attempts: {} minutes and {} seconds!",
      self.games_played,
      secs / 60,
      secs % 60
    )?;
    write!(f, "Average win rate: {}%", (self.win_rate * 100.0) as u32)
  }
}

/// Builds a board and a fresh policy from `seed` and plays it out.
pub fn play_seeded(config: &BatchConfig, seed: u64) -> Result<(GameSummary, Board)> {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut board = Board::with_rng(config.rows, config.cols, config.mines, &mut rng)?;
  let mut policy = config.policy.build(rng);
  let summary = Solver::new(&mut board, policy.as_mut()).play();
  Ok((summary, board))
}

pub fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
  run_batch_observed(config, &NoopObserver)
}

/// Plays exactly `config.trials` games on up to `config.workers` threads.
///
/// Workers pull trial numbers from a shared ticket counter, so a seeded batch
/// plays the same set of boards no matter how the threads interleave.
pub fn run_batch_observed(config: &BatchConfig, observer: &dyn BatchObserver) -> Result<BatchReport> {
  config.validate()?;
  let seed = config.seed.unwrap_or_else(rand::random);
  let workers = config.trials.min(config.workers as u64);
  info!(
    "running {} {} games on {}x{} with {} mines, {} workers, seed {}",
    config.trials, config.policy, config.rows, config.cols, config.mines, workers, seed
  );

  let tickets = AtomicU64::new(0);
  let counters = BatchCounters::default();
  let start = Instant::now();

  thread::scope(|scope| -> Result<()> {
    let handles: Vec<_> = (0..workers)
      .map(|worker| {
        let (tickets, counters) = (&tickets, &counters);
        scope.spawn(move || -> Result<()> {
          loop {
            let trial = tickets.fetch_add(1, Ordering::Relaxed);
            if trial >= config.trials {
              return Ok(());
            }
            let (summary, _) = play_seeded(config, seed.wrapping_add(trial))?;
            let (played, won) = counters.record(summary.state);
            debug!(
              "worker {} trial {}: {:?} after {} moves, {} flags",
              worker, trial, summary.state, summary.moves, summary.flagged
            );
            observer.on_game_finished(played, won, &summary);
          }
        })
      })
      .collect();

    for handle in handles {
      handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
    }
    Ok(())
  })?;

  let elapsed = start.elapsed();
  let (games_played, games_won) = (counters.played(), counters.won());
  let report = BatchReport {
    games_played,
    games_won,
    elapsed,
    win_rate: games_won as f64 / games_played as f64,
    policy: config.policy,
    seed,
  };
  info!(
    "batch done: {}/{} won ({:.1}%) in {:.2?}",
    games_won,
    games_played,
    report.win_rate * 100.0,
    elapsed
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  fn small_batch(trials: u64, workers: u32) -> BatchConfig {
    BatchConfig {
      trials,
      workers,
      rows: 6,
      cols: 6,
      mines: 4,
      policy: PolicyKind::Estimator,
      seed: Some(42),
    }
  }

  #[test]
  fn plays_exactly_the_requested_trials() {
    let report = run_batch(&small_batch(37, 5)).unwrap();
    assert_eq!(report.games_played, 37);
    assert!(report.games_won <= 37);
    assert!((report.win_rate - report.games_won as f64 / 37.0).abs() < 1e-12);
  }

  #[test]
  fn more_workers_than_trials() {
    let report = run_batch(&small_batch(3, 16)).unwrap();
    assert_eq!(report.games_played, 3);
  }

  #[test]
  fn seeded_batches_agree_regardless_of_workers() {
    let one = run_batch(&small_batch(40, 1)).unwrap();
    let many = run_batch(&small_batch(40, 8)).unwrap();
    assert_eq!(one.games_won, many.games_won);
    assert_eq!(one.seed, 42);
  }

  #[test]
  fn observer_sees_every_game() {
    struct Collect(Mutex<Vec<u64>>);
    impl BatchObserver for Collect {
      fn on_game_finished(&self, played: u64, _won: u64, _summary: &GameSummary) {
        self.0.lock().unwrap().push(played);
      }
    }

    let observer = Collect(Mutex::new(Vec::new()));
    run_batch_observed(&small_batch(20, 4), &observer).unwrap();
    let mut seen = observer.0.into_inner().unwrap();
    seen.sort_unstable();
    assert_eq!(seen, (1..=20).collect::<Vec<_>>());
  }

  #[test]
  fn invalid_config_is_rejected_before_spawning() {
    let config = BatchConfig {
      mines: 36,
      ..small_batch(5, 2)
    };
    assert!(run_batch(&config).is_err());
  }

  #[test]
  fn counters_track_wins_separately() {
    let counters = BatchCounters::default();
    assert_eq!(counters.record(GameState::Win), (1, 1));
    assert_eq!(counters.record(GameState::Lose), (2, 1));
    assert_eq!((counters.played(), counters.won()), (2, 1));
  }

  #[test]
  fn report_uses_minutes_and_seconds() {
    let report = BatchReport {
      games_played: 1000,
      games_won: 905,
      elapsed: Duration::from_secs(125),
      win_rate: 0.905,
      policy: PolicyKind::Estimator,
      seed: 1,
    };
    let text = report.to_string();
    assert!(text.contains("905 out of 1000"));
    assert!(text.contains("2 minutes and 5 seconds"));
    assert!(text.ends_with("Average win rate: 90%"));
  }
}
