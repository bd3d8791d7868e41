mod logger;
mod progress;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use minesweeper_core::{play_seeded, run_batch_observed, BatchConfig, NoopObserver, PolicyKind, Validate};

use crate::progress::ProgressObserver;

#[derive(Parser, Debug)]
#[command(name = "minesweeper-sim", about = "Measures how often the automatic player clears the board")]
struct Args {
  /// YAML batch config; flags below override its values.
  #[arg(long)]
  config: Option<PathBuf>,

  #[arg(long)]
  trials: Option<u64>,

  #[arg(long)]
  workers: Option<u32>,

  #[arg(long)]
  rows: Option<u32>,

  #[arg(long)]
  cols: Option<u32>,

  #[arg(long)]
  mines: Option<u32>,

  /// `estimator` or `random`.
  #[arg(long)]
  policy: Option<PolicyKind>,

  #[arg(long)]
  seed: Option<u64>,

  /// Run the batch once per policy and report both.
  #[arg(long)]
  compare: bool,

  /// Play a single game and print the final board instead of running a batch.
  #[arg(long)]
  show_game: bool,

  /// Hide the progress bar.
  #[arg(long, short)]
  quiet: bool,

  /// Repeat for more log output (info, debug, trace).
  #[arg(long, short, action = clap::ArgAction::Count)]
  verbose: u8,

  #[arg(long)]
  log_prefix: Option<String>,
}

impl Args {
  fn batch_config(&self) -> Result<BatchConfig, minesweeper_core::Error> {
    let mut config = match &self.config {
      Some(path) => BatchConfig::load(path)?,
      None => BatchConfig::default(),
    };
    if let Some(trials) = self.trials {
      config.trials = trials;
    }
    if let Some(workers) = self.workers {
      config.workers = workers;
    }
    if let Some(rows) = self.rows {
      config.rows = rows;
    }
    if let Some(cols) = self.cols {
      config.cols = cols;
    }
    if let Some(mines) = self.mines {
      config.mines = mines;
    }
    if let Some(policy) = self.policy {
      config.policy = policy;
    }
    if self.seed.is_some() {
      config.seed = self.seed;
    }
    config.validate()?;
    Ok(config)
  }
}

fn run(config: &BatchConfig, quiet: bool) -> Result<(), Box<dyn Error>> {
  let report = if quiet {
    run_batch_observed(config, &NoopObserver)?
  } else {
    let progress = ProgressObserver::new(config.trials);
    let report = run_batch_observed(config, &progress)?;
    progress.finish();
    report
  };

  println!("\n[{}] {}x{} board, {} mines, seed {}", report.policy, config.rows, config.cols, config.mines, report.seed);
  println!("{}\n", report);
  Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
  let args = Args::parse();
  logger::init_logger(args.log_prefix.clone(), logger::level_for(args.verbose))?;

  let config = args.batch_config()?;
  info!("using config:\n{}", config.to_yaml()?);

  if args.show_game {
    let seed = config.seed.unwrap_or_else(rand::random);
    let (summary, board) = play_seeded(&config, seed)?;
    println!("{}", board);
    println!("{:?} after {} moves ({} flags), seed {}", summary.state, summary.moves, summary.flagged, seed);
    return Ok(());
  }

  if args.compare {
    for policy in [PolicyKind::Estimator, PolicyKind::Random] {
      run(&BatchConfig { policy, ..config.clone() }, args.quiet)?;
    }
  } else {
    run(&config, args.quiet)?;
  }

  Ok(())
}
