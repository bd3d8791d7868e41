use indicatif::{ProgressBar, ProgressStyle};
use minesweeper_core::{BatchObserver, GameSummary};

/// Refresh the win-rate message every this many games.
const MESSAGE_EVERY: u64 = 50;

pub struct ProgressObserver {
  bar: ProgressBar,
}

impl ProgressObserver {
  pub fn new(trials: u64) -> Self {
    let bar = ProgressBar::new(trials);
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>7}/{len:<7} {percent:>3}%  {elapsed_precise}  {msg}")
      .map(|style| style.progress_chars("=>-"))
      .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    Self { bar }
  }

  pub fn finish(&self) {
    self.bar.finish_and_clear();
  }
}

impl BatchObserver for ProgressObserver {
  fn on_game_finished(&self, played: u64, won: u64, _summary: &GameSummary) {
    self.bar.inc(1);
    if played % MESSAGE_EVERY == 0 {
      self.bar.set_message(format!("won {} ({:.1}%)", won, won as f64 * 100.0 / played as f64));
    }
  }
}
