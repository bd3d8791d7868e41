use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::solver::PolicyKind;

pub trait Validate {
  fn validate(&self) -> Result<()>;
}

/// Parameters of one simulation batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
  pub trials: u64,
  pub workers: u32,
  pub rows: u32,
  pub cols: u32,
  pub mines: u32,
  pub policy: PolicyKind,
  /// Base seed; trial `i` plays with `seed + i`. Unseeded batches draw a
  /// base seed from the OS.
  pub seed: Option<u64>,
}

impl Default for BatchConfig {
  fn default() -> Self {
    Self {
      trials: 1000,
      workers: 16,
      rows: 10,
      cols: 10,
      mines: 10,
      policy: PolicyKind::Estimator,
      seed: None,
    }
  }
}

impl Validate for BatchConfig {
  fn validate(&self) -> Result<()> {
    if self.trials == 0 {
      return Err(Error::InvalidBatch("trials must be at least 1".to_string()));
    }
    if self.workers == 0 {
      return Err(Error::InvalidBatch("workers must be at least 1".to_string()));
    }
    if self.rows == 0 || self.cols == 0 {
      return Err(Error::InvalidBatch(format!("board must not be empty, got {}x{}", self.rows, self.cols)));
    }
    let capacity = self.rows as u64 * self.cols as u64;
    if self.mines as u64 > capacity - 1 {
      return Err(Error::InvalidConfiguration {
        rows: self.rows,
        cols: self.cols,
        mines: self.mines,
      });
    }
    Ok(())
  }
}

impl BatchConfig {
  pub fn from_yaml_str(content: &str) -> Result<Self> {
    let config: Self = serde_yaml_ng::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Reads a YAML config. A missing file is not an error and yields the defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    match std::fs::read_to_string(path.as_ref()) {
      Ok(content) => Self::from_yaml_str(&content),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
      Err(err) => Err(err.into()),
    }
  }

  pub fn to_yaml(&self) -> Result<String> {
    Ok(serde_yaml_ng::to_string(self)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_classic_board() {
    let config = BatchConfig::default();
    assert_eq!((config.rows, config.cols, config.mines), (10, 10, 10));
    assert!(config.validate().is_ok());
  }

  #[test]
  fn partial_yaml_keeps_defaults() {
    let config = BatchConfig::from_yaml_str("trials: 50\npolicy: random\nseed: 7\n").unwrap();
    assert_eq!(config.trials, 50);
    assert_eq!(config.policy, PolicyKind::Random);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.workers, 16);
  }

  #[test]
  fn yaml_round_trip() {
    let config = BatchConfig {
      trials: 12,
      seed: Some(3),
      ..BatchConfig::default()
    };
    let text = config.to_yaml().unwrap();
    assert_eq!(BatchConfig::from_yaml_str(&text).unwrap(), config);
  }

  #[test]
  fn rejects_overfull_board() {
    let err = BatchConfig::from_yaml_str("rows: 2\ncols: 2\nmines: 4\n").unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { mines: 4, .. }));
  }

  #[test]
  fn rejects_zero_workers() {
    let err = BatchConfig::from_yaml_str("workers: 0\n").unwrap_err();
    assert!(matches!(err, Error::InvalidBatch(_)));
  }

  #[test]
  fn rejects_unknown_policy() {
    assert!(matches!(BatchConfig::from_yaml_str("policy: greedy\n"), Err(Error::Yaml(_))));
  }

  #[test]
  fn missing_file_gives_defaults() {
    let config = BatchConfig::load("/definitely/not/here/batch.yaml").unwrap();
    assert_eq!(config, BatchConfig::default());
  }
}
