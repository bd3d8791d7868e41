use thiserror::Error;

use crate::grid::Coord;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot place {mines} mines on a {rows}x{cols} board")]
  InvalidConfiguration { rows: u32, cols: u32, mines: u32 },

  #[error("mine coordinate {0:?} lies outside the board")]
  OutOfGrid(Coord),

  #[error("invalid batch configuration: {0}")]
  InvalidBatch(String),

  #[error("failed to read config file: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to parse config: {0}")]
  Yaml(#[from] serde_yaml_ng::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
