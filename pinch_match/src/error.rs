use std::path::PathBuf;

use match_puzzle::PuzzleError;
use thiserror::Error;

use crate::detector::DetectorError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(String),

    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse { path: PathBuf, source: serde_json::Error },

    #[error(transparent)]
    Puzzle(#[from] PuzzleError),

    #[error(transparent)]
    Detector(#[from] DetectorError),
}
