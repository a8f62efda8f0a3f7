use std::path::PathBuf;

use thiserror::Error;

use crate::env::UnitId;

#[derive(Error, Debug)]
pub enum LearnerError {
    /// Weight and feature vectors disagree in length. This is a configuration
    /// bug; callers must stop rather than continue with a broken Q-function.
    #[error("weight vector has {weights} entries but feature vector has {features}")]
    LengthMismatch { weights: usize, features: usize },

    #[error("unit {0} is tracked but missing from the snapshot")]
    MissingUnit(UnitId),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("weight file {0} does not exist")]
    Missing(PathBuf),

    #[error("weight file i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line} of the weight file is not a number: {value:?}")]
    Parse { line: usize, value: String },
}
