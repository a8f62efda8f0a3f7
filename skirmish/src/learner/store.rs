use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::errors::StoreError;
use super::traits::WeightStore;

pub const DEFAULT_WEIGHTS_PATH: &str = "agent_weights/weights.txt";

/// Plain-text weight file: one number per line, in feature order.
#[derive(Debug, Clone)]
pub struct FileWeightStore {
    path: PathBuf,
}

impl FileWeightStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<Vec<f64>, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Missing(self.path.clone()));
        }
        let text = fs::read_to_string(&self.path)?;
        text.lines()
            .enumerate()
            .map(|(i, line)| {
                line.trim().parse::<f64>().map_err(|_| StoreError::Parse {
                    line: i + 1,
                    value: line.to_string(),
                })
            })
            .collect()
    }
}

impl Default for FileWeightStore {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS_PATH)
    }
}

impl WeightStore for FileWeightStore {
    fn load(&self) -> Option<Vec<f64>> {
        match self.try_load() {
            Ok(weights) => {
                debug!(path = %self.path.display(), count = weights.len(), "loaded weights");
                Some(weights)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load weights");
                None
            }
        }
    }

    fn save(&self, weights: &[f64]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // `{}` on f64 prints the shortest text that parses back to the same value.
        let text: String = weights.iter().map(|w| format!("{w}\n")).collect();
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Keeps the weights in memory; for hosts that persist elsewhere, and tests.
#[derive(Debug, Default)]
pub struct MemoryWeightStore {
    weights: RefCell<Option<Vec<f64>>>,
}

impl MemoryWeightStore {
    pub fn new(weights: Option<Vec<f64>>) -> Self {
        Self {
            weights: RefCell::new(weights),
        }
    }

    pub fn saved(&self) -> Option<Vec<f64>> {
        self.weights.borrow().clone()
    }
}

impl WeightStore for MemoryWeightStore {
    fn load(&self) -> Option<Vec<f64>> {
        self.saved()
    }

    fn save(&self, weights: &[f64]) -> Result<(), StoreError> {
        *self.weights.borrow_mut() = Some(weights.to_vec());
        Ok(())
    }
}
