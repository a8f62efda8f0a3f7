use super::errors::StoreError;

/// Where the weight vector lives between runs.
pub trait WeightStore {
    /// Read the stored weights, or `None` (after logging why) when they are
    /// absent or unreadable.
    fn load(&self) -> Option<Vec<f64>>;

    /// Overwrite the stored weights.
    fn save(&self, weights: &[f64]) -> Result<(), StoreError>;
}
