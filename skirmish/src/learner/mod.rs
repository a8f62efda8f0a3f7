mod errors;
pub mod qfunction;
pub mod store;
mod traits;
pub mod update;
mod weights;

pub use errors::{LearnerError, StoreError};
pub use qfunction::{evaluate, max_q, q_value};
pub use store::{DEFAULT_WEIGHTS_PATH, FileWeightStore, MemoryWeightStore};
pub use traits::WeightStore;
pub use update::{TdParams, td_update, update};
pub use weights::Weights;
