pub mod defaults;
pub mod types;

pub use types::{DoctorConfig, TIMEOUT_ENV_VAR};
