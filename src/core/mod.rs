pub mod doctor;

pub use doctor::{check_http, run_checks, ProbeResult};
