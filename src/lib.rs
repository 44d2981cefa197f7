pub mod cli;
pub mod config;
pub mod core;
pub mod render;

pub use crate::core::doctor::{check_http, check_http_blocking, ProbeResult};
