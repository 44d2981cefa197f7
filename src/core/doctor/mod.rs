pub mod classify;
pub mod client;
pub mod debug_logger;
pub mod http_check;
pub mod runner;
pub mod types;
pub mod url;

// Re-export commonly used items
pub use client::{HttpProbeClient, IsahcProbeClient, ProbeResponse, TransportError};
pub use debug_logger::{get_debug_logger, EnhancedDebugLogger};
pub use http_check::{
    check_http, check_http_blocking, check_http_opts, check_http_with, ProbeOptions,
    StatusPolicy,
};
pub use runner::run_checks;
pub use types::*;
pub use self::url::{validate_health_url, UrlError};
