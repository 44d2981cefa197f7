use super::types::DoctorConfig;
use crate::core::doctor::http_check::{StatusPolicy, DEFAULT_TIMEOUT_MS};
use crate::core::doctor::types::HttpCheck;

impl Default for DoctorConfig {
    fn default() -> Self {
        DoctorConfig {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            status_policy: StatusPolicy::AnyResponse,
            follow_redirects: true,
            checks: vec![HttpCheck::new("run-gateway", "http://127.0.0.1:8080/v1/health")],
        }
    }
}
