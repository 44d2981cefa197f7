use crate::core::doctor::get_debug_logger;
use crate::core::doctor::http_check::{ProbeOptions, StatusPolicy, MAX_TIMEOUT_MS};
use crate::core::doctor::types::{DoctorError, HttpCheck};
use crate::core::doctor::url::validate_health_url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TIMEOUT_ENV_VAR: &str = "JARVIS_DOCTOR_TIMEOUT_MS";

/// Doctor configuration, read from `~/.arp-jarvis/doctor.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorConfig {
    pub timeout_ms: u32,
    pub status_policy: StatusPolicy,
    pub follow_redirects: bool,
    pub checks: Vec<HttpCheck>,
}

impl DoctorConfig {
    pub fn default_path() -> Result<PathBuf, DoctorError> {
        let home = dirs::home_dir().ok_or(DoctorError::HomeDirNotFound)?;
        Ok(home.join(".arp-jarvis").join("doctor.toml"))
    }

    /// Load from the default path; a missing file yields the defaults
    pub fn load() -> Result<Self, DoctorError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, DoctorError> {
        let content = std::fs::read_to_string(path).map_err(|source| DoctorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;

        get_debug_logger().config_loaded(&path.display().to_string(), config.checks.len());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, DoctorError> {
        Ok(toml::from_str(content)?)
    }

    /// Write the default config to the default path
    pub fn init() -> Result<PathBuf, DoctorError> {
        let path = Self::default_path()?;
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Refuses to overwrite an existing file
    pub fn init_at(path: &Path) -> Result<(), DoctorError> {
        if path.exists() {
            return Err(DoctorError::ConfigExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate check names and URLs
    pub fn check(&self) -> Result<(), DoctorError> {
        let mut seen = std::collections::HashSet::new();
        for check in &self.checks {
            if check.name.trim().is_empty() {
                return Err(DoctorError::InvalidCheck {
                    name: check.name.clone(),
                    reason: "name must not be empty".to_string(),
                });
            }
            if !seen.insert(check.name.as_str()) {
                return Err(DoctorError::InvalidCheck {
                    name: check.name.clone(),
                    reason: "duplicate check name".to_string(),
                });
            }
            validate_health_url(&check.url).map_err(|source| DoctorError::InvalidUrl {
                name: check.name.clone(),
                source,
            })?;
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(DoctorError::InvalidCheck {
                name: "timeout_ms".to_string(),
                reason: format!("must be within 1..={}", MAX_TIMEOUT_MS),
            });
        }
        Ok(())
    }

    /// Apply `JARVIS_DOCTOR_TIMEOUT_MS`, capped at `MAX_TIMEOUT_MS`
    pub fn apply_env_overrides(&mut self) {
        if let Some(timeout) = Self::get_timeout_env_var() {
            self.timeout_ms = std::cmp::min(timeout, MAX_TIMEOUT_MS);
        }
    }

    fn get_timeout_env_var() -> Option<u32> {
        std::env::var(TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions::default()
            .with_timeout_ms(self.timeout_ms)
            .with_status_policy(self.status_policy)
            .with_follow_redirects(self.follow_redirects)
    }
}
