use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};
use std::io::{Write, BufReader};
use std::path::{Path, PathBuf};
use std::env;
use std::fs::{File, OpenOptions};
use std::collections::HashMap;

use serde::{Serialize, Deserialize};
use chrono::Local;
use uuid::Uuid;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;

const LOG_ROTATION_SIZE_MB: u64 = 8;
const MAX_ARCHIVES: u32 = 5;
const ROTATION_CHECK_INTERVAL: u32 = 200;

pub const DEBUG_ENV_VAR: &str = "JARVIS_DOCTOR_DEBUG";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,                              // ISO-8601 with timezone
    pub level: String,                                  // DEBUG, ERROR, PROBE, CONFIG
    pub component: String,
    pub event: String,
    pub message: String,                                // redacted
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

struct RotatingLogger {
    log_path: PathBuf,
    write_count: AtomicU32,
}

impl RotatingLogger {
    fn new(log_path: PathBuf) -> Self {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        Self {
            log_path,
            write_count: AtomicU32::new(0),
        }
    }

    fn write_with_rotation(&self, json_line: &str) -> Result<(), std::io::Error> {
        if self.write_count.fetch_add(1, Ordering::Relaxed) % ROTATION_CHECK_INTERVAL == 0 {
            let _ = self.rotate_if_needed(); // rotation failures never block logging
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        writeln!(file, "{}", json_line)?;
        Ok(())
    }

    fn rotate_if_needed(&self) -> Result<(), std::io::Error> {
        if !self.needs_rotation()? {
            return Ok(());
        }

        // Several doctor processes may share one log file
        let lock_path = self.log_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {
                if self.needs_rotation()? {
                    self.perform_rotation()?;
                }
                let _ = std::fs::remove_file(&lock_path);
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    fn needs_rotation(&self) -> Result<bool, std::io::Error> {
        if !self.log_path.exists() {
            return Ok(false);
        }

        let metadata = std::fs::metadata(&self.log_path)?;
        Ok(metadata.len() >= LOG_ROTATION_SIZE_MB * 1024 * 1024)
    }

    fn log_dir_and_stem(&self) -> Result<(&Path, String), std::io::Error> {
        let dir = self.log_path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no parent")
        })?;
        let stem = self
            .log_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name")
            })?;
        Ok((dir, stem))
    }

    fn perform_rotation(&self) -> Result<(), std::io::Error> {
        let (log_dir, base_name) = self.log_dir_and_stem()?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let archive_path = log_dir.join(format!("{}.{}.gz", base_name, timestamp));

        let temp_path = self.log_path.with_extension("rotating");
        std::fs::rename(&self.log_path, &temp_path)?;

        let source_file = File::open(&temp_path)?;
        let target_file = File::create(&archive_path)?;
        let mut encoder = GzEncoder::new(target_file, Compression::default());
        std::io::copy(&mut BufReader::new(source_file), &mut encoder)?;
        encoder.finish()?;

        std::fs::remove_file(&temp_path)?;

        let _ = self.cleanup_old_archives();

        Ok(())
    }

    fn cleanup_old_archives(&self) -> Result<(), std::io::Error> {
        let (log_dir, base_name) = self.log_dir_and_stem()?;
        let prefix = format!("{}.", base_name);

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(log_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            if name.starts_with(&prefix) && name.ends_with(".gz") {
                archives.push((entry.path(), entry.metadata()?.modified()?));
            }
        }

        archives.sort_by_key(|(_, modified)| *modified);
        if archives.len() > MAX_ARCHIVES as usize {
            let to_remove = archives.len() - MAX_ARCHIVES as usize;
            for (path, _) in archives.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }
}

/// JSON Lines debug logger for probe lifecycle events
///
/// Disabled unless `JARVIS_DOCTOR_DEBUG` is truthy. Messages are redacted
/// before they reach disk; URLs lose their userinfo and query string.
pub struct EnhancedDebugLogger {
    enabled: bool,
    rotating_logger: Option<Arc<Mutex<RotatingLogger>>>,
    session_id: String,
    redaction_patterns: Vec<Regex>,
}

impl Default for EnhancedDebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedDebugLogger {
    pub fn new() -> Self {
        let enabled = Self::parse_debug_enabled();
        Self::build(enabled, Self::get_log_path())
    }

    /// Logger writing to an explicit path regardless of the environment
    pub fn with_path(log_path: PathBuf, enabled: bool) -> Self {
        Self::build(enabled, log_path)
    }

    fn build(enabled: bool, log_path: PathBuf) -> Self {
        let session_id = Uuid::new_v4().to_string()[..8].to_string();

        let rotating_logger = if enabled {
            Some(Arc::new(Mutex::new(RotatingLogger::new(log_path))))
        } else {
            None
        };

        Self {
            enabled,
            rotating_logger,
            session_id,
            redaction_patterns: Self::compile_redaction_patterns(),
        }
    }

    /// Supports: true/false, 1/0, yes/no, on/off (case insensitive)
    fn parse_debug_enabled() -> bool {
        env::var(DEBUG_ENV_VAR)
            .map(|v| Self::parse_debug_flag(&v))
            .unwrap_or(false)
    }

    /// Accepts `true`, `1`, `yes` or `on`, case-insensitively
    pub fn parse_debug_flag(value: &str) -> bool {
        matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
    }

    pub fn get_log_path() -> PathBuf {
        let mut log_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        log_path.push(".arp-jarvis");
        log_path.push("logs");
        log_path.push("doctor-debug.log");
        log_path
    }

    fn compile_redaction_patterns() -> Vec<Regex> {
        let patterns = [
            r"(?i)authorization[:\s]+[^\s\n]+",
            r"(?i)bearer[:\s]+[^\s\n]+",
            r"(?i)token[:=\s]+[^\s\n&]+",
            r"(?i)password[:=\s]+[^\s\n&]+",
            r"(?i)api[_-]?key[:=\s]+[^\s\n&]+",
            r"(?i)secret[:=\s]+[^\s\n&]+",
        ];

        patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    }

    pub fn redact_sensitive_data(&self, text: &str) -> String {
        let mut redacted = text.to_string();

        for regex in &self.redaction_patterns {
            redacted = regex.replace_all(&redacted, "[REDACTED]").to_string();
        }

        if redacted.len() > 100
            && !redacted.contains(' ')
            && redacted.chars().all(|c| c.is_ascii_alphanumeric() || "-_".contains(c))
        {
            redacted = format!("[REDACTED_LONG_STRING_{}chars]", redacted.len());
        }

        redacted
    }

    /// Strip userinfo and query from a URL before logging it
    pub fn redact_url(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                let _ = parsed.set_username("");
                let _ = parsed.set_password(None);
                if parsed.query().is_some() {
                    parsed.set_query(Some("[REDACTED]"));
                }
                parsed.to_string()
            }
            // Unparseable URLs are logged as-is after pattern redaction
            Err(_) => url.to_string(),
        }
    }

    fn log_sync(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        correlation_id: Option<String>,
        fields: HashMap<String, serde_json::Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: self.redact_sensitive_data(message),
            correlation_id: correlation_id.or_else(|| Some(self.session_id.clone())),
            fields,
        };

        if let Some(logger) = &self.rotating_logger {
            if let Ok(logger) = logger.lock() {
                if let Ok(json_line) = serde_json::to_string(&entry) {
                    let _ = logger.write_with_rotation(&json_line);
                }
            }
        }
    }

    pub fn debug_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("DEBUG", component, event, message, None, HashMap::new());
    }

    pub fn error_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("ERROR", component, event, message, None, HashMap::new());
    }

    pub fn probe_start(&self, url: &str, timeout_ms: u64, correlation_id: String) {
        let url = Self::redact_url(url);
        let mut fields = HashMap::new();
        fields.insert("url".to_string(), serde_json::Value::String(url.clone()));
        fields.insert("timeout_ms".to_string(), serde_json::Value::Number(timeout_ms.into()));

        self.log_sync("PROBE", "HttpCheck", "probe_start",
                     &format!("Probing {} (timeout {}ms)", url, timeout_ms),
                     Some(correlation_id), fields);
    }

    pub fn probe_end(
        &self,
        url: &str,
        ok: bool,
        http_status: Option<u16>,
        duration_ms: u64,
        error: Option<&str>,
        correlation_id: String,
    ) {
        let url = Self::redact_url(url);
        let mut fields = HashMap::new();
        fields.insert("url".to_string(), serde_json::Value::String(url.clone()));
        fields.insert("ok".to_string(), serde_json::Value::Bool(ok));
        fields.insert("duration_ms".to_string(), serde_json::Value::Number(duration_ms.into()));

        if let Some(code) = http_status {
            fields.insert("http_status".to_string(), serde_json::Value::Number(code.into()));
        }
        if let Some(error) = error {
            fields.insert(
                "error".to_string(),
                serde_json::Value::String(self.redact_sensitive_data(error)),
            );
        }

        let (level, message) = if ok {
            ("PROBE", format!("Probe ok: {} ({}ms)", url, duration_ms))
        } else {
            ("ERROR", format!("Probe failed: {} ({}ms)", url, duration_ms))
        };

        self.log_sync(level, "HttpCheck", "probe_end", &message, Some(correlation_id), fields);
    }

    pub fn config_loaded(&self, source: &str, check_count: usize) {
        let mut fields = HashMap::new();
        fields.insert("source".to_string(), serde_json::Value::String(source.to_string()));
        fields.insert("check_count".to_string(), serde_json::Value::Number(check_count.into()));

        self.log_sync("CONFIG", "DoctorConfig", "config_loaded",
                     &format!("Loaded {} checks from {}", check_count, source),
                     None, fields);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_session_id(&self) -> &str {
        &self.session_id
    }
}

pub fn get_debug_logger() -> EnhancedDebugLogger {
    EnhancedDebugLogger::new()
}
