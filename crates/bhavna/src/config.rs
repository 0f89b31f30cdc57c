//! Client configuration. Built in code; there is no config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::chart::ChartConfig;

/// Where the analysis service listens unless told otherwise.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/analyze";

/// Everything the session needs to know at startup.
///
/// ```rust,ignore
/// let config = ClientConfig::default()
///     .with_endpoint("http://10.0.0.5:5000/api/analyze")
///     .with_error_display(Duration::from_secs(8));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the analyze endpoint.
    pub endpoint: String,
    /// How long an error banner stays up.
    pub error_display: Duration,
    /// Delay between showing a result and moving focus to it.
    pub reveal_delay: Duration,
    /// Chart appearance and animation.
    pub chart: ChartConfig,
    /// Log directory. `None` means `<temp>/bhavna/logs`.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            error_display: Duration::from_secs(5),
            reveal_delay: Duration::from_millis(300),
            chart: ChartConfig::default(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_error_display(mut self, duration: Duration) -> Self {
        self.error_display = duration;
        self
    }

    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    pub fn with_chart(mut self, chart: ChartConfig) -> Self {
        self.chart = chart;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// The configured log directory, or the default under the temp dir.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("bhavna").join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://localhost:5000/api/analyze");
        assert_eq!(config.error_display, Duration::from_secs(5));
        assert_eq!(config.reveal_delay, Duration::from_millis(300));
        assert!(config.log_dir.is_none());
        assert!(config.resolved_log_dir().ends_with("bhavna/logs"));
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::default()
            .with_endpoint("http://example.test/api/analyze")
            .with_error_display(Duration::from_secs(1))
            .with_reveal_delay(Duration::ZERO)
            .with_log_dir("/var/log/bhavna");
        assert_eq!(config.endpoint, "http://example.test/api/analyze");
        assert_eq!(config.error_display, Duration::from_secs(1));
        assert_eq!(config.reveal_delay, Duration::ZERO);
        assert_eq!(config.resolved_log_dir(), PathBuf::from("/var/log/bhavna"));
    }
}
