//! Configuration for message correlation

use serde::{Deserialize, Serialize};

/// Correlation configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Replace a request's business time with its consensus time when the
    /// former lies too far after the latter
    pub clamp_future_timestamps: bool,
    /// Tolerated lead of business time over consensus time (seconds)
    pub max_timestamp_skew_secs: u64,
    /// Log groups that never received a request
    pub report_orphans: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            clamp_future_timestamps: true,
            max_timestamp_skew_secs: 300,
            report_orphans: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CorrelationConfig::default();
        assert!(config.clamp_future_timestamps);
        assert_eq!(config.max_timestamp_skew_secs, 300);
        assert!(config.report_orphans);
    }
}
