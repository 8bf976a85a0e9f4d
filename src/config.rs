use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::logging::LogSettings;
use crate::services::review::ReviewThresholds;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log: LogSettings,
    pub jwt_secret: Option<String>,
    pub review: ReviewThresholds,
    /// Settings that were present but unusable and replaced by defaults.
    /// Read before tracing is installed, so `main` reports them afterwards.
    pub rejected: Vec<RejectedSetting>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSetting {
    pub key: &'static str,
    pub value: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log = LogSettings::from_env(&log_level);

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let (review, rejected) = review_thresholds_from(
            std::env::var("REVIEW_WEAK_ACCURACY_THRESHOLD").ok().as_deref(),
            std::env::var("REVIEW_LOW_ATTEMPT_THRESHOLD").ok().as_deref(),
        );

        Self {
            host,
            port,
            log,
            jwt_secret,
            review,
            rejected,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            log: LogSettings {
                level: "info".to_string(),
                file_dir: None,
            },
            jwt_secret: None,
            review: ReviewThresholds::default(),
            rejected: Vec::new(),
        }
    }
}

const WEAK_ACCURACY_KEY: &str = "REVIEW_WEAK_ACCURACY_THRESHOLD";
const LOW_ATTEMPT_KEY: &str = "REVIEW_LOW_ATTEMPT_THRESHOLD";

fn review_thresholds_from(
    weak_raw: Option<&str>,
    low_raw: Option<&str>,
) -> (ReviewThresholds, Vec<RejectedSetting>) {
    let defaults = ReviewThresholds::default();
    let mut rejected = Vec::new();

    let weak_accuracy = match weak_raw.map(str::trim) {
        None | Some("") => defaults.weak_accuracy,
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value > 0.0 && value <= 1.0 => value,
            _ => {
                rejected.push(RejectedSetting {
                    key: WEAK_ACCURACY_KEY,
                    value: raw.to_string(),
                });
                defaults.weak_accuracy
            }
        },
    };

    let low_attempt = match low_raw.map(str::trim) {
        None | Some("") => defaults.low_attempt,
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) if value >= 1 => value,
            _ => {
                rejected.push(RejectedSetting {
                    key: LOW_ATTEMPT_KEY,
                    value: raw.to_string(),
                });
                defaults.low_attempt
            }
        },
    };

    let thresholds = ReviewThresholds {
        weak_accuracy,
        low_attempt,
    };
    (thresholds, rejected)
}
