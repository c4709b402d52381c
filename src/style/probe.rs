use crate::prelude::Duration;
use async_trait::async_trait;
use once_cell::sync::Lazy;

static PROBE_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("reefmap/", env!("CARGO_PKG_VERSION")))
        // 3xx counts as reachable, so redirects are not followed
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(1)
        .build()
        .unwrap_or_else(|err| {
            log::warn!("probe client builder failed ({}), using defaults", err);
            reqwest::Client::new()
        })
});

/// Result of one connectivity probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable { status: u16 },
    Unreachable { reason: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }

    /// Classifies an HTTP status: anything in `[200, 400)` is reachable
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            ProbeOutcome::Reachable { status }
        } else {
            ProbeOutcome::Unreachable {
                reason: format!("HTTP {}", status),
            }
        }
    }
}

/// Checks whether the primary tile endpoint answers.
///
/// Implementations never fail: every error, including a malformed URL or a
/// timeout, is reported as [`ProbeOutcome::Unreachable`].
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}

/// Probes with a single GET of a sample tile
#[derive(Debug, Clone, Default)]
pub struct HttpProbe;

impl HttpProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let url = match reqwest::Url::parse(url) {
            Ok(url) => url,
            Err(err) => {
                return ProbeOutcome::Unreachable {
                    reason: format!("malformed url: {}", err),
                }
            }
        };

        match PROBE_CLIENT.get(url).timeout(timeout).send().await {
            Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
            Err(err) if err.is_timeout() => ProbeOutcome::Unreachable {
                reason: format!("timed out after {:?}", timeout),
            },
            Err(err) => ProbeOutcome::Unreachable {
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ProbeOutcome::from_status(200).is_reachable());
        assert!(ProbeOutcome::from_status(304).is_reachable());
        assert!(ProbeOutcome::from_status(399).is_reachable());
        assert!(!ProbeOutcome::from_status(199).is_reachable());
        assert!(!ProbeOutcome::from_status(404).is_reachable());
        assert!(!ProbeOutcome::from_status(503).is_reachable());
    }

    #[test]
    fn test_malformed_url_is_unreachable() {
        let outcome = futures::executor::block_on(
            HttpProbe::new().probe("not a url", Duration::from_millis(10)),
        );
        assert!(matches!(outcome, ProbeOutcome::Unreachable { reason } if reason.contains("malformed")));
    }
}
