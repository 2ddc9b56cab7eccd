//! # KnotProxy: Traced Knot Invocation
//!
//! The router never calls a [`Knot`] directly. It goes through a proxy that
//! bounds the call with the configured delivery timeout and wraps it in a
//! span, the same decorator shape used for every stage.

use knotwork_core::{Knot, KnotContext, KnotError, KnotResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

fn default_timeout_ms() -> u64 {
    30_000
}

/// How knot invocations are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    /// Upper bound for a single knot invocation.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl DeliveryOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Handle to the knot living at one address.
#[derive(Clone)]
pub struct KnotProxy {
    address: String,
    label: String,
    knot: Arc<dyn Knot>,
    options: DeliveryOptions,
}

impl KnotProxy {
    pub fn new(address: impl Into<String>, knot: Arc<dyn Knot>, options: DeliveryOptions) -> Self {
        let label = knot.label();
        Self {
            address: address.into(),
            label,
            knot,
            options,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn process(&self, context: KnotContext) -> KnotResult {
        let span = tracing::info_span!(
            "Knot",
            knotwork.knot.address = %self.address,
            knotwork.knot.label = %self.label,
        );

        async move {
            tracing::debug!(fragments = context.fragments.len(), "Entering knot");
            let start = Instant::now();
            let timeout = self.options.timeout();

            let result = match tokio::time::timeout(timeout, self.knot.process(context)).await {
                Ok(result) => result,
                Err(_) => Err(KnotError::Timeout(timeout)),
            };

            let duration = start.elapsed();
            match &result {
                Ok(ctx) => {
                    tracing::debug!(transition = ?ctx.transition, ?duration, "Knot completed");
                }
                Err(e) => {
                    tracing::error!(error = %e, ?duration, "Knot failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for KnotProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnotProxy")
            .field("address", &self.address)
            .field("label", &self.label)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Sleepy(Duration);

    #[async_trait]
    impl Knot for Sleepy {
        async fn process(&self, context: KnotContext) -> KnotResult {
            tokio::time::sleep(self.0).await;
            Ok(context)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_knot_times_out() {
        let proxy = KnotProxy::new(
            "knot.sleepy",
            Arc::new(Sleepy(Duration::from_secs(60))),
            DeliveryOptions::with_timeout(Duration::from_secs(1)),
        );

        let err = proxy.process(KnotContext::default()).await.unwrap_err();
        assert!(matches!(err, KnotError::Timeout(t) if t == Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_knot_completes() {
        let proxy = KnotProxy::new(
            "knot.sleepy",
            Arc::new(Sleepy(Duration::from_millis(10))),
            DeliveryOptions::default(),
        );

        assert!(proxy.process(KnotContext::default()).await.is_ok());
        assert_eq!(proxy.address(), "knot.sleepy");
    }

    #[test]
    fn timeout_defaults_when_missing_from_config() {
        let options: DeliveryOptions = toml::from_str("").unwrap();
        assert_eq!(options, DeliveryOptions::default());
    }

    #[test]
    fn huge_timeouts_saturate() {
        assert_eq!(DeliveryOptions::with_timeout(Duration::MAX).timeout_ms, u64::MAX);
        assert_eq!(
            DeliveryOptions::with_timeout(Duration::from_secs(2)).timeout(),
            Duration::from_secs(2)
        );
    }
}
