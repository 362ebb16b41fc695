//! Configuration pushes to the engine
//!
//! Every field edit on steps 2-4 is forwarded to the engine's matching
//! setter straight from the mutation handler. A failed push is retried at
//! most once; a second failure becomes a non-blocking warning. Navigation
//! never waits on a push outcome.

use std::future::Future;

use crate::engine;

use super::error::ConfigPushError;

/// Run one configuration push with the single-retry policy. Returns the
/// warning to surface, if any.
pub async fn push_field<F, Fut>(field: &'static str, mut attempt: F) -> Option<ConfigPushError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = engine::Result<()>>,
{
    match attempt().await {
        Ok(()) => None,
        Err(first) => {
            tracing::debug!(field, error = %first, "config push failed, retrying");
            match attempt().await {
                Ok(()) => None,
                Err(cause) => {
                    let warning = ConfigPushError { field, cause };
                    tracing::warn!(%warning, "config push dropped after retry");
                    Some(warning)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::wizard::testing::StubEngine;

    #[tokio::test]
    async fn successful_push_returns_no_warning() {
        let engine = StubEngine::new();
        let warning = push_field("min-size", || engine.set_min_size(Some(1024))).await;
        assert!(warning.is_none());
        assert_eq!(engine.pushes(), vec![("min-size", "Some(1024)".to_string())]);
    }

    #[tokio::test]
    async fn one_failure_is_retried_and_absorbed() {
        let engine = StubEngine::new();
        engine.fail_push("min-width", 1);

        let warning = push_field("min-width", || engine.set_min_width(Some(800))).await;
        assert!(warning.is_none());
        assert_eq!(engine.pushes(), vec![("min-width", "Some(800)".to_string())]);
    }

    #[tokio::test]
    async fn two_failures_surface_a_warning() {
        let engine = StubEngine::new();
        engine.fail_push("verify", 2);

        let warning = push_field("verify", || engine.set_verify(false)).await;
        let warning = warning.expect("second failure should warn");
        assert_eq!(warning.field, "verify");
        assert!(engine.pushes().is_empty());
    }
}
