//! # Event subscriber trait and worker attachment.
//!
//! [`Subscribe`] is the extension point for plugging observers (logging,
//! metrics, dashboards) into the event stream without touching the session
//! manager or launcher.
//!
//! ## Rules
//! - Each attached subscriber gets its own worker task and subscription.
//! - A slow subscriber lags its own subscription only; publishers and other
//!   subscribers are unaffected.
//! - Panics inside a subscriber are caught and logged; the worker keeps
//!   draining events.
//! - Workers detach on token cancellation or bus close.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::bus::Bus;
use super::event::Event;

/// Consumer of session events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Runs on the subscriber's dedicated worker task; events arrive
    /// sequentially in publish order. Handle errors internally.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name for logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Bus {
    /// Attaches a subscriber: spawns a worker draining a fresh subscription
    /// into [`Subscribe::on_event`] until `token` is cancelled or the bus
    /// closes.
    pub fn attach(&self, subscriber: Arc<dyn Subscribe>, token: CancellationToken) -> JoinHandle<()> {
        let mut sub = self.subscribe();

        tokio::spawn(async move {
            loop {
                let ev = tokio::select! {
                    _ = token.cancelled() => break,
                    ev = sub.next() => match ev {
                        Some(ev) => ev,
                        None => break,
                    },
                };

                let fut = subscriber.on_event(&ev);
                if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    tracing::warn!(
                        subscriber = subscriber.name(),
                        ?panic,
                        "subscriber panicked; continuing"
                    );
                }
            }
        })
    }
}
