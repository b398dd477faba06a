//! # Event bus: hot broadcast stream with filtered, deadline-aware views.
//!
//! [`Bus`] is a wrapper around [`tokio::sync::broadcast`] through which the
//! driver pushes [`Event`]s to any number of concurrent consumers.
//!
//! ## Key characteristics
//! - **Broadcast semantics**: every active subscriber receives a clone of
//!   each event, in publish order.
//! - **Non-persistent**: events published without subscribers are dropped.
//! - **Bounded capacity**: slow subscribers lag and skip the oldest events.
//!
//! ## Subscriptions
//! [`Subscription`] wraps the raw receiver and provides the views the
//! session manager and launcher are built on:
//! - [`Subscription::next`] — next event, skipping lag gaps
//! - [`Subscription::next_match`] — next event matching a predicate
//! - [`Subscription::next_match_until`] — filtered receive against an
//!   absolute deadline, completing with a typed [`Signal::TimedOut`]
//!   sentinel on expiry; callers translate the sentinel into their domain
//!   error
//!
//! Deadlines are absolute so a timeout always counts from the moment the
//! subscription was armed, not from each receive call.

use tokio::sync::broadcast;
use tokio::time::Instant;

use super::event::Event;

/// Broadcast channel for session events.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// When capacity is exceeded, the oldest unreceived events are dropped
    /// for the lagging subscriber only.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no active subscribers, the event is dropped silently.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new subscription receiving all future events.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Outcome of a deadline-bounded receive.
#[derive(Debug)]
pub enum Signal {
    /// A matching event arrived before the deadline.
    Event(Event),
    /// The deadline expired with no matching event.
    TimedOut,
    /// The bus was closed (all senders dropped).
    Closed,
}

/// A per-consumer view of the event stream.
///
/// Events are observed in arrival order. Lag gaps (events dropped because
/// this subscriber fell behind the channel capacity) are skipped silently.
pub struct Subscription {
    rx: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receives the next event; `None` once the bus is closed.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(ev) => return Some(ev),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    }

    /// Receives the next event matching `pred`, discarding the rest.
    pub async fn next_match<F>(&mut self, pred: F) -> Option<Event>
    where
        F: Fn(&Event) -> bool,
    {
        loop {
            match self.next().await {
                Some(ev) if pred(&ev) => return Some(ev),
                Some(_) => continue,
                None => return None,
            }
        }
    }

    /// Receives the next matching event, giving up at `deadline`.
    ///
    /// Expiry yields [`Signal::TimedOut`]; once returned, the caller is
    /// expected to drop the subscription — later matching events are simply
    /// never observed.
    pub async fn next_match_until<F>(&mut self, pred: F, deadline: Instant) -> Signal
    where
        F: Fn(&Event) -> bool,
    {
        match tokio::time::timeout_at(deadline, self.next_match(pred)).await {
            Ok(Some(ev)) => Signal::Event(ev),
            Ok(None) => Signal::Closed,
            Err(_) => Signal::TimedOut,
        }
    }
}
