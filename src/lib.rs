//! # Secret Watch Bridge
//!
//! Exposes asynchronous Kubernetes Secret watch notifications as a pollable queue.
//!
//! ## Overview
//!
//! 1. **Watch** - a watch subscription on `Secret` resources (one namespace or the
//!    whole cluster) inserts every notification into a shared buffer keyed by its
//!    arrival time in milliseconds
//! 2. **Poll** - a fixed-delay loop drains the buffer, handing one [`Exchange`] per
//!    event to a downstream [`Processor`] and removing each entry after hand-off
//!
//! Delivery is best effort: the buffer is in-memory, events sharing a millisecond
//! overwrite each other, and a processor failure loses the entries already handed
//! off in that poll.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod consumer;
pub mod error;
pub mod event;
pub mod exchange;
pub mod observability;
pub mod processor;
pub mod runtime;
pub mod server;
pub mod watch;

pub use buffer::EventBuffer;
pub use consumer::SecretsConsumer;
pub use error::{ConsumerError, PollError, ProcessError, WatchError};
pub use event::{SecretAction, SecretEvent};
pub use exchange::Exchange;
pub use processor::Processor;
