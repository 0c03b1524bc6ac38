//! # Exchange
//!
//! The unit of work handed to the downstream processor, one per drained event.

use crate::constants::{KUBERNETES_EVENT_ACTION, KUBERNETES_EVENT_TIMESTAMP};
use crate::event::SecretAction;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Secret;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Message carrying a Secret snapshot as its body plus header metadata
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Unique identifier of this exchange
    pub id: Uuid,
    /// When the exchange was created by the drain
    pub created: DateTime<Utc>,
    /// Secret snapshot taken from the watch notification
    pub body: Secret,
    /// Header metadata, keyed by header name
    pub headers: BTreeMap<String, Value>,
}

impl Exchange {
    pub fn new(body: Secret) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: Utc::now(),
            body,
            headers: BTreeMap::new(),
        }
    }

    /// Build the exchange emitted for a buffered event
    pub fn for_event(action: SecretAction, timestamp: i64, secret: Secret) -> Self {
        let mut exchange = Self::new(secret);
        exchange.set_header(KUBERNETES_EVENT_ACTION, Value::from(action.as_str()));
        exchange.set_header(KUBERNETES_EVENT_TIMESTAMP, Value::from(timestamp));
        exchange
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: Value) {
        self.headers.insert(name.into(), value);
    }

    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }

    /// Watch action carried in the action header
    pub fn event_action(&self) -> Option<SecretAction> {
        self.header(KUBERNETES_EVENT_ACTION)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Buffer timestamp key carried in the timestamp header
    pub fn event_timestamp(&self) -> Option<i64> {
        self.header(KUBERNETES_EVENT_TIMESTAMP).and_then(Value::as_i64)
    }

    /// `namespace/name` of the body, for logging
    pub fn secret_ref(&self) -> String {
        format!(
            "{}/{}",
            self.body.metadata.namespace.as_deref().unwrap_or("default"),
            self.body.metadata.name.as_deref().unwrap_or("unknown")
        )
    }
}
