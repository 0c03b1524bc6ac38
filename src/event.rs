//! # Secret Events
//!
//! The record created for every watch notification and held in the buffer until drained.

use k8s_openapi::api::core::v1::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change reported by a Secret watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecretAction {
    Added,
    Modified,
    Deleted,
    Error,
}

impl SecretAction {
    /// Wire name of the action, as carried in exchange headers and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretAction::Added => "ADDED",
            SecretAction::Modified => "MODIFIED",
            SecretAction::Deleted => "DELETED",
            SecretAction::Error => "ERROR",
        }
    }
}

impl fmt::Display for SecretAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable pairing of a watch action with the Secret snapshot it carried
#[derive(Debug, Clone, PartialEq)]
pub struct SecretEvent {
    action: SecretAction,
    secret: Secret,
}

impl SecretEvent {
    pub fn new(action: SecretAction, secret: Secret) -> Self {
        Self { action, secret }
    }

    pub fn action(&self) -> SecretAction {
        self.action
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Split the event into its parts, handing the Secret over without a copy
    pub fn into_parts(self) -> (SecretAction, Secret) {
        (self.action, self.secret)
    }
}
