//! Watch binding integration tests against a mock API server.

pub mod kube_source;
