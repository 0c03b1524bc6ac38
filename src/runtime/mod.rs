//! # Runtime Module
//!
//! Runtime components for the bridge: initialization, the fixed-delay poll loop
//! and poll failure handling.

pub mod error_policy;
pub mod initialization;
pub mod poll_loop;

pub use error_policy::*;
pub use initialization::*;
pub use poll_loop::*;
