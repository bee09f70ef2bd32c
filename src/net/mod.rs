//! Networking modules for the registry REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` maps endpoints to typed calls, `transport` owns the HTTP client and
//! cookie jar, and `types` defines the wire schema.

pub mod api;
#[cfg(test)]
pub mod test_helpers;
pub mod transport;
pub mod types;
