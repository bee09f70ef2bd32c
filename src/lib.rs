//! Client for the ebuild package registry.
//!
//! ARCHITECTURE
//! ============
//! - `net`: transport seam, wire types and one typed call per endpoint
//! - `state`: explicit session context, session transitions, view models
//! - `pages`: forms and rendered entries for search, package detail, login
//! - `app`: the shell that mounts views and dispatches actions
//!
//! The session is never ambient: `App` owns a `SessionManager`, which owns the
//! `Session` and hands it to every request that needs a bearer token.

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
