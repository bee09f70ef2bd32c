//! Client state: session context, session transitions and view models.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` is the explicit token context passed to requests, `auth` drives
//! its transitions, and `ui` holds what the page currently shows.

pub mod auth;
pub mod session;
pub mod ui;
