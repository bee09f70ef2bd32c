//! Page modules: form models and the entries each view renders.
//!
//! ARCHITECTURE
//! ============
//! Pages convert wire types into view entries and hold form input. The shell
//! in `app` decides when they run and where the results land.

pub mod login;
pub mod package;
pub mod search;
