use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize env mutation; the guard must outlive every `set_var` below.
fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers hold `env_guard()`, so no other test reads the env concurrently.
unsafe fn clear_ebuild_env() {
    unsafe {
        std::env::remove_var("EBUILD_BASE_URL");
        std::env::remove_var("EBUILD_SERVICE_NAME");
        std::env::remove_var("EBUILD_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("EBUILD_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_uses_defaults() {
    let _guard = env_guard();
    unsafe { clear_ebuild_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.csrf_cookie_name(), "ebuild_csrf");
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_guard();
    unsafe {
        clear_ebuild_env();
        std::env::set_var("EBUILD_BASE_URL", "https://registry.example.test/");
        std::env::set_var("EBUILD_SERVICE_NAME", "pkgs");
        std::env::set_var("EBUILD_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("EBUILD_CONNECT_TIMEOUT_SECS", " 7 ");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://registry.example.test");
    assert_eq!(cfg.service_name, "pkgs");
    assert_eq!(cfg.csrf_cookie_name(), "pkgs_csrf");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_ebuild_env() };
}

#[test]
fn from_env_rejects_non_numeric_timeout() {
    let _guard = env_guard();
    unsafe {
        clear_ebuild_env();
        std::env::set_var("EBUILD_REQUEST_TIMEOUT_SECS", "soon");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("EBUILD_REQUEST_TIMEOUT_SECS"));

    unsafe { clear_ebuild_env() };
}

#[test]
fn from_env_rejects_blank_service_name() {
    let _guard = env_guard();
    unsafe {
        clear_ebuild_env();
        std::env::set_var("EBUILD_SERVICE_NAME", "   ");
    }

    assert!(matches!(ClientConfig::from_env(), Err(ClientError::Config(_))));

    unsafe { clear_ebuild_env() };
}

#[test]
fn with_base_url_trims_trailing_slashes() {
    let cfg = ClientConfig::default().with_base_url("http://localhost:9000//").unwrap();
    assert_eq!(cfg.base_url, "http://localhost:9000");
}

#[test]
fn with_base_url_rejects_blank() {
    assert!(ClientConfig::default().with_base_url("  ").is_err());
}
