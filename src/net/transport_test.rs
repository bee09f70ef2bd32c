use super::*;
use serde_json::json;

#[test]
fn cookie_value_finds_named_cookie() {
    let header = "ebuild_refresh=r1; ebuild_csrf=c1; theme=dark";
    assert_eq!(cookie_value(header, "ebuild_csrf"), Some("c1".to_owned()));
    assert_eq!(cookie_value(header, "theme"), Some("dark".to_owned()));
}

#[test]
fn cookie_value_requires_exact_name() {
    assert_eq!(cookie_value("x_ebuild_csrf=nope", "ebuild_csrf"), None);
    assert_eq!(cookie_value("", "ebuild_csrf"), None);
}

#[test]
fn cookie_value_keeps_empty_values() {
    assert_eq!(cookie_value("ebuild_csrf=", "ebuild_csrf"), Some(String::new()));
}

#[test]
fn request_builder_collects_headers_and_body() {
    let req = HttpRequest::post("/packages")
        .header("Authorization", "Bearer t")
        .with_credentials()
        .json(&json!({ "name": "n" }))
        .unwrap();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.header_value("authorization"), Some("Bearer t"));
    assert_eq!(req.json, Some(json!({ "name": "n" })));
    assert!(req.credentials);
}

#[test]
fn response_success_covers_2xx_only() {
    assert!(HttpResponse::new(200, "").is_success());
    assert!(HttpResponse::new(201, "").is_success());
    assert!(!HttpResponse::new(304, "").is_success());
    assert!(!HttpResponse::new(401, "").is_success());
}

#[test]
fn success_json_maps_status_errors() {
    let err = HttpResponse::new(404, "{\"error\":\"not found\"}")
        .success_json::<serde_json::Value>()
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn success_json_maps_parse_errors() {
    let err = HttpResponse::new(200, "<html>").success_json::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
}

#[test]
fn http_transport_rejects_invalid_base_url() {
    let cfg = ClientConfig { base_url: "not a url".to_owned(), ..ClientConfig::default() };
    assert!(matches!(HttpTransport::new(&cfg), Err(ClientError::InvalidBaseUrl(_))));
}

#[test]
fn http_transport_starts_without_cookies() {
    let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
    assert_eq!(transport.cookie("ebuild_csrf"), None);
}

#[test]
fn endpoint_urls_keep_base_path_prefix() {
    let cfg = ClientConfig::default().with_base_url("http://registry.test/ebuild/").unwrap();
    let transport = HttpTransport::new(&cfg).unwrap();
    assert_eq!(transport.url("/search?q=foo").unwrap().as_str(), "http://registry.test/ebuild/search?q=foo");
    assert_eq!(transport.url("/packages/1/versions").unwrap().as_str(), "http://registry.test/ebuild/packages/1/versions");
}

#[test]
fn endpoint_urls_on_bare_origin() {
    let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
    assert_eq!(transport.url("/refresh").unwrap().as_str(), "http://127.0.0.1:8080/refresh");
}
