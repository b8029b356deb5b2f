use throttle_proxy_lib::proxy::target::{Target, CONNECT_DEFAULT_PORT, HTTP_DEFAULT_PORT};

fn parse(authority: &str, default_port: u16) -> Option<Target> {
    Target::parse(authority, default_port)
}

#[test]
fn test_host_and_port() {
    assert_eq!(
        parse("example.com:8443", CONNECT_DEFAULT_PORT),
        Some(Target::new("example.com", 8443))
    );
    assert_eq!(parse("10.0.0.1:80", CONNECT_DEFAULT_PORT), Some(Target::new("10.0.0.1", 80)));
}

#[test]
fn test_default_ports() {
    assert_eq!(parse("example.com", CONNECT_DEFAULT_PORT), Some(Target::new("example.com", 443)));
    assert_eq!(parse("example.com", HTTP_DEFAULT_PORT), Some(Target::new("example.com", 80)));
}

#[test]
fn test_bad_port_falls_back_to_default() {
    assert_eq!(
        parse("example.com:https", CONNECT_DEFAULT_PORT),
        Some(Target::new("example.com", 443))
    );
    assert_eq!(parse("example.com:99999", HTTP_DEFAULT_PORT), Some(Target::new("example.com", 80)));
    assert_eq!(parse("example.com:", HTTP_DEFAULT_PORT), Some(Target::new("example.com", 80)));
}

#[test]
fn test_splits_on_first_colon() {
    assert_eq!(parse("a:1:2", HTTP_DEFAULT_PORT), Some(Target::new("a", 80)));
}

#[test]
fn test_bracketed_ipv6() {
    assert_eq!(parse("[::1]:8080", CONNECT_DEFAULT_PORT), Some(Target::new("::1", 8080)));
    assert_eq!(parse("[::1]", CONNECT_DEFAULT_PORT), Some(Target::new("::1", 443)));
    assert_eq!(parse("[::1", CONNECT_DEFAULT_PORT), None);
}

#[test]
fn test_empty_host_is_rejected() {
    assert_eq!(parse("", HTTP_DEFAULT_PORT), None);
    assert_eq!(parse(":8080", HTTP_DEFAULT_PORT), None);
    assert_eq!(parse("   ", HTTP_DEFAULT_PORT), None);
}

#[test]
fn test_display() {
    assert_eq!(Target::new("example.com", 443).to_string(), "example.com:443");
    assert_eq!(Target::new("::1", 8080).to_string(), "[::1]:8080");
}
