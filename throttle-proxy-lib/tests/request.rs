use throttle_proxy_lib::proxy::{read_request, RequestError};

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const LIMIT: usize = 64 * 1024;

#[tokio::test]
async fn test_connect_request_is_classified() -> TestResult<()> {
    let raw = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n";
    let mut reader = &raw[..];

    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.method(), "CONNECT");
    assert!(request.is_connect());
    assert_eq!(request.target(), "example.com:443");
    assert_eq!(request.head(), &raw[..]);
    assert!(reader.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_method_is_upper_cased() -> TestResult<()> {
    let mut reader = &b"connect host:1 HTTP/1.1\r\n\r\n"[..];
    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.method(), "CONNECT");
    assert!(request.is_connect());

    let mut reader = &b"get http://a/ HTTP/1.0\r\n\r\n"[..];
    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.method(), "GET");
    assert!(!request.is_connect());
    Ok(())
}

#[tokio::test]
async fn test_bytes_after_head_stay_buffered() -> TestResult<()> {
    let raw = b"POST http://a/x HTTP/1.1\r\nHost: a\r\nContent-Length: 4\r\n\r\nBODY";
    let mut reader = &raw[..];

    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.head(), &raw[..raw.len() - 4]);
    assert_eq!(reader, &b"BODY"[..]);
    Ok(())
}

#[tokio::test]
async fn test_head_is_kept_when_headers_are_cut_short() -> TestResult<()> {
    let mut reader = &b"GET / HTTP/1.1\r\nHost: a\r\nX-Partial: no-crlf"[..];

    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.head(), b"GET / HTTP/1.1\r\nHost: a\r\n");
    assert_eq!(request.host_header().as_deref(), Some("a"));
    Ok(())
}

#[tokio::test]
async fn test_bare_lf_does_not_end_a_line() -> TestResult<()> {
    let raw = b"GET / HTTP/1.1\r\nX-Odd: a\nb\r\n\r\n";
    let mut reader = &raw[..];

    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.head(), &raw[..]);
    Ok(())
}

#[tokio::test]
async fn test_empty_stream_is_closed() {
    let mut reader = &b""[..];
    assert!(matches!(read_request(&mut reader, LIMIT).await, Err(RequestError::Closed)));
}

#[tokio::test]
async fn test_request_line_without_crlf_is_closed() {
    let mut reader = &b"CONNECT example.com:443 HTTP/1.1"[..];
    assert!(matches!(read_request(&mut reader, LIMIT).await, Err(RequestError::Closed)));
}

#[tokio::test]
async fn test_single_token_request_line_is_malformed() {
    let mut reader = &b"GARBAGE\r\n\r\n"[..];
    match read_request(&mut reader, LIMIT).await {
        Err(RequestError::Malformed(line)) => assert_eq!(line, "GARBAGE"),
        other => panic!("expected malformed, got {other:?}"),
    }

    let mut reader = &b"\r\n"[..];
    assert!(matches!(read_request(&mut reader, LIMIT).await, Err(RequestError::Malformed(_))));
}

#[tokio::test]
async fn test_oversized_head_is_rejected() {
    let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
    for i in 0..100 {
        raw.extend_from_slice(format!("X-Filler-{i}: {}\r\n", "a".repeat(40)).as_bytes());
    }
    raw.extend_from_slice(b"\r\n");
    let mut reader = &raw[..];

    assert!(matches!(
        read_request(&mut reader, 1024).await,
        Err(RequestError::TooLarge { limit: _ })
    ));

    let endless = vec![b'A'; 4096];
    let mut reader = &endless[..];
    assert!(matches!(read_request(&mut reader, 1024).await, Err(RequestError::TooLarge { .. })));
}

#[tokio::test]
async fn test_host_header_lookup() -> TestResult<()> {
    let mut reader = &b"GET http://x/ HTTP/1.1\r\nAccept: */*\r\nhOsT:   example.org:8080  \r\n\r\n"[..];
    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.host_header().as_deref(), Some("example.org:8080"));

    let mut reader = &b"GET / HTTP/1.1\r\nAccept: */*\r\n\r\n"[..];
    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.host_header(), None);

    let mut reader = &b"GET / HTTP/1.1\r\nHost:   \r\n\r\n"[..];
    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.host_header(), None);

    // a header merely starting with "Host" is not the Host header
    let mut reader = &b"GET / HTTP/1.1\r\nHostname: nope\r\n\r\n"[..];
    let request = read_request(&mut reader, LIMIT).await?;
    assert_eq!(request.host_header(), None);
    Ok(())
}
