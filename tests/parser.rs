use http_wire::Parser;

/// Scenario 1: minimal GET request.
#[test]
fn minimal_get_request() {
    let _ = env_logger::try_init();
    let mut p = Parser::new(0, true);
    p.execute(b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n");
    assert_eq!(p.method(), Some("GET"));
    assert_eq!(p.url(), Some("/hello"));
    assert_eq!(p.path(), Some("/hello"));
    assert_eq!(p.version(), Some(http_wire::Version(1, 1)));
    assert_eq!(p.headers().get("Host"), Some("example.com".to_string()));
    assert!(p.is_message_complete());
    assert_eq!(p.recv_body(), Vec::<u8>::new());
}

/// Scenario 2: 204 No Content response forces an empty body.
#[test]
fn response_204_no_content() {
    let mut p = Parser::new(1, true);
    p.execute(b"HTTP/1.1 204 No Content\r\nServer: x\r\n\r\n");
    assert_eq!(p.status_code(), Some(204));
    assert_eq!(p.reason(), Some("No"));
    assert_eq!(p.version(), Some(http_wire::Version(1, 1)));
    assert!(p.is_message_complete());
    assert_eq!(p.recv_body(), Vec::<u8>::new());
}

/// Scenario 3: identity body split across two feeds.
#[test]
fn identity_body_split_across_feeds() {
    let mut p = Parser::new(1, true);
    p.execute(b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\n");
    assert!(p.is_headers_complete());
    p.execute(b"Hello ");
    assert!(p.is_partial_body());
    assert!(!p.is_message_complete());
    let first = p.recv_body();
    assert_eq!(first, b"Hello ");

    p.execute(b"World");
    assert!(p.is_message_complete());
    assert_eq!(p.recv_body(), b"World");
}

/// Scenario 4: chunked body, no named trailers present.
#[test]
fn chunked_body_two_chunks() {
    let mut p = Parser::new(1, true);
    p.execute(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n");
    assert!(p.is_chunked());
    p.execute(b"5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n");
    assert!(p.is_message_complete());
    assert_eq!(p.recv_body(), b"Hello World");
}

/// Scenario 5: invalid chunk size sets INVALID_CHUNK and returns -1.
#[test]
fn invalid_chunk_size() {
    let mut p = Parser::new(1, true);
    p.execute(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n");
    let n = p.execute(b"ZZ\r\nwhatever");
    assert_eq!(n, -1);
    assert_eq!(p.errno(), Some(http_wire::Errno::InvalidChunk));
}

/// Scenario 6: header continuation folding.
#[test]
fn header_folding() {
    let mut p = Parser::new(0, true);
    p.execute(b"GET / HTTP/1.1\r\nX-Long: part1\r\n part2\r\n\r\n");
    assert_eq!(p.headers().get("X-Long"), Some("part1 part2".to_string()));
}

/// Resumability: any byte-level split of a full message yields the
/// same final state as feeding it whole.
#[test]
fn resumability_holds_for_every_split() {
    let whole: &[u8] =
        b"POST /submit?x=1 HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello";
    for split in 0..=whole.len() {
        let mut p = Parser::new(0, true);
        p.execute(&whole[..split]);
        p.execute(&whole[split..]);
        assert!(p.is_message_complete(), "failed at split {}", split);
        assert_eq!(p.method(), Some("POST"));
        assert_eq!(p.path(), Some("/submit"));
        assert_eq!(p.query_string(), Some("x=1"));
        assert_eq!(p.recv_body(), b"hello");
    }
}

/// HEAD responses never expect a body even with Content-Length set.
#[test]
fn head_request_forces_empty_body() {
    let mut p = Parser::new(0, true);
    p.execute(b"HEAD /x HTTP/1.1\r\n\r\n");
    assert!(p.is_message_complete());
}

/// An identity body with no `Content-Length` is never read
/// incrementally: it completes as soon as headers are parsed, with
/// whatever bytes happened to already be buffered. Anything fed
/// afterward arrives too late and is silently dropped.
#[test]
fn undelimited_body_completes_with_headers_not_on_close() {
    let mut p = Parser::new(1, true);
    p.execute(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\nwhatever");
    assert!(p.is_message_complete());
    assert_eq!(p.recv_body(), b"whatever");
    assert_eq!(p.execute(b"more"), 0);
    assert_eq!(p.recv_body(), Vec::<u8>::new());
}

/// An explicit end-of-stream signal (`execute(&[])`) still forces
/// completion once headers are seen, even for a body cut short mid
/// `Content-Length`.
#[test]
fn explicit_close_forces_completion_of_a_short_body() {
    let mut p = Parser::new(1, true);
    p.execute(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n");
    p.execute(b"only this much");
    assert!(!p.is_message_complete());
    p.execute(b"");
    assert!(p.is_message_complete());
    assert_eq!(p.recv_body(), b"only this much");
}

/// `kind == 2` sniffs whichever of request/status line matches.
#[test]
fn auto_kind_detects_request_or_response() {
    let mut req = Parser::new(2, true);
    req.execute(b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(req.method(), Some("GET"));

    let mut resp = Parser::new(2, true);
    resp.execute(b"HTTP/1.1 200 OK\r\n\r\n");
    assert_eq!(resp.status_code(), Some(200));
}

/// A bad first line sets BAD_FIRST_LINE and leaves the parser unusable.
#[test]
fn bad_first_line() {
    let mut p = Parser::new(0, true);
    let n = p.execute(b"not a valid request line at all\r\n");
    assert_eq!(p.errno(), Some(http_wire::Errno::BadFirstLine));
    assert!(n >= 0);
    assert!(!p.is_headers_complete());
}

/// Further feeds after completion consume nothing.
#[test]
fn feeds_after_completion_consume_zero() {
    let mut p = Parser::new(0, true);
    p.execute(b"GET / HTTP/1.1\r\n\r\n");
    assert!(p.is_message_complete());
    assert_eq!(p.execute(b"GET / HTTP/1.1\r\n\r\n"), 0);
}
