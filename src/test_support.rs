//! Helpers shared by unit tests

use mockito::{Matcher, Mock, ServerGuard};
use std::net::TcpListener;

/// Events endpoint on a mock server
pub fn events_url(server: &ServerGuard) -> String {
    format!("{}/events", server.url())
}

/// Expect exactly one JSON POST to `/events` whose body contains `partial`
pub fn expect_event(server: &mut ServerGuard, partial: serde_json::Value) -> Mock {
    server
        .mock("POST", "/events")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(partial))
        .with_status(201)
        .expect(1)
        .create()
}

/// URL of a local port that nothing listens on
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/events", port)
}
