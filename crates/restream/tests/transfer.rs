//! End-to-end transfer and resumption tests.
//!
//! These run a real server on an ephemeral port. Mid-stream failures are
//! injected with the testkit's frame-dropping proxy; protocol-level error
//! paths are exercised with a raw framed connection.

use std::time::Duration;

use restream::proto::messages::reply;
use restream::proto::{ChecksumPayload, Connection, HandshakePayload, Message, SequencePayload};
use restream::{
    sequence_checksum, ClientId, DriverConfig, SessionDriver, ServerConfig, SessionStore,
};
use restream_client::RetryConfig;
use restream_testkit::{DropProxy, TestServer};

fn fast_config(addr: impl Into<String>, count: u32) -> DriverConfig {
    let mut config = DriverConfig::new(addr.into());
    config.requested_count = count;
    config.retry = RetryConfig {
        initial_delay: Duration::from_millis(1),
        multiplier: 2.0,
        max_delay: Duration::from_millis(10),
        max_attempts: 4,
        jitter: 0.0,
    };
    config
}

async fn raw_handshake(addr: &str, payload: HandshakePayload) -> Connection {
    let mut conn = Connection::connect(addr).await.expect("connect to server");
    conn.send(&Message::Handshake(payload))
        .await
        .expect("send handshake");
    conn
}

fn fresh(client: &ClientId, count: u32) -> HandshakePayload {
    HandshakePayload {
        client_id: client.clone(),
        resume: false,
        count,
        offset: 0,
    }
}

fn resume(client: &ClientId, offset: u32) -> HandshakePayload {
    HandshakePayload {
        client_id: client.clone(),
        resume: true,
        count: 0,
        offset,
    }
}

/// Read the checksum reply and then every streamed item until close.
async fn collect_stream(conn: &mut Connection) -> (ChecksumPayload, Vec<SequencePayload>) {
    let oracle = match conn.recv().await.expect("read checksum reply") {
        Some(Message::Checksum(payload)) => payload,
        other => panic!("expected checksum reply, got {other:?}"),
    };
    let mut items = Vec::new();
    while let Some(message) = conn.recv().await.expect("read stream") {
        match message {
            Message::Sequence(item) => items.push(item),
            other => panic!("unexpected message {other:?}"),
        }
    }
    (oracle, items)
}

#[tokio::test]
async fn uninterrupted_transfer_verifies_checksum() {
    let server = TestServer::spawn().await;
    let driver = SessionDriver::new(fast_config(server.addr().to_string(), 10));

    let transfer = driver.run().await.expect("transfer completes");
    assert_eq!(transfer.values.len(), 10);
    assert_eq!(transfer.reconnects, 0);
    assert_eq!(transfer.checksum, sequence_checksum(&transfer.values));

    // The collected sequence is exactly the one the server stored.
    let stored = server
        .store()
        .get(driver.client_id())
        .await
        .expect("store get")
        .expect("session exists");
    assert_eq!(*stored, transfer.values);
}

#[tokio::test]
async fn transfer_resumes_after_mid_stream_drop() {
    let server = TestServer::spawn().await;
    // Forward the checksum reply plus two items, then cut the connection.
    let proxy = DropProxy::spawn(server.addr(), 3).await;

    let driver = SessionDriver::new(fast_config(proxy.addr().to_string(), 10));
    let transfer = driver.run().await.expect("transfer completes after resume");

    assert_eq!(transfer.values.len(), 10);
    assert_eq!(transfer.reconnects, 1);

    let stored = server
        .store()
        .get(driver.client_id())
        .await
        .expect("store get")
        .expect("session exists");
    assert_eq!(*stored, transfer.values);
}

#[tokio::test]
async fn drop_right_after_checksum_resumes_from_zero() {
    let server = TestServer::spawn().await;
    // Only the checksum reply gets through before the cut.
    let proxy = DropProxy::spawn(server.addr(), 1).await;

    let driver = SessionDriver::new(fast_config(proxy.addr().to_string(), 6));
    let transfer = driver.run().await.expect("transfer completes after resume");

    assert_eq!(transfer.values.len(), 6);
    assert_eq!(transfer.reconnects, 1);
    assert_eq!(transfer.checksum, sequence_checksum(&transfer.values));
}

#[tokio::test]
async fn resume_with_unknown_identity_reports_session_not_found() {
    let server = TestServer::spawn().await;
    let client = ClientId::new("never-seen");

    let mut conn = raw_handshake(&server.addr().to_string(), resume(&client, 0)).await;
    match conn.recv().await.expect("read reply") {
        Some(Message::Error(message)) => assert_eq!(message, reply::SESSION_NOT_FOUND),
        other => panic!("expected error reply, got {other:?}"),
    }
}

#[tokio::test]
async fn resume_past_end_reports_offset_out_of_range() {
    let server = TestServer::spawn().await;
    let addr = server.addr().to_string();
    let client = ClientId::random();

    let mut conn = raw_handshake(&addr, fresh(&client, 5)).await;
    let (_, items) = collect_stream(&mut conn).await;
    assert_eq!(items.len(), 5);

    let mut conn = raw_handshake(&addr, resume(&client, 6)).await;
    match conn.recv().await.expect("read reply") {
        Some(Message::Error(message)) => assert_eq!(message, reply::OFFSET_OUT_OF_RANGE),
        other => panic!("expected error reply, got {other:?}"),
    }
}

#[tokio::test]
async fn resume_at_exact_end_streams_nothing() {
    let server = TestServer::spawn().await;
    let addr = server.addr().to_string();
    let client = ClientId::random();

    let mut conn = raw_handshake(&addr, fresh(&client, 4)).await;
    let (_, items) = collect_stream(&mut conn).await;
    assert_eq!(items.len(), 4);

    let mut conn = raw_handshake(&addr, resume(&client, 4)).await;
    assert!(conn.recv().await.expect("read reply").is_none());
}

#[tokio::test]
async fn resume_replays_the_suffix_with_absolute_indices() {
    let server = TestServer::spawn().await;
    let addr = server.addr().to_string();
    let client = ClientId::random();

    let mut conn = raw_handshake(&addr, fresh(&client, 8)).await;
    let (oracle, full) = collect_stream(&mut conn).await;
    assert_eq!(oracle.count, 8);

    let mut conn = raw_handshake(&addr, resume(&client, 5)).await;
    let mut suffix = Vec::new();
    while let Some(message) = conn.recv().await.expect("read stream") {
        match message {
            Message::Sequence(item) => suffix.push(item),
            other => panic!("unexpected message {other:?}"),
        }
    }

    assert_eq!(suffix.len(), 3);
    assert_eq!(suffix, full[5..]);
    assert_eq!(suffix[0].index, 5);
}

#[tokio::test]
async fn oversized_request_is_rejected_without_a_session() {
    let server = TestServer::spawn_with(ServerConfig {
        max_count: 100,
        ..TestServer::default_config()
    })
    .await;
    let client = ClientId::new("greedy");

    let mut conn = raw_handshake(&server.addr().to_string(), fresh(&client, 100_000)).await;
    match conn.recv().await.expect("read reply") {
        Some(Message::Error(message)) => {
            assert!(message.starts_with(reply::COUNT_TOO_LARGE), "got: {message}")
        }
        other => panic!("expected error reply, got {other:?}"),
    }

    assert!(server.store().get(&client).await.expect("store get").is_none());
}

#[tokio::test]
async fn zero_count_lets_the_server_choose_a_positive_length() {
    let server = TestServer::spawn_with(ServerConfig {
        max_count: 16,
        ..TestServer::default_config()
    })
    .await;
    let client = ClientId::random();

    let mut conn = raw_handshake(&server.addr().to_string(), fresh(&client, 0)).await;
    let (oracle, items) = collect_stream(&mut conn).await;

    assert!(oracle.count > 0);
    assert!(oracle.count < 16);
    assert_eq!(items.len() as u32, oracle.count);
    for (expected, item) in items.iter().enumerate() {
        assert_eq!(item.index as usize, expected);
    }
}

#[tokio::test]
async fn expired_session_cannot_be_resumed() {
    let server = TestServer::spawn_with(ServerConfig {
        session_ttl: Duration::ZERO,
        ..TestServer::default_config()
    })
    .await;
    let addr = server.addr().to_string();
    let client = ClientId::random();

    // The fresh transfer itself still streams: the handler replays its own
    // copy of the sequence, the store only matters on resume.
    let mut conn = raw_handshake(&addr, fresh(&client, 3)).await;
    let (_, items) = collect_stream(&mut conn).await;
    assert_eq!(items.len(), 3);

    // With a zero TTL the session is expired by the time we resume, which
    // must be indistinguishable from a session that never existed.
    let mut conn = raw_handshake(&addr, resume(&client, 1)).await;
    match conn.recv().await.expect("read reply") {
        Some(Message::Error(message)) => assert_eq!(message, reply::SESSION_NOT_FOUND),
        other => panic!("expected error reply, got {other:?}"),
    }
}

#[tokio::test]
async fn two_drivers_in_one_process_do_not_collide() {
    let server = TestServer::spawn().await;
    let addr = server.addr().to_string();

    let a = SessionDriver::new(fast_config(addr.clone(), 5));
    let b = SessionDriver::new(fast_config(addr, 7));
    assert_ne!(a.client_id(), b.client_id());

    let (ta, tb) = tokio::join!(a.run(), b.run());
    let ta = ta.expect("driver a completes");
    let tb = tb.expect("driver b completes");
    assert_eq!(ta.values.len(), 5);
    assert_eq!(tb.values.len(), 7);
}
