//! End-to-end flows: a scripted peer on one side of an in-memory duplex pipe,
//! the client plumbing on the other.

use crate::client::RequestId;
use crate::{
    collect, find_frame_boundary, ClientConfig, CompletionError, LineReader, LineWriter,
    RequestTable,
};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Answers every PING with a PONG and acknowledges everything else with +OK.
async fn echo_peer(stream: tokio::io::DuplexStream) {
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let reply: &[u8] = if line == "PING" { b"PONG\r\n" } else { b"+OK\r\n" };
        if write_half.write_all(reply).await.is_err() {
            break;
        }
    }
}

#[tokio::test]
async fn ping_pong_round_trip() {
    init_tracing();

    let (client, server) = tokio::io::duplex(1024);
    tokio::spawn(echo_peer(server));

    let config = ClientConfig::default().with_request_timeout(Duration::from_secs(2));
    let (read_half, write_half) = tokio::io::split(client);
    let mut reader = LineReader::with_config(read_half, &config);
    let mut writer = LineWriter::with_config(write_half, &config);
    let table = RequestTable::<String>::from_config(&config);

    // PONGs carry no id; they answer PINGs in order.
    let mut outstanding: VecDeque<RequestId> = VecDeque::new();
    let mut waits = Vec::new();
    for _ in 0..3 {
        let (id, response) = table.register();
        outstanding.push_back(id);
        waits.push((id, response));
        writer.send("PING").await.unwrap();
    }
    writer.flushed_within().await.unwrap();

    for _ in 0..3 {
        let line = reader.read_line().await.unwrap().unwrap();
        assert_eq!(find_frame_boundary(line.as_bytes()), line.len());
        let id = outstanding.pop_front().unwrap();
        assert!(table.resolve(id, line));
    }

    for (id, response) in waits {
        assert_eq!(table.wait(id, response).await.unwrap(), "PONG\r\n");
    }
    assert!(table.is_empty());
}

#[tokio::test(start_paused = true)]
async fn silent_peer_times_out() {
    init_tracing();

    let (client, _server) = tokio::io::duplex(1024);
    let mut writer = LineWriter::new(client);
    let table = RequestTable::<String>::new(Duration::from_millis(200));

    let (id, response) = table.register();
    writer.send("PING").await.unwrap();

    let err = table.wait(id, response).await.unwrap_err();
    assert!(matches!(err, CompletionError::Timeout { .. }));
    assert!(!table.resolve(id, "PONG\r\n".to_string()));
}

#[tokio::test]
async fn drain_lines_until_peer_closes() {
    init_tracing();

    let (client, mut server) = tokio::io::duplex(1024);
    tokio::spawn(async move {
        server
            .write_all(b"INFO {}\r\n+OK\r\nPING\r\n")
            .await
            .unwrap();
        server.shutdown().await.unwrap();
    });

    let lines: Vec<String> = collect(LineReader::new(client))
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(lines, ["INFO {}\r\n", "+OK\r\n", "PING\r\n"]);
}

#[tokio::test]
async fn connection_loss_fails_outstanding_requests() {
    init_tracing();

    let table = RequestTable::<String>::new(Duration::from_secs(5));
    let (_, first) = table.register();
    let (_, second) = table.register();

    let lost = CompletionError::transport(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset",
    ));
    assert_eq!(table.fail_all(lost), 2);

    assert!(matches!(first.await, Err(CompletionError::Transport(_))));
    assert!(matches!(second.await, Err(CompletionError::Transport(_))));
}
