//! End-to-end scenarios driven over a real `TcpStream` against a
//! server bound to an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use redlite::config::Config;
use redlite::db::Keyspace;
use redlite::dispatch::handle_connection;
use redlite::pubsub::Registry;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Spins up a dispatcher-backed listener on an ephemeral port and
/// returns its address. Each accepted connection runs the same
/// [`handle_connection`] loop the real binary spawns per client.
async fn spawn_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let db = Arc::new(Keyspace::new());
    let registry = Arc::new(Registry::new());
    let config = Arc::new(Config { addr, ..Config::default() });

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let db = db.clone();
            let registry = registry.clone();
            let config = config.clone();
            tokio::spawn(handle_connection(stream, db, registry, config));
        }
    });
    addr
}

async fn connect(addr: std::net::SocketAddr) -> TcpStream {
    TcpStream::connect(addr).await.unwrap()
}

async fn send(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).await.unwrap();
}

/// Reads exactly `expected.len()` bytes back and asserts they match.
async fn expect_reply(stream: &mut TcpStream, expected: &[u8]) {
    let mut buf = vec![0u8; expected.len()];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, expected);
}

#[tokio::test]
async fn basic_set_and_get() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*3\r\n$3\r\nSET\r\n$5\r\nhello\r\n$5\r\nworld\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$5\r\nhello\r\n").await;
    expect_reply(&mut c, b"$5\r\nworld\r\n").await;
}

#[tokio::test]
async fn ttl_expiry() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*4\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$3\r\n100\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    expect_reply(&mut c, b"$1\r\nv\r\n").await;

    tokio::time::sleep(Duration::from_millis(200)).await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    expect_reply(&mut c, b"$-1\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nTTL\r\n$1\r\nk\r\n").await;
    expect_reply(&mut c, b":-2\r\n").await;
}

#[tokio::test]
async fn wrongtype_on_list_command_against_a_string() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*3\r\n$5\r\nLPUSH\r\n$1\r\nk\r\n$1\r\nx\r\n").await;
    expect_reply(
        &mut c,
        b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n",
    )
    .await;
}

#[tokio::test]
async fn lrange_negative_indices() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*6\r\n$5\r\nRPUSH\r\n$1\r\nk\r\n$1\r\na\r\n$1\r\nb\r\n$1\r\nc\r\n$1\r\nd\r\n").await;
    expect_reply(&mut c, b":4\r\n").await;

    send(&mut c, b"*4\r\n$6\r\nLRANGE\r\n$1\r\nk\r\n$1\r\n1\r\n$2\r\n-2\r\n").await;
    expect_reply(&mut c, b"*2\r\n$1\r\nb\r\n$1\r\nc\r\n").await;
}

#[tokio::test]
async fn multi_exec_runs_queued_commands_atomically() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$5\r\nMULTI\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\n1\r\n").await;
    expect_reply(&mut c, b"+QUEUED\r\n").await;

    send(&mut c, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\n2\r\n").await;
    expect_reply(&mut c, b"+QUEUED\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    expect_reply(&mut c, b"+QUEUED\r\n").await;

    send(&mut c, b"*1\r\n$4\r\nEXEC\r\n").await;
    expect_reply(&mut c, b"*3\r\n+OK\r\n+OK\r\n$1\r\n2\r\n").await;
}

#[tokio::test]
async fn exec_without_multi_is_an_error() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$4\r\nEXEC\r\n").await;
    expect_reply(&mut c, b"-ERR EXEC without MULTI\r\n").await;
}

#[tokio::test]
async fn discard_without_multi_is_an_error() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$7\r\nDISCARD\r\n").await;
    expect_reply(&mut c, b"-ERR DISCARD without MULTI\r\n").await;
}

#[tokio::test]
async fn discard_drops_the_queue() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$5\r\nMULTI\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\n1\r\n").await;
    expect_reply(&mut c, b"+QUEUED\r\n").await;

    send(&mut c, b"*1\r\n$7\r\nDISCARD\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    expect_reply(&mut c, b"$-1\r\n").await;
}

#[tokio::test]
async fn nested_multi_is_rejected() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$5\r\nMULTI\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    send(&mut c, b"*1\r\n$5\r\nMULTI\r\n").await;
    expect_reply(&mut c, b"-ERR MULTI calls cannot be nested\r\n").await;
}

#[tokio::test]
async fn pubsub_fan_out_and_dead_subscriber_cleanup() {
    let addr = spawn_server().await;
    let mut sub1 = connect(addr).await;
    let mut sub2 = connect(addr).await;
    let mut publisher = connect(addr).await;

    send(&mut sub1, b"*2\r\n$9\r\nSUBSCRIBE\r\n$2\r\nch\r\n").await;
    expect_reply(&mut sub1, b"*3\r\n$9\r\nsubscribe\r\n$2\r\nch\r\n:1\r\n").await;

    send(&mut sub2, b"*2\r\n$9\r\nSUBSCRIBE\r\n$2\r\nch\r\n").await;
    expect_reply(&mut sub2, b"*3\r\n$9\r\nsubscribe\r\n$2\r\nch\r\n:1\r\n").await;

    send(&mut publisher, b"*3\r\n$7\r\nPUBLISH\r\n$2\r\nch\r\n$2\r\nhi\r\n").await;
    expect_reply(&mut publisher, b":2\r\n").await;

    let expected: &[u8] = b"*3\r\n$7\r\nmessage\r\n$2\r\nch\r\n$2\r\nhi\r\n";
    expect_reply(&mut sub1, expected).await;
    expect_reply(&mut sub2, expected).await;

    drop(sub1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    send(&mut publisher, b"*3\r\n$7\r\nPUBLISH\r\n$2\r\nch\r\n$2\r\nhi\r\n").await;
    expect_reply(&mut publisher, b":1\r\n").await;
}

#[tokio::test]
async fn unsubscribe_removes_the_channel_once_empty() {
    let addr = spawn_server().await;
    let mut sub = connect(addr).await;
    let mut publisher = connect(addr).await;

    send(&mut sub, b"*2\r\n$9\r\nSUBSCRIBE\r\n$2\r\nch\r\n").await;
    expect_reply(&mut sub, b"*3\r\n$9\r\nsubscribe\r\n$2\r\nch\r\n:1\r\n").await;

    send(&mut sub, b"*2\r\n$11\r\nUNSUBSCRIBE\r\n$2\r\nch\r\n").await;
    expect_reply(&mut sub, b"*3\r\n$11\r\nunsubscribe\r\n$2\r\nch\r\n:0\r\n").await;

    send(&mut publisher, b"*3\r\n$7\r\nPUBLISH\r\n$2\r\nch\r\n$2\r\nhi\r\n").await;
    expect_reply(&mut publisher, b":0\r\n").await;
}

#[tokio::test]
async fn publish_to_channel_with_no_subscribers_returns_zero() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*3\r\n$7\r\nPUBLISH\r\n$5\r\nempty\r\n$2\r\nhi\r\n").await;
    expect_reply(&mut c, b":0\r\n").await;
}

#[tokio::test]
async fn subscriber_mode_rejects_ordinary_commands() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*2\r\n$9\r\nSUBSCRIBE\r\n$2\r\nch\r\n").await;
    expect_reply(&mut c, b"*3\r\n$9\r\nsubscribe\r\n$2\r\nch\r\n:1\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    let mut buf = vec![0u8; 4096];
    let n = c.read(&mut buf).await.unwrap();
    assert!(buf[..n].starts_with(b"-ERR"));
}

#[tokio::test]
async fn unknown_command_is_an_error() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$7\r\nBOGUSCM\r\n").await;
    expect_reply(&mut c, b"-ERR unknown command 'boguscm'\r\n").await;
}

#[tokio::test]
async fn quit_closes_the_connection() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"*1\r\n$4\r\nQUIT\r\n").await;
    expect_reply(&mut c, b"+OK\r\n").await;

    let mut buf = [0u8; 8];
    let n = c.read(&mut buf).await.unwrap();
    assert_eq!(n, 0, "server should close the socket after QUIT");
}

#[tokio::test]
async fn wrong_shaped_frame_gets_an_error_but_keeps_the_connection_open() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    // A well-formed but empty array is not a command, just malformed
    // shape — unlike truly unparseable RESP, this must not disconnect.
    send(&mut c, b"*0\r\n").await;
    expect_reply(&mut c, b"-ERR syntax error\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nSET\r\n:5\r\n").await;
    expect_reply(&mut c, b"-ERR syntax error\r\n").await;

    send(&mut c, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    expect_reply(&mut c, b"$-1\r\n").await;
}

#[tokio::test]
async fn protocol_error_closes_the_connection() {
    let addr = spawn_server().await;
    let mut c = connect(addr).await;

    send(&mut c, b"^garbage\r\n").await;
    let mut buf = Vec::new();
    let n = c.read_to_end(&mut buf).await.unwrap();
    assert!(n > 0);
    assert!(buf.starts_with(b"-ERR syntax error"));
}
