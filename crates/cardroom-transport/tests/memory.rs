//! Integration tests for the in-memory connection pair.

use cardroom_transport::{Connection, MemoryConnection, TransportError};

#[tokio::test]
async fn test_pair_delivers_messages_in_order() {
    let (a, b) = MemoryConnection::pair();

    a.send(b"one").await.unwrap();
    a.send(b"two").await.unwrap();

    assert_eq!(b.recv().await.unwrap(), Some(b"one".to_vec()));
    assert_eq!(b.recv().await.unwrap(), Some(b"two".to_vec()));
}

#[tokio::test]
async fn test_pair_is_duplex() {
    let (a, b) = MemoryConnection::pair();

    a.send(b"ping").await.unwrap();
    b.send(b"pong").await.unwrap();

    assert_eq!(b.recv().await.unwrap(), Some(b"ping".to_vec()));
    assert_eq!(a.recv().await.unwrap(), Some(b"pong".to_vec()));
}

#[tokio::test]
async fn test_pair_ids_are_distinct() {
    let (a, b) = MemoryConnection::pair();
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_close_signals_end_of_stream_to_peer() {
    let (a, b) = MemoryConnection::pair();

    a.send(b"last words").await.unwrap();
    a.close().await.unwrap();

    // Already-sent data is still drained before end-of-stream.
    assert_eq!(b.recv().await.unwrap(), Some(b"last words".to_vec()));
    assert_eq!(b.recv().await.unwrap(), None);
}

#[tokio::test]
async fn test_send_after_close_fails() {
    let (a, _b) = MemoryConnection::pair();
    a.close().await.unwrap();

    let result = a.send(b"too late").await;
    assert!(matches!(result, Err(TransportError::Closed(_))));
}

#[tokio::test]
async fn test_send_to_dropped_peer_fails() {
    let (a, b) = MemoryConnection::pair();
    drop(b);

    let result = a.send(b"anyone?").await;
    assert!(matches!(result, Err(TransportError::PeerClosed(_))));
}

#[tokio::test]
async fn test_recv_after_peer_dropped_returns_none() {
    let (a, b) = MemoryConnection::pair();
    drop(a);
    assert_eq!(b.recv().await.unwrap(), None);
}
