//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a real `tokio-tungstenite` client to
//! verify that frames actually cross the network in both directions.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use warboard_transport::WsListener;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn connect_client(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client should connect");
    ws
}

#[tokio::test]
async fn test_accept_and_receive_text_frame() {
    let mut listener = WsListener::bind("127.0.0.1:0").await.expect("should bind");
    let addr = listener.local_addr().unwrap().to_string();

    let accept = tokio::spawn(async move { listener.accept().await.expect("should accept") });
    let mut client = connect_client(&addr).await;
    let conn = accept.await.unwrap();
    let (_writer, mut reader) = conn.into_split();

    client
        .send(Message::Text(r#"{"type":"session:join"}"#.into()))
        .await
        .unwrap();

    let frame = reader.recv().await.unwrap().expect("a frame");
    assert_eq!(frame, br#"{"type":"session:join"}"#);
}

#[tokio::test]
async fn test_send_reaches_client_as_text() {
    let mut listener = WsListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let accept = tokio::spawn(async move { listener.accept().await.unwrap() });
    let mut client = connect_client(&addr).await;
    let conn = accept.await.unwrap();
    let (mut writer, _reader) = conn.into_split();

    writer.send(b"{\"type\":\"error\"}".to_vec()).await.unwrap();

    match client.next().await.unwrap().unwrap() {
        Message::Text(text) => assert_eq!(text.as_str(), "{\"type\":\"error\"}"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_binary_frames_are_received_too() {
    let mut listener = WsListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let accept = tokio::spawn(async move { listener.accept().await.unwrap() });
    let mut client = connect_client(&addr).await;
    let conn = accept.await.unwrap();
    let (_writer, mut reader) = conn.into_split();

    client
        .send(Message::Binary(vec![1, 2, 3].into()))
        .await
        .unwrap();

    assert_eq!(reader.recv().await.unwrap(), Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn test_client_close_yields_none() {
    let mut listener = WsListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let accept = tokio::spawn(async move { listener.accept().await.unwrap() });
    let mut client = connect_client(&addr).await;
    let conn = accept.await.unwrap();
    let (_writer, mut reader) = conn.into_split();

    client.close(None).await.unwrap();

    assert_eq!(reader.recv().await.unwrap(), None);
}

#[tokio::test]
async fn test_ping_frames_are_skipped() {
    let mut listener = WsListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let accept = tokio::spawn(async move { listener.accept().await.unwrap() });
    let mut client = connect_client(&addr).await;
    let conn = accept.await.unwrap();
    let (_writer, mut reader) = conn.into_split();

    client.send(Message::Ping(vec![9].into())).await.unwrap();
    client.send(Message::Text("after-ping".into())).await.unwrap();

    // recv never surfaces the ping; the next data frame comes through.
    assert_eq!(reader.recv().await.unwrap(), Some(b"after-ping".to_vec()));
}
