//! Push channel against a local websocket server speaking socket.io framing.

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use todo_live::{PushClient, PushEvent, Task, TaskId};
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

async fn listen() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = Url::parse(&format!("ws://127.0.0.1:{port}/socket.io/?EIO=4&transport=websocket"))
        .unwrap();
    (listener, url)
}

async fn accept(
    listener: &TcpListener,
) -> tokio_tungstenite::WebSocketStream<tokio::net::TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn next_text(
    socket: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
) -> String {
    loop {
        match socket.next().await.unwrap().unwrap() {
            Message::Text(text) => return text.as_str().to_string(),
            _ => continue,
        }
    }
}

async fn send(socket: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>, text: &str) {
    socket.send(Message::text(text.to_string())).await.unwrap();
}

#[tokio::test]
async fn test_handshake_ping_and_events() {
    let (listener, url) = listen().await;
    let mut subscription = PushClient::with_url(url, Duration::from_millis(50)).subscribe();

    let mut socket = timeout(WAIT, accept(&listener)).await.unwrap();
    assert_eq!(timeout(WAIT, subscription.next()).await.unwrap(), Some(PushEvent::Reconnected));
    send(&mut socket, r#"0{"sid":"s1","pingInterval":25000,"pingTimeout":20000}"#).await;
    assert_eq!(timeout(WAIT, next_text(&mut socket)).await.unwrap(), "40");

    send(&mut socket, r#"40{"sid":"n1"}"#).await;
    send(&mut socket, "2").await;
    assert_eq!(timeout(WAIT, next_text(&mut socket)).await.unwrap(), "3");

    send(&mut socket, r#"42["taskCreated",{"_id":"a","title":"From the server"}]"#).await;
    send(&mut socket, r#"42["somethingElse",{}]"#).await;
    send(&mut socket, r#"42["taskDeleted",{"id":"a"}]"#).await;

    assert_eq!(
        timeout(WAIT, subscription.next()).await.unwrap(),
        Some(PushEvent::TaskCreated(Task::new("a", "From the server")))
    );
    assert_eq!(
        timeout(WAIT, subscription.next()).await.unwrap(),
        Some(PushEvent::TaskDeleted(TaskId::from("a")))
    );
}

#[tokio::test]
async fn test_reconnect_is_announced() {
    let (listener, url) = listen().await;
    let mut subscription = PushClient::with_url(url, Duration::from_millis(50)).subscribe();

    let mut socket = timeout(WAIT, accept(&listener)).await.unwrap();
    assert_eq!(timeout(WAIT, subscription.next()).await.unwrap(), Some(PushEvent::Reconnected));
    send(&mut socket, "41").await;
    drop(socket);

    let mut socket = timeout(WAIT, accept(&listener)).await.unwrap();
    assert_eq!(timeout(WAIT, subscription.next()).await.unwrap(), Some(PushEvent::Reconnected));

    send(&mut socket, r#"{"event":"taskUpdated","data":{"_id":"b","title":"after reconnect"}}"#)
        .await;
    assert_eq!(
        timeout(WAIT, subscription.next()).await.unwrap(),
        Some(PushEvent::TaskUpdated(Task::new("b", "after reconnect")))
    );
}

#[tokio::test]
async fn test_connect_after_failed_first_attempt_is_announced() {
    let (listener, url) = listen().await;
    let mut subscription = PushClient::with_url(url, Duration::from_millis(50)).subscribe();

    // Close the first connection before the websocket handshake completes.
    let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    drop(stream);
    assert!(subscription.try_next().is_none());

    let mut socket = timeout(WAIT, accept(&listener)).await.unwrap();
    assert_eq!(timeout(WAIT, subscription.next()).await.unwrap(), Some(PushEvent::Reconnected));

    send(&mut socket, r#"42["taskDeleted","z"]"#).await;
    assert_eq!(
        timeout(WAIT, subscription.next()).await.unwrap(),
        Some(PushEvent::TaskDeleted(TaskId::from("z")))
    );
}

#[tokio::test]
async fn test_dropping_subscription_closes_socket() {
    let (listener, url) = listen().await;
    let subscription = PushClient::with_url(url, Duration::from_millis(50)).subscribe();

    let mut socket = timeout(WAIT, accept(&listener)).await.unwrap();
    drop(subscription);

    // The reader is gone, so the connection ends instead of staying open.
    let end = timeout(WAIT, async {
        loop {
            match socket.next().await {
                None | Some(Err(_) | Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(end.is_ok());
}
