//! Event channel and command dispatch against an in-process fake player.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::{
    accept_async, accept_hdr_async,
    tungstenite::handshake::server::{ErrorResponse, Request, Response},
    tungstenite::Message,
    WebSocketStream,
};

use ytmd_connect::{
    config::Config,
    events::Event,
    remote::{Client, Connection, Error},
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn bind() -> (TcpListener, Config) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = Config::new("widget", "Widget", "1.0.0")
        .unwrap()
        .with_base_url(format!("http://{addr}/api/v1").parse().unwrap());
    (listener, config)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = tokio::time::timeout(TIMEOUT, listener.accept())
        .await
        .expect("no connection within timeout")
        .unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_event(events: &mut UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(TIMEOUT, events.recv())
        .await
        .expect("no event within timeout")
        .expect("event channel closed")
}

async fn next_frame(server: &mut WebSocketStream<TcpStream>) -> serde_json::Value {
    let message = tokio::time::timeout(TIMEOUT, server.next())
        .await
        .expect("no frame within timeout")
        .expect("connection closed")
        .unwrap();
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

async fn assert_no_frame(server: &mut WebSocketStream<TcpStream>) {
    assert!(
        tokio::time::timeout(Duration::from_millis(200), server.next())
            .await
            .is_err(),
        "unexpected extra frame"
    );
}

/// Connects the client and strips the connect-time traffic: the `Connected`
/// event on the client side and the baseline state fetch on the server side.
async fn connect(
    client: &mut Client,
    events: &mut UnboundedReceiver<Event>,
    listener: &TcpListener,
) -> WebSocketStream<TcpStream> {
    let ((), mut server) = tokio::join!(
        async {
            client.connect().await.unwrap();
        },
        accept(listener)
    );

    assert!(matches!(next_event(events).await, Event::Connected));
    let baseline = next_frame(&mut server).await;
    assert_eq!(baseline["command"], "player-get-state");

    server
}

#[tokio::test]
async fn connect_without_token_is_a_contract_violation() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();

    assert!(matches!(client.connect().await, Err(Error::NoToken)));
    assert_eq!(client.connection(), Connection::Disconnected);
    assert!(events.try_recv().is_err());

    // The violation is caught before any network activity.
    assert!(
        tokio::time::timeout(Duration::from_millis(200), listener.accept())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn failed_dial_logs_and_stays_disconnected() {
    init_logger();
    let (listener, config) = bind().await;
    // Free the port so the dial is refused.
    drop(listener);

    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());

    // A transport failure is not an error; it only shows up in the log
    // stream.
    client.connect().await.unwrap();
    assert_eq!(client.connection(), Connection::Disconnected);

    match next_event(&mut events).await {
        Event::Log(message) => assert!(message.contains("connection failed")),
        other => panic!("expected a log event, got {other:?}"),
    }
}

#[tokio::test]
async fn connect_presents_token_and_fetches_baseline_once() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());

    let (uri_tx, uri_rx) = tokio::sync::oneshot::channel();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let _ = uri_tx.send(request.uri().to_string());
            Ok(response)
        };
        accept_hdr_async(stream, callback).await.unwrap()
    });

    client.connect().await.unwrap();
    let mut server = server.await.unwrap();

    let uri = uri_rx.await.unwrap();
    assert!(uri.contains("/api/v1/realtime"));
    assert!(uri.contains("token=Y"));

    assert!(matches!(next_event(&mut events).await, Event::Connected));
    assert!(client.is_connected());

    // Exactly one baseline fetch, before anything else.
    let baseline = next_frame(&mut server).await;
    assert_eq!(baseline["event"], "command");
    assert_eq!(baseline["command"], "player-get-state");
    assert_no_frame(&mut server).await;
}

#[tokio::test]
async fn send_produces_a_single_frame_without_data_key() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());
    let mut server = connect(&mut client, &mut events, &listener).await;

    client.send("next", None);

    let frame = next_frame(&mut server).await;
    assert_eq!(frame["event"], "command");
    assert_eq!(frame["command"], "next");
    assert!(frame.as_object().unwrap().get("data").is_none());
    assert_no_frame(&mut server).await;
}

#[tokio::test]
async fn send_with_payload_carries_data() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());
    let mut server = connect(&mut client, &mut events, &listener).await;

    client.send("player-set-volume", Some(serde_json::json!(50)));

    let frame = next_frame(&mut server).await;
    assert_eq!(frame["command"], "player-set-volume");
    assert_eq!(frame["data"], 50);
}

#[tokio::test]
async fn send_while_disconnected_logs_and_stays_off_the_wire() {
    init_logger();
    let (listener, config) = bind().await;
    let (client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());

    client.send("next", None);

    match next_event(&mut events).await {
        Event::Log(message) => assert_eq!(message, "cannot send command: not connected"),
        other => panic!("expected a log event, got {other:?}"),
    }
    assert!(events.try_recv().is_err());

    // The listener never saw a connection attempt.
    assert!(
        tokio::time::timeout(Duration::from_millis(200), listener.accept())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn state_update_emits_exactly_one_state_changed() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());
    let mut server = connect(&mut client, &mut events, &listener).await;

    let frame = serde_json::json!({
        "event": "state-update",
        "data": {
            "player": {"trackState": 1, "volume": 80},
            "video": {"title": "First", "author": "Artist", "id": "abc123"},
        },
    });
    server.send(Message::text(frame.to_string())).await.unwrap();

    match next_event(&mut events).await {
        Event::StateChanged(state) => {
            assert_eq!(state.player.volume, 80);
            assert_eq!(state.video.unwrap().title, "First");
        }
        other => panic!("expected a state change, got {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_channel_stays_open() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());
    let mut server = connect(&mut client, &mut events, &listener).await;

    server.send(Message::text("not json")).await.unwrap();

    match next_event(&mut events).await {
        Event::Log(message) => assert!(message.contains("error parsing")),
        other => panic!("expected a log event, got {other:?}"),
    }
    assert!(client.is_connected());

    // The channel survives and still delivers the next good frame.
    let frame = serde_json::json!({"event": "state-update", "data": {}});
    server.send(Message::text(frame.to_string())).await.unwrap();
    assert!(matches!(next_event(&mut events).await, Event::StateChanged(_)));
}

#[tokio::test]
async fn server_drop_disconnects_without_reconnecting() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());
    let mut server = connect(&mut client, &mut events, &listener).await;

    server.close(None).await.unwrap();

    // A close is reported as a log message followed by the disconnect.
    assert!(matches!(next_event(&mut events).await, Event::Log(_)));
    assert!(matches!(next_event(&mut events).await, Event::Disconnected));
    assert_eq!(client.connection(), Connection::Disconnected);

    // No self-healing: the listener sees no new dial.
    assert!(
        tokio::time::timeout(Duration::from_millis(200), listener.accept())
            .await
            .is_err()
    );

    // And a send in this state is the usual observable no-op.
    client.send("next", None);
    assert!(matches!(next_event(&mut events).await, Event::Log(_)));
}

#[tokio::test]
async fn reconnect_after_drop_never_leaks_the_old_channel() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());

    let mut server = connect(&mut client, &mut events, &listener).await;
    server.close(None).await.unwrap();
    assert!(matches!(next_event(&mut events).await, Event::Log(_)));
    assert!(matches!(next_event(&mut events).await, Event::Disconnected));

    // Second connect gets a fresh channel and a fresh baseline fetch.
    let mut server = connect(&mut client, &mut events, &listener).await;
    assert!(client.is_connected());

    client.send("next", None);
    let frame = next_frame(&mut server).await;
    assert_eq!(frame["command"], "next");
}

#[tokio::test]
async fn stop_is_graceful_and_idempotent() {
    init_logger();
    let (listener, config) = bind().await;
    let (mut client, mut events) = Client::new(config).unwrap();
    client.set_token("Y".parse().unwrap());
    let mut server = connect(&mut client, &mut events, &listener).await;

    client.stop().await;
    client.stop().await;

    assert_eq!(client.connection(), Connection::Disconnected);
    assert!(matches!(next_event(&mut events).await, Event::Disconnected));

    // The server saw a proper close, not a vanished peer.
    let close = tokio::time::timeout(TIMEOUT, server.next())
        .await
        .expect("no close within timeout")
        .expect("connection closed")
        .unwrap();
    assert!(matches!(close, Message::Close(_)));
}
