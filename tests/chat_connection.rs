//! Integration tests for the chat connection's handshake and the bot
//! facade's reconnect-and-rejoin behavior, against a mock IRC-over-WebSocket
//! server built on the same `tokio-tungstenite` this crate uses as a client.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex as AsyncMutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use twitch_proto::chat::{Bot, ChatError, Config, Connection, Credentials, Handlers};

async fn send_line(ws: &mut WebSocketStream<TcpStream>, line: &str) {
  ws.send(Message::Text(line.to_string())).await.unwrap();
}

async fn recv_line(ws: &mut WebSocketStream<TcpStream>) -> String {
  match ws.next().await {
    Some(Ok(Message::Text(text))) => text,
    other => panic!("expected a text frame, got {other:?}"),
  }
}

/// Drains client lines until one starting with `NICK` arrives -- i.e. past
/// the `CAP REQ`/`PASS`/`NICK` handshake preamble, in whatever order this
/// client happens to send them.
async fn drain_until_nick(ws: &mut WebSocketStream<TcpStream>) {
  loop {
    if recv_line(ws).await.starts_with("NICK") {
      return;
    }
  }
}

#[tokio::test]
async fn successful_handshake_reports_connected_and_captures_global_user_state() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let server = tokio::spawn(async move {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    drain_until_nick(&mut ws).await;
    send_line(&mut ws, "@display-name=Bot;user-id=1 :tmi.twitch.tv GLOBALUSERSTATE").await;
    send_line(&mut ws, ":tmi.twitch.tv 001 bot :Welcome, GLHF!").await;
    tokio::time::sleep(Duration::from_millis(200)).await;
  });

  let config = Config::default().url(format!("ws://{addr}")).credentials(Credentials::new("bot", "token"));
  let connection = Connection::connect(&config, Arc::new(Handlers::default())).await.unwrap();

  assert!(connection.is_connected().await);
  let gus = connection.global_user_state().await.expect("global user state captured during handshake");
  assert_eq!(gus.display_name, "Bot");

  connection.close().await.unwrap();
  assert!(!connection.is_connected().await);

  server.await.unwrap();
}

#[tokio::test]
async fn auth_failure_notice_before_001_fails_connect() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let server = tokio::spawn(async move {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    drain_until_nick(&mut ws).await;
    send_line(&mut ws, "NOTICE * :Login authentication failed").await;
  });

  let config = Config::default().url(format!("ws://{addr}")).credentials(Credentials::new("bot", "badtoken"));
  let err = Connection::connect(&config, Arc::new(Handlers::default())).await.unwrap_err();
  assert!(matches!(err, ChatError::AuthFailed(_)));

  server.await.unwrap();
}

#[tokio::test]
async fn bot_reconnects_and_rejoins_channels_after_the_connection_drops() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let joins_seen = Arc::new(AsyncMutex::new(Vec::<String>::new()));
  let joins_for_server = joins_seen.clone();

  let server = tokio::spawn(async move {
    // First connection: handshake, observe the initial JOIN, then drop.
    {
      let (stream, _) = listener.accept().await.unwrap();
      let mut ws = accept_async(stream).await.unwrap();
      drain_until_nick(&mut ws).await;
      send_line(&mut ws, ":tmi.twitch.tv 001 bot :Welcome, GLHF!").await;
      let join = recv_line(&mut ws).await;
      joins_for_server.lock().await.push(join);
      ws.close(None).await.ok();
    }
    // Second connection: handshake again, expect the channel to be rejoined
    // automatically.
    {
      let (stream, _) = listener.accept().await.unwrap();
      let mut ws = accept_async(stream).await.unwrap();
      drain_until_nick(&mut ws).await;
      send_line(&mut ws, ":tmi.twitch.tv 001 bot :Welcome, GLHF!").await;
      let rejoin = recv_line(&mut ws).await;
      joins_for_server.lock().await.push(rejoin);
      tokio::time::sleep(Duration::from_millis(200)).await;
    }
  });

  let config = Config::default()
    .url(format!("ws://{addr}"))
    .credentials(Credentials::new("bot", "token"))
    .auto_reconnect(true)
    .reconnect_delay(Duration::from_millis(50));

  let bot = Bot::connect(config).await.unwrap();
  bot.join("testchannel").await.unwrap();

  let run_bot = bot.clone();
  let run_handle = tokio::spawn(async move { run_bot.run().await });

  tokio::time::timeout(Duration::from_secs(2), async {
    while joins_seen.lock().await.len() < 2 {
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .expect("bot should reconnect and rejoin within the timeout");

  let joins = joins_seen.lock().await.clone();
  assert_eq!(joins.len(), 2);
  assert!(joins[0].contains("#testchannel"), "initial join: {}", joins[0]);
  assert!(joins[1].contains("#testchannel"), "rejoin after reconnect: {}", joins[1]);

  run_handle.abort();
  server.await.unwrap();
}

#[tokio::test]
async fn ping_returns_cancellation_error_when_server_never_pongs() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let server = tokio::spawn(async move {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    drain_until_nick(&mut ws).await;
    send_line(&mut ws, ":tmi.twitch.tv 001 bot :Welcome, GLHF!").await;
    // Drain and ignore the PING the test is about to send -- this server
    // deliberately never answers with PONG.
    let _ = recv_line(&mut ws).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
  });

  let config = Config::default().url(format!("ws://{addr}")).credentials(Credentials::new("bot", "token"));
  let connection = Connection::connect(&config, Arc::new(Handlers::default())).await.unwrap();

  let cancel = twitch_proto::chat::CancellationToken::new();
  let timeout_cancel = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(50)).await;
    timeout_cancel.cancel();
  });

  let err = connection.ping(cancel).await.unwrap_err();
  assert!(matches!(err, ChatError::Cancelled));

  server.await.unwrap();
}
