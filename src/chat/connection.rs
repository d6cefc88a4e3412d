//! The stateful chat connection: WebSocket transport, handshake and the
//! background reader/keepalive tasks.

use super::config::Config;
use super::error::{ChatError, Result};
use super::handlers::Handlers;
use super::handlers::RaidEvent;
use crate::irc::Frame;
use crate::msg::{Event, FromFrame, GlobalUserState, Notice, UserNotice};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex, Notify, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

const PING_INTERVAL: Duration = Duration::from_secs(4 * 60);
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffers incoming websocket frames so that a single text message
/// carrying multiple `\r\n`-separated IRC lines yields them one at a
/// time, in order, to both the handshake and the background reader.
struct FrameReader {
  stream: futures_util::stream::SplitStream<WsStream>,
  buf: VecDeque<Frame>,
}

impl FrameReader {
  fn new(stream: futures_util::stream::SplitStream<WsStream>) -> Self {
    Self { stream, buf: VecDeque::new() }
  }

  async fn next_frame(&mut self) -> Result<Option<Frame>> {
    loop {
      if let Some(frame) = self.buf.pop_front() {
        return Ok(Some(frame));
      }
      match self.stream.next().await {
        None => return Ok(None),
        Some(Err(err)) => return Err(ChatError::WebSocket(err)),
        Some(Ok(Message::Text(text))) => {
          for line in text.split("\r\n") {
            if !line.is_empty() {
              self.buf.push_back(Frame::parse(line));
            }
          }
        }
        Some(Ok(Message::Close(_))) => return Ok(None),
        Some(Ok(_)) => continue,
      }
    }
  }
}

#[derive(Default)]
struct State {
  connected: bool,
  channels: HashSet<String>,
  global_user_state: Option<GlobalUserState>,
}

struct Inner {
  write: Mutex<WsSink>,
  state: RwLock<State>,
  handlers: Arc<Handlers>,
  pong_tx: mpsc::Sender<()>,
  /// The single-slot pong signal. Shared (rather than owned by the
  /// keepalive task alone) so [`Connection::ping`] can be driven manually
  /// too -- both paths serialize on this lock, so only one `PING` is ever
  /// in flight at a time.
  pong_rx: Mutex<mpsc::Receiver<()>>,
  closed: Notify,
  closed_flag: AtomicBool,
}

/// A single, already-authenticated chat session.
///
/// One [`Connection`] wraps exactly one underlying WebSocket: once it is
/// closed (by the server, by a transport error, or by a `RECONNECT`
/// command), it stays closed. Reconnecting means constructing a new
/// [`Connection`] -- see [`crate::chat::Bot`] for a facade that does this
/// automatically.
#[derive(Clone)]
pub struct Connection {
  inner: Arc<Inner>,
}

impl Connection {
  /// Opens a WebSocket to the Twitch chat endpoint, performs the
  /// capability/auth handshake, and spawns the background reader and
  /// keepalive tasks.
  ///
  /// `handlers` is shared rather than owned so that [`crate::chat::Bot`]
  /// can keep one registry alive across reconnects; standalone callers
  /// that don't need that can just pass a fresh `Arc::new(Handlers::default())`.
  pub async fn connect(config: &Config, handlers: Arc<Handlers>) -> Result<Connection> {
    let credentials = config.credentials.as_ref().ok_or(ChatError::NotConnected)?;

    let (ws, _response) = tokio::time::timeout(config.connect_timeout, connect_async(config.url.as_str()))
      .await
      .map_err(|_| ChatError::HandshakeTimeout)??;

    let (sink, stream) = ws.split();
    let mut reader = FrameReader::new(stream);
    let mut sink = sink;

    send_raw(&mut sink, &format!("CAP REQ :{}", config.capabilities.join(" "))).await?;

    let token = if credentials.token.starts_with("oauth:") {
      credentials.token.clone()
    } else {
      format!("oauth:{}", credentials.token)
    };
    send_raw(&mut sink, &format!("PASS {token}")).await?;
    send_raw(&mut sink, &format!("NICK {}", credentials.nick.to_lowercase())).await?;

    let global_user_state = handshake(&mut reader, config.connect_timeout).await?;

    let (pong_tx, pong_rx) = mpsc::channel(1);

    let inner = Arc::new(Inner {
      write: Mutex::new(sink),
      state: RwLock::new(State { connected: true, channels: HashSet::new(), global_user_state }),
      handlers,
      pong_tx,
      pong_rx: Mutex::new(pong_rx),
      closed: Notify::new(),
      closed_flag: AtomicBool::new(false),
    });

    let connection = Connection { inner };
    connection.inner.handlers.fire_connect(());

    tokio::spawn(connection.clone().reader_task(reader));
    tokio::spawn(connection.clone().keepalive_task());

    Ok(connection)
  }

  /// Registers callbacks. See [`Handlers`].
  pub fn handlers(&self) -> &Handlers {
    &self.inner.handlers
  }

  pub async fn is_connected(&self) -> bool {
    self.inner.state.read().await.connected
  }

  pub async fn joined_channels(&self) -> Vec<String> {
    self.inner.state.read().await.channels.iter().cloned().collect()
  }

  pub async fn global_user_state(&self) -> Option<GlobalUserState> {
    self.inner.state.read().await.global_user_state.clone()
  }

  /// Resolves once this connection has closed, for any reason.
  pub async fn closed(&self) {
    if self.inner.closed_flag.load(Ordering::SeqCst) {
      return;
    }
    self.inner.closed.notified().await;
  }

  pub async fn join(&self, channel: &str) -> Result<()> {
    let channel = crate::irc::parse_channel(channel);
    self.send(&format!("JOIN #{channel}")).await?;
    self.inner.state.write().await.channels.insert(channel);
    Ok(())
  }

  pub async fn part(&self, channel: &str) -> Result<()> {
    let channel = crate::irc::parse_channel(channel);
    self.send(&format!("PART #{channel}")).await?;
    self.inner.state.write().await.channels.remove(&channel);
    Ok(())
  }

  pub async fn say(&self, channel: &str, text: &str) -> Result<()> {
    let channel = crate::irc::parse_channel(channel);
    self.send(&format!("PRIVMSG #{channel} :{text}")).await
  }

  /// Sends `text` as a threaded reply to `parent_msg_id`, using the
  /// `reply-parent-msg-id` client tag Twitch's own clients attach to
  /// threaded replies.
  pub async fn reply(&self, channel: &str, parent_msg_id: &str, text: &str) -> Result<()> {
    let channel = crate::irc::parse_channel(channel);
    self.send(&format!("@reply-parent-msg-id={parent_msg_id} PRIVMSG #{channel} :{text}")).await
  }

  /// Sends a whisper to `user` via the `/w` chat command. Whispers ride
  /// over the `PRIVMSG #jtv` pseudo-channel rather than a channel the bot
  /// has joined.
  pub async fn whisper(&self, user: &str, text: &str) -> Result<()> {
    self.send(&format!("PRIVMSG #jtv :/w {user} {text}")).await
  }

  /// Idempotent: closing an already-closed connection is a no-op.
  pub async fn close(&self) -> Result<()> {
    if self.inner.closed_flag.load(Ordering::SeqCst) {
      return Ok(());
    }
    let mut write = self.inner.write.lock().await;
    write.close().await.map_err(ChatError::WebSocket)?;
    drop(write);
    self.mark_closed().await;
    Ok(())
  }

  async fn send(&self, line: &str) -> Result<()> {
    if !self.is_connected().await {
      return Err(ChatError::NotConnected);
    }
    let mut write = self.inner.write.lock().await;
    send_raw(&mut write, line).await
  }

  async fn mark_closed(&self) {
    self.inner.state.write().await.connected = false;
    if !self.inner.closed_flag.swap(true, Ordering::SeqCst) {
      self.inner.handlers.fire_disconnect(());
      self.inner.closed.notify_waiters();
    }
  }

  async fn reader_task(self, mut reader: FrameReader) {
    loop {
      match reader.next_frame().await {
        Ok(Some(frame)) => self.dispatch(frame).await,
        Ok(None) => break,
        Err(err) => {
          self.inner.handlers.fire_error(Arc::new(err));
          break;
        }
      }
    }
    self.mark_closed().await;
  }

  async fn dispatch(&self, frame: Frame) {
    self.inner.handlers.fire_raw(frame.clone());

    match Event::from_frame(&frame) {
      Event::ChatMessage(msg) => {
        if msg.bits > 0 {
          self.inner.handlers.fire_cheer(msg.clone());
        }
        self.inner.handlers.fire_message(msg);
      }
      Event::UserNotice(notice) => {
        self.dispatch_user_notice(&notice);
        self.inner.handlers.fire_user_notice(notice);
      }
      Event::RoomState(state) => self.inner.handlers.fire_room_state(state),
      Event::Notice(notice) => self.inner.handlers.fire_notice(notice),
      Event::ClearChat(clear) => self.inner.handlers.fire_clear_chat(clear),
      Event::ClearMessage(clear) => self.inner.handlers.fire_clear_message(clear),
      Event::Whisper(whisper) => self.inner.handlers.fire_whisper(whisper),
      Event::GlobalUserState(gus) => {
        self.inner.state.write().await.global_user_state = Some(gus.clone());
        self.inner.handlers.fire_global_user_state(gus);
      }
      Event::UserState(state) => self.inner.handlers.fire_user_state(state),
      Event::Ping { payload } => {
        let reply = match payload {
          Some(payload) => format!("PONG :{payload}"),
          None => "PONG".to_string(),
        };
        let mut write = self.inner.write.lock().await;
        let _ = send_raw(&mut write, &reply).await;
      }
      Event::Pong { .. } => {
        let _ = self.inner.pong_tx.try_send(());
      }
      Event::Reconnect => {
        self.inner.handlers.fire_reconnect(());
        self.mark_closed().await;
      }
      Event::Join { .. } | Event::Part { .. } | Event::Unknown(_) => {}
    }
  }

  /// Further demultiplexes a [`UserNotice`] by its `msg-id` into the more
  /// specific `on_sub`/`on_resub`/`on_subgift`/`on_raid` slots, in addition
  /// to the catch-all `on_user_notice` every `USERNOTICE` still fires.
  fn dispatch_user_notice(&self, notice: &UserNotice) {
    if notice.is_sub() {
      self.inner.handlers.fire_sub(notice.clone());
    } else if notice.is_resub() {
      self.inner.handlers.fire_resub(notice.clone());
    } else if notice.is_subgift() {
      self.inner.handlers.fire_subgift(notice.clone());
    } else if notice.is_raid() {
      let from_channel = notice.msg_params.get("login").cloned().unwrap_or_default();
      let viewer_count = notice.msg_params.get("viewerCount").and_then(|v| v.parse().ok()).unwrap_or(0);
      self.inner.handlers.fire_raid(RaidEvent { notice: notice.clone(), from_channel, viewer_count });
    }
  }

  /// Sends `PING :tmi.twitch.tv` and waits for the matching `PONG`, or for
  /// `cancel` to fire first. Drains any stale, previously-unclaimed pong
  /// signal before sending, so a `PONG` the server already sent for a
  /// different reason doesn't short-circuit this one.
  pub async fn ping(&self, cancel: CancellationToken) -> Result<()> {
    let mut pong_rx = self.inner.pong_rx.lock().await;
    while pong_rx.try_recv().is_ok() {}

    {
      let mut write = self.inner.write.lock().await;
      send_raw(&mut write, "PING :tmi.twitch.tv").await?;
    }

    tokio::select! {
      _ = pong_rx.recv() => Ok(()),
      _ = cancel.cancelled() => Err(ChatError::Cancelled),
    }
  }

  async fn keepalive_task(self) {
    loop {
      tokio::time::sleep(PING_INTERVAL).await;
      if !self.is_connected().await {
        return;
      }

      let cancel = CancellationToken::new();
      let timeout_cancel = cancel.clone();
      let timeout_handle = tokio::spawn(async move {
        tokio::time::sleep(PONG_TIMEOUT).await;
        timeout_cancel.cancel();
      });

      let result = self.ping(cancel).await;
      timeout_handle.abort();

      if result.is_err() {
        self.mark_closed().await;
        return;
      }
    }
  }
}

async fn send_raw(sink: &mut WsSink, line: &str) -> Result<()> {
  sink.send(Message::Text(line.to_string())).await.map_err(ChatError::WebSocket)
}

/// Drives the synchronous part of the handshake: reads frames until the
/// `001` welcome has arrived (capturing `GLOBALUSERSTATE` along the way,
/// in whichever order the server sends them), an auth-failure `NOTICE`
/// shows up, or the timeout elapses.
async fn handshake(reader: &mut FrameReader, timeout: Duration) -> Result<Option<GlobalUserState>> {
  tokio::time::timeout(timeout, async {
    let mut global_user_state = None;

    loop {
      let frame = reader.next_frame().await?.ok_or(ChatError::ConnectionClosed)?;
      match frame.command.as_str() {
        "001" => return Ok(global_user_state),
        "NOTICE" => {
          if let Some(notice) = Notice::from_frame(&frame) {
            if notice.is_auth_failure() {
              return Err(ChatError::AuthFailed(notice.message));
            }
          }
        }
        "GLOBALUSERSTATE" => {
          global_user_state = GlobalUserState::from_frame(&frame);
        }
        _ => {}
      }
    }
  })
  .await
  .map_err(|_| ChatError::HandshakeTimeout)?
}
