//! High-level bot facade: owns the reconnect-with-backoff policy and
//! channel rejoin-on-reconnect behavior on top of a bare [`Connection`].

use super::config::Config;
use super::connection::Connection;
use super::error::Result;
use super::handlers::Handlers;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Wraps a [`Connection`], transparently reconnecting (and rejoining
/// every previously-joined channel) when the underlying WebSocket drops.
///
/// Handlers are registered once, on the `Bot`, and survive reconnects --
/// each new [`Connection`] is handed the same [`Handlers`] registry.
pub struct Bot {
  config: Config,
  handlers: Arc<Handlers>,
  connection: RwLock<Connection>,
  channels: RwLock<Vec<String>>,
}

impl Bot {
  /// Connects and performs the handshake. Does not spawn the
  /// reconnect-supervisor task -- call [`Bot::run`] for that, or drive
  /// reconnection manually with [`Bot::connection`] and
  /// [`Connection::closed`].
  pub async fn connect(config: Config) -> Result<Arc<Bot>> {
    let handlers = Arc::new(Handlers::default());
    let connection = Connection::connect(&config, handlers.clone()).await?;

    Ok(Arc::new(Bot {
      config,
      handlers,
      connection: RwLock::new(connection),
      channels: RwLock::new(Vec::new()),
    }))
  }

  pub fn handlers(&self) -> &Handlers {
    &self.handlers
  }

  pub async fn connection(&self) -> Connection {
    self.connection.read().await.clone()
  }

  pub async fn join(&self, channel: &str) -> Result<()> {
    let channel = crate::irc::parse_channel(channel);
    self.connection.read().await.join(&channel).await?;
    let mut channels = self.channels.write().await;
    if !channels.iter().any(|c| c == &channel) {
      channels.push(channel);
    }
    Ok(())
  }

  pub async fn part(&self, channel: &str) -> Result<()> {
    let channel = crate::irc::parse_channel(channel);
    self.connection.read().await.part(&channel).await?;
    self.channels.write().await.retain(|c| c != &channel);
    Ok(())
  }

  pub async fn say(&self, channel: &str, text: &str) -> Result<()> {
    self.connection.read().await.say(channel, text).await
  }

  pub async fn reply(&self, channel: &str, parent_msg_id: &str, text: &str) -> Result<()> {
    self.connection.read().await.reply(channel, parent_msg_id, text).await
  }

  pub async fn whisper(&self, user: &str, text: &str) -> Result<()> {
    self.connection.read().await.whisper(user, text).await
  }

  pub async fn is_connected(&self) -> bool {
    self.connection.read().await.is_connected().await
  }

  pub async fn get_joined_channels(&self) -> Vec<String> {
    self.channels.read().await.clone()
  }

  /// Runs the reconnect-supervisor loop forever: waits for the current
  /// connection to close, then -- if `config.auto_reconnect` is set --
  /// reconnects with a fixed delay and rejoins every channel that was
  /// joined before the drop. Returns only if reconnection is disabled
  /// and the connection closes, or a reconnect attempt fails.
  pub async fn run(self: &Arc<Self>) -> Result<()> {
    loop {
      let connection = self.connection.read().await.clone();
      connection.closed().await;

      if !self.config.auto_reconnect {
        return Ok(());
      }

      tokio::time::sleep(self.config.reconnect_delay).await;

      let new_connection = Connection::connect(&self.config, self.handlers.clone()).await?;

      let channels = self.channels.read().await.clone();
      for channel in &channels {
        new_connection.join(channel).await?;
      }

      *self.connection.write().await = new_connection;
    }
  }
}
