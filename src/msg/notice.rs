//! `NOTICE` -- a general, one-off message from the server.

use super::FromFrame;
use crate::irc::Frame;

/// A general notice from the server, e.g. a moderation confirmation or an
/// authentication failure during the handshake.
#[derive(Clone, Debug)]
pub struct Notice {
  pub channel: Option<String>,
  /// The `msg-id` tag, identifying the kind of notice (e.g. `msg_banned`).
  pub msg_id: Option<String>,
  pub message: String,
}

impl FromFrame for Notice {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "NOTICE" {
      return None;
    }

    Some(Notice {
      channel: frame.channel(),
      msg_id: frame.tag("msg-id").map(str::to_string),
      message: frame.trailing.clone().unwrap_or_default(),
    })
  }
}

impl Notice {
  /// Whether this notice indicates that authentication failed during the
  /// handshake. See [`crate::chat`] for where this is consulted.
  pub fn is_auth_failure(&self) -> bool {
    self.message.contains("Login authentication failed")
      || self.message.contains("Improperly formatted auth")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_channel_notice() {
    let frame = Frame::parse("@msg-id=msg_banned :tmi.twitch.tv NOTICE #chan :You are banned.");
    let notice = Notice::from_frame(&frame).unwrap();
    assert_eq!(notice.channel.as_deref(), Some("chan"));
    assert_eq!(notice.msg_id.as_deref(), Some("msg_banned"));
  }

  #[test]
  fn recognizes_auth_failure() {
    let frame = Frame::parse("NOTICE * :Login authentication failed");
    let notice = Notice::from_frame(&frame).unwrap();
    assert!(notice.is_auth_failure());
  }

  #[test]
  fn recognizes_improperly_formatted_auth() {
    let frame = Frame::parse("NOTICE * :Improperly formatted auth");
    let notice = Notice::from_frame(&frame).unwrap();
    assert!(notice.is_auth_failure());
  }
}
