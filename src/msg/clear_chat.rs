//! `CLEARCHAT` -- chat was cleared of a batch of messages.

use super::FromFrame;
use crate::irc::{parse_int, Frame};

/// Sent when the chat is cleared: either entirely, or of a single user's
/// messages (ban or timeout).
#[derive(Clone, Debug)]
pub struct ClearChat {
  pub channel: String,
  pub room_id: String,
  /// Login of the banned/timed-out user, if this wasn't a full clear.
  pub user: Option<String>,
  /// Timeout duration in seconds, absent for a permanent ban or a full
  /// clear.
  pub ban_duration: Option<i64>,
}

impl FromFrame for ClearChat {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "CLEARCHAT" {
      return None;
    }

    Some(ClearChat {
      channel: frame.channel()?,
      room_id: frame.tag("room-id").unwrap_or_default().to_string(),
      user: frame.trailing.clone().filter(|s| !s.is_empty()),
      ban_duration: frame.tag("ban-duration").map(parse_int),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_end_to_end_example() {
    let line = "@ban-duration=600;target-user-id=67890 :tmi.twitch.tv CLEARCHAT #testchannel :baduser";
    let frame = Frame::parse(line);
    let clear = ClearChat::from_frame(&frame).unwrap();
    assert_eq!(clear.channel, "testchannel");
    assert_eq!(clear.user.as_deref(), Some("baduser"));
    assert_eq!(clear.ban_duration, Some(600));
  }

  #[test]
  fn full_clear_has_no_user() {
    let frame = Frame::parse("@room-id=1 :tmi.twitch.tv CLEARCHAT #chan");
    let clear = ClearChat::from_frame(&frame).unwrap();
    assert!(clear.user.is_none());
    assert!(clear.ban_duration.is_none());
  }
}
