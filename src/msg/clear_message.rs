//! `CLEARMSG` -- a single chat message was deleted.

use super::FromFrame;
use crate::irc::Frame;

/// A single message removal, as opposed to the batch removal of
/// [`super::ClearChat`].
#[derive(Clone, Debug)]
pub struct ClearMessage {
  pub channel: String,
  pub login: String,
  pub target_msg_id: String,
  pub text: String,
}

impl FromFrame for ClearMessage {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "CLEARMSG" {
      return None;
    }

    Some(ClearMessage {
      channel: frame.channel()?,
      login: frame.tag("login").unwrap_or_default().to_string(),
      target_msg_id: frame.tag("target-msg-id").unwrap_or_default().to_string(),
      text: frame.trailing.clone().unwrap_or_default(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_clearmsg() {
    let line = "@login=baduser;target-msg-id=abc-123 :tmi.twitch.tv CLEARMSG #chan :deleted text";
    let frame = Frame::parse(line);
    let clear = ClearMessage::from_frame(&frame).unwrap();
    assert_eq!(clear.login, "baduser");
    assert_eq!(clear.target_msg_id, "abc-123");
    assert_eq!(clear.text, "deleted text");
  }
}
