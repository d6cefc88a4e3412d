//! `WHISPER` -- a direct message between users.
//!
//! Delivered in response to the legacy `/w` route (see
//! [`crate::chat::Connection::whisper`]); known to be unreliable on some
//! server builds.

use super::{non_empty, FromFrame};
use crate::irc::{parse_badges, user_from_prefix, EmoteSpan, Frame};
use crate::irc::parse_emotes;
use std::collections::HashMap;

/// A direct message between users.
#[derive(Clone, Debug)]
pub struct Whisper {
  pub from_login: String,
  pub from_user_id: String,
  pub display_name: String,
  pub text: String,
  pub badges: HashMap<String, String>,
  pub emotes: Vec<EmoteSpan>,
  pub color: Option<String>,
}

impl FromFrame for Whisper {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "WHISPER" {
      return None;
    }

    Some(Whisper {
      from_login: frame.prefix.as_deref().map(user_from_prefix).unwrap_or_default().to_string(),
      from_user_id: frame.tag("user-id").unwrap_or_default().to_string(),
      display_name: frame.tag("display-name").unwrap_or_default().to_string(),
      text: frame.trailing.clone().unwrap_or_default(),
      badges: frame.tag("badges").map(parse_badges).unwrap_or_default(),
      emotes: frame.tag("emotes").map(parse_emotes).unwrap_or_default(),
      color: non_empty(frame.tag("color")),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_whisper() {
    let line = "@badges=;color=#19E6E6;display-name=randers;emotes=25:22-26;message-id=1;thread-id=40286300_553170741;turbo=0;user-id=40286300;user-type= :randers!randers@randers.tmi.twitch.tv WHISPER randers811 :hello, this is a test Kappa";
    let frame = Frame::parse(line);
    let whisper = Whisper::from_frame(&frame).unwrap();
    assert_eq!(whisper.from_login, "randers");
    assert_eq!(whisper.display_name, "randers");
    assert_eq!(whisper.text, "hello, this is a test Kappa");
    assert_eq!(whisper.color.as_deref(), Some("#19E6E6"));
  }
}
