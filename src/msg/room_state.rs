//! `ROOMSTATE` -- a partial or full update to a channel's chat settings.

use super::FromFrame;
use crate::irc::{parse_bool, parse_int, Frame};

/// A partial or full update to a channel's chat settings.
///
/// Any field Twitch didn't include in this particular update keeps its
/// "unset" value (`false`/`0`/`-1`) rather than `None`, matching how the
/// wire protocol itself sends partial updates: absence means "no change",
/// but this crate doesn't track previous state to distinguish that from
/// "explicitly disabled".
#[derive(Clone, Debug)]
pub struct RoomState {
  pub channel: String,
  pub room_id: String,
  pub emote_only: bool,
  /// `-1` if the tag was absent; otherwise the minimum follow age in
  /// minutes (`0` means "all followers may chat").
  pub followers_only: i64,
  pub r9k: bool,
  pub slow: i64,
  pub subs_only: bool,
}

impl FromFrame for RoomState {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "ROOMSTATE" {
      return None;
    }

    Some(RoomState {
      channel: frame.channel()?,
      room_id: frame.tag("room-id").unwrap_or_default().to_string(),
      emote_only: frame.tag("emote-only").map(parse_bool).unwrap_or(false),
      followers_only: frame.tag("followers-only").map(parse_int).unwrap_or(-1),
      r9k: frame.tag("r9k").map(parse_bool).unwrap_or(false),
      slow: frame.tag("slow").map(parse_int).unwrap_or(0),
      subs_only: frame.tag("subs-only").map(parse_bool).unwrap_or(false),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_end_to_end_example() {
    let line = "@emote-only=0;followers-only=10;r9k=0;room-id=12345;slow=30;subs-only=1 :tmi.twitch.tv ROOMSTATE #testchannel";
    let frame = Frame::parse(line);
    let room = RoomState::from_frame(&frame).unwrap();
    assert_eq!(room.channel, "testchannel");
    assert!(!room.emote_only);
    assert_eq!(room.followers_only, 10);
    assert!(!room.r9k);
    assert_eq!(room.slow, 30);
    assert!(room.subs_only);
  }

  #[test]
  fn followers_only_absent_sentinel() {
    let frame = Frame::parse("@room-id=1 :tmi.twitch.tv ROOMSTATE #a");
    let room = RoomState::from_frame(&frame).unwrap();
    assert_eq!(room.followers_only, -1);
  }
}
