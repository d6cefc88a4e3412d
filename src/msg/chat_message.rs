//! `PRIVMSG` -- a chat message sent by some user to a channel.

use super::{non_empty, FromFrame};
use crate::irc::{parse_badges, parse_bool, parse_channel, parse_emotes, parse_int, parse_timestamp, user_from_prefix, EmoteSpan, Frame};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A chat message sent by some user to a specific channel.
#[derive(Clone, Debug)]
pub struct ChatMessage {
  pub id: String,
  pub channel: String,
  pub user_login: String,
  pub user_id: String,
  pub display_name: String,
  pub text: String,
  pub emotes: Vec<EmoteSpan>,
  pub badges: HashMap<String, String>,
  pub badge_info: HashMap<String, String>,
  pub color: Option<String>,
  pub is_mod: bool,
  pub is_vip: bool,
  pub is_subscriber: bool,
  pub is_broadcaster: bool,
  pub is_first_message: bool,
  pub is_returning_chatter: bool,
  pub bits: i64,
  pub reply: Option<Reply>,
  pub timestamp: DateTime<Utc>,
  pub raw: Frame,
}

/// Info about the message this one is a reply to (the "reply-parent
/// quintuple").
#[derive(Clone, Debug)]
pub struct Reply {
  pub parent_msg_id: String,
  pub parent_user_id: String,
  pub parent_user_login: String,
  pub parent_display_name: String,
  pub parent_msg_body: String,
}

impl FromFrame for ChatMessage {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "PRIVMSG" {
      return None;
    }

    let channel = frame.channel()?;
    let text = frame.trailing.clone().unwrap_or_default();
    let user_login = frame
      .prefix
      .as_deref()
      .map(user_from_prefix)
      .unwrap_or_default()
      .to_string();

    let badges = frame.tag("badges").map(parse_badges).unwrap_or_default();
    let badge_info = frame.tag("badge-info").map(parse_badges).unwrap_or_default();

    let reply = frame.tag("reply-parent-msg-id").map(|_| Reply {
      parent_msg_id: frame.tag("reply-parent-msg-id").unwrap_or_default().to_string(),
      parent_user_id: frame.tag("reply-parent-user-id").unwrap_or_default().to_string(),
      parent_user_login: frame.tag("reply-parent-user-login").unwrap_or_default().to_string(),
      parent_display_name: frame.tag("reply-parent-display-name").unwrap_or_default().to_string(),
      parent_msg_body: frame.tag("reply-parent-msg-body").unwrap_or_default().to_string(),
    });

    Some(ChatMessage {
      id: frame.tag("id").unwrap_or_default().to_string(),
      channel,
      user_login,
      user_id: frame.tag("user-id").unwrap_or_default().to_string(),
      display_name: frame.tag("display-name").unwrap_or_default().to_string(),
      text,
      emotes: frame.tag("emotes").map(parse_emotes).unwrap_or_default(),
      is_broadcaster: badges.contains_key("broadcaster"),
      is_vip: badges.contains_key("vip"),
      badges,
      badge_info,
      color: non_empty(frame.tag("color")),
      is_mod: frame.tag("mod").map(parse_bool).unwrap_or(false),
      is_subscriber: frame.tag("subscriber").map(parse_bool).unwrap_or(false),
      is_first_message: frame.tag("first-msg").map(parse_bool).unwrap_or(false),
      is_returning_chatter: frame.tag("returning-chatter").map(parse_bool).unwrap_or(false),
      bits: frame.tag("bits").map(parse_int).unwrap_or(0),
      reply,
      timestamp: frame.tag("tmi-sent-ts").map(parse_timestamp).unwrap_or_else(Utc::now),
      raw: frame.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  const LINE: &str = "@badge-info=;badges=broadcaster/1;color=#FF0000;display-name=TestUser;emotes=25:0-4;id=abc;mod=0;room-id=12345;subscriber=0;tmi-sent-ts=1234567890123;user-id=12345 :testuser!testuser@testuser.tmi.twitch.tv PRIVMSG #testchannel :Kappa Hello";

  #[test]
  fn decodes_end_to_end_example() {
    let frame = Frame::parse(LINE);
    let msg = ChatMessage::from_frame(&frame).unwrap();
    assert_eq!(msg.channel, "testchannel");
    assert_eq!(msg.user_login, "testuser");
    assert_eq!(msg.user_id, "12345");
    assert_eq!(msg.display_name, "TestUser");
    assert_eq!(msg.text, "Kappa Hello");
    assert_eq!(msg.emotes, vec![EmoteSpan { id: "25".into(), start: 0, end: 4, count: 1 }]);
    assert!(msg.badges.contains_key("broadcaster"));
    assert!(msg.is_broadcaster);
    assert_eq!(msg.timestamp, Utc.timestamp_millis_opt(1234567890123).unwrap());
  }

  #[test]
  fn non_privmsg_frame_is_rejected() {
    let frame = Frame::parse("PING :tmi.twitch.tv");
    assert!(ChatMessage::from_frame(&frame).is_none());
  }

  #[test]
  fn reply_fields_populated_when_present() {
    let line = "@reply-parent-display-name=Foo;reply-parent-msg-body=hi;reply-parent-msg-id=1;reply-parent-user-id=2;reply-parent-user-login=foo;user-id=9 :foo!foo@foo.tmi.twitch.tv PRIVMSG #chan :reply text";
    let frame = Frame::parse(line);
    let msg = ChatMessage::from_frame(&frame).unwrap();
    let reply = msg.reply.unwrap();
    assert_eq!(reply.parent_user_login, "foo");
    assert_eq!(reply.parent_msg_body, "hi");
  }
}
