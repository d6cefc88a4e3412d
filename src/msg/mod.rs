//! ## Domain event decoders
//!
//! One decoder per IRC command. Decoders are pure: the input is a
//! [`Frame`](crate::irc::Frame), the output is an `Option<T>` (`None` if
//! the frame's command doesn't match, or a tag required for the event is
//! missing). This makes them trivially unit-testable with literal frame
//! strings -- see the `tests` module in each submodule.

mod chat_message;
mod clear_chat;
mod clear_message;
mod global_user_state;
mod notice;
mod room_state;
mod user_notice;
mod user_state;
mod whisper;

pub use chat_message::{ChatMessage, Reply};
pub use clear_chat::ClearChat;
pub use clear_message::ClearMessage;
pub use global_user_state::GlobalUserState;
pub use notice::Notice;
pub use room_state::RoomState;
pub use user_notice::UserNotice;
pub use user_state::UserState;
pub use whisper::Whisper;

use crate::irc::Frame;
use std::collections::HashMap;

/// Decodes a parsed [`Frame`] into `Self`, or `None` if the frame's
/// command doesn't belong to this event, or a required field is missing.
pub trait FromFrame: Sized {
  fn from_frame(frame: &Frame) -> Option<Self>;
}

/// Any one of the domain events this crate knows how to decode, plus the
/// bare connection-level commands a [`crate::chat`] connection dispatches
/// on.
#[derive(Clone, Debug)]
pub enum Event {
  ChatMessage(ChatMessage),
  UserNotice(UserNotice),
  RoomState(RoomState),
  Notice(Notice),
  ClearChat(ClearChat),
  ClearMessage(ClearMessage),
  Whisper(Whisper),
  GlobalUserState(GlobalUserState),
  UserState(UserState),
  /// `JOIN #channel` -- only meaningful when it echoes back our own join.
  Join { channel: String },
  /// `PART #channel`.
  Part { channel: String },
  /// `PING :<payload>` from the server.
  Ping { payload: Option<String> },
  /// `PONG :<payload>` from the server.
  Pong { payload: Option<String> },
  /// The server is asking us to reconnect.
  Reconnect,
  /// A command this crate doesn't assign special meaning to.
  Unknown(Frame),
}

impl Event {
  /// Decodes a frame into the most specific [`Event`] variant it matches.
  pub fn from_frame(frame: &Frame) -> Event {
    match frame.command.as_str() {
      "PRIVMSG" => ChatMessage::from_frame(frame).map(Event::ChatMessage),
      "USERNOTICE" => UserNotice::from_frame(frame).map(Event::UserNotice),
      "ROOMSTATE" => RoomState::from_frame(frame).map(Event::RoomState),
      "NOTICE" => Notice::from_frame(frame).map(Event::Notice),
      "CLEARCHAT" => ClearChat::from_frame(frame).map(Event::ClearChat),
      "CLEARMSG" => ClearMessage::from_frame(frame).map(Event::ClearMessage),
      "WHISPER" => Whisper::from_frame(frame).map(Event::Whisper),
      "GLOBALUSERSTATE" => GlobalUserState::from_frame(frame).map(Event::GlobalUserState),
      "USERSTATE" => UserState::from_frame(frame).map(Event::UserState),
      "JOIN" => frame.channel().map(|channel| Event::Join { channel }),
      "PART" => frame.channel().map(|channel| Event::Part { channel }),
      "PING" => Some(Event::Ping { payload: frame.trailing.clone() }),
      "PONG" => Some(Event::Pong { payload: frame.trailing.clone() }),
      "RECONNECT" => Some(Event::Reconnect),
      _ => None,
    }
    .unwrap_or_else(|| Event::Unknown(frame.clone()))
  }
}

/// Builds the `msg-param-*` map for [`UserNotice`]: every tag whose key
/// starts with `msg-param-` survives with that prefix stripped.
pub(crate) fn msg_params(frame: &Frame) -> HashMap<String, String> {
  frame
    .tags
    .iter()
    .filter_map(|(k, v)| k.strip_prefix("msg-param-").map(|k| (k.to_string(), v.clone())))
    .collect()
}

/// Treats an empty string tag value the same as a missing tag.
pub(crate) fn non_empty(s: Option<&str>) -> Option<String> {
  s.filter(|s| !s.is_empty()).map(str::to_string)
}
