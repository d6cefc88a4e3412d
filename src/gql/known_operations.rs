//! A curated catalog of Twitch GraphQL operation names observed in the
//! wild by prior reverse-engineering efforts. This is a seed list, not an
//! exhaustive one: Twitch adds and renames operations continuously, which
//! is exactly what [`super::discovery::DiscoveryEngine`]'s other two
//! strategies (introspection and error-message probing) are for.

use super::operation::Kind;

/// One entry in the catalog. Persisted-query hashes aren't captured here --
/// this seed list only carries operation names and kinds, not query text
/// to derive a hash from.
#[derive(Clone, Copy, Debug)]
pub struct KnownOperation {
  pub name: &'static str,
  pub kind: Kind,
}

pub const KNOWN_OPERATIONS: &[KnownOperation] = &[
  KnownOperation { name: "ChannelPage_Query", kind: Kind::Query },
  KnownOperation { name: "ChannelPointsContext", kind: Kind::Query },
  KnownOperation { name: "ClaimCommunityPoints", kind: Kind::Mutation },
  KnownOperation { name: "VideoPlayerStreamInfoOverlayChannel", kind: Kind::Query },
  KnownOperation { name: "PlaybackAccessToken", kind: Kind::Query },
  KnownOperation { name: "StreamMetadata", kind: Kind::Query },
  KnownOperation { name: "ChatRoomState", kind: Kind::Query },
  KnownOperation { name: "FollowButton_FollowUser", kind: Kind::Mutation },
  KnownOperation { name: "FollowButton_UnfollowUser", kind: Kind::Mutation },
  KnownOperation { name: "ViewerCount", kind: Kind::Query },
  KnownOperation { name: "BitsConfigContext_Global", kind: Kind::Query },
  KnownOperation { name: "SendMessage", kind: Kind::Mutation },
  KnownOperation { name: "WithIsStreamLiveQuery", kind: Kind::Query },
  KnownOperation { name: "VideoCommentsByOffsetOrCursor", kind: Kind::Query },
  KnownOperation { name: "OnsiteNotifications_ListNotifications", kind: Kind::Query },
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalog_has_no_duplicate_names() {
    let mut names: Vec<&str> = KNOWN_OPERATIONS.iter().map(|op| op.name).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(names.len(), before);
  }
}
