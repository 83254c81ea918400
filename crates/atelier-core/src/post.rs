//! Posts, reactions, comments and the assembled feed view.
//!
//! Posts are immutable once created — there is no edit or delete operation.
//! Reactions and comments hang off a post; the feed read model inlines the
//! author display fields for every post and comment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, profile::ProfileCard};

// ─── Posts ───────────────────────────────────────────────────────────────────

/// What a post carries. Stored as a discriminant column next to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
  Text,
  Link,
  File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  /// Text body for `text` posts, the URL for `link` posts, an optional
  /// caption for `file` posts.
  pub content:    Option<String>,
  /// Object key in the `community-files` bucket.
  pub file_key:   Option<String>,
  pub kind:       PostKind,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CommunityStore::create_post`]. The kind tag is
/// derived, not chosen by the caller.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
  pub author_id: Uuid,
  pub text:      Option<String>,
  pub link:      Option<String>,
  pub file_key:  Option<String>,
}

impl NewPost {
  /// Derive the kind tag and the stored content: a file wins over a link,
  /// a link wins over plain text, and a link replaces the content field.
  /// A post with none of the three is rejected.
  pub fn classify(&self) -> Result<(PostKind, Option<String>)> {
    let text = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let link = self.link.as_deref().map(str::trim).filter(|l| !l.is_empty());

    if self.file_key.is_some() {
      Ok((PostKind::File, text.map(str::to_string)))
    } else if let Some(link) = link {
      Ok((PostKind::Link, Some(link.to_string())))
    } else if let Some(text) = text {
      Ok((PostKind::Text, Some(text.to_string())))
    } else {
      Err(Error::EmptyPost)
    }
  }
}

// ─── Reactions ───────────────────────────────────────────────────────────────

/// The closed reaction label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
  Like,
  Dislike,
}

/// At most one live reaction exists per `(post_id, author_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
  pub reaction_id: Uuid,
  pub post_id:     Uuid,
  pub author_id:   Uuid,
  pub kind:        ReactionKind,
  pub created_at:  DateTime<Utc>,
}

/// What [`crate::store::CommunityStore::react`] did to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReactionOutcome {
  /// No prior reaction — one was inserted.
  Added(Reaction),
  /// A prior reaction of the other kind was updated in place.
  Switched(Reaction),
  /// A prior reaction of the same kind was removed (toggle-off).
  Removed { reaction_id: Uuid },
}

impl ReactionOutcome {
  pub fn reaction_id(&self) -> Uuid {
    match self {
      Self::Added(r) | Self::Switched(r) => r.reaction_id,
      Self::Removed { reaction_id } => *reaction_id,
    }
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CommunityStore::add_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id:   Uuid,
  pub author_id: Uuid,
  pub content:   String,
}

impl NewComment {
  /// Reject blank comment bodies before they reach the store.
  pub fn validate(&self) -> Result<()> {
    if self.content.trim().is_empty() {
      Err(Error::EmptyComment)
    } else {
      Ok(())
    }
  }
}

// ─── Feed read model ─────────────────────────────────────────────────────────

/// A comment with its author's display fields inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  pub comment: Comment,
  pub author:  ProfileCard,
}

/// One feed entry: the post, its author, and the full reaction and comment
/// sets. Comments are ordered newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
  pub post:      Post,
  pub author:    ProfileCard,
  pub reactions: Vec<Reaction>,
  pub comments:  Vec<CommentView>,
}

impl FeedPost {
  pub fn reaction_count(&self, kind: ReactionKind) -> usize {
    self.reactions.iter().filter(|r| r.kind == kind).count()
  }

  /// The viewer's own reaction on this post, if any.
  pub fn viewer_reaction(&self, viewer: Uuid) -> Option<ReactionKind> {
    self
      .reactions
      .iter()
      .find(|r| r.author_id == viewer)
      .map(|r| r.kind)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_post(text: Option<&str>, link: Option<&str>, file: Option<&str>) -> NewPost {
    NewPost {
      author_id: Uuid::new_v4(),
      text:      text.map(str::to_string),
      link:      link.map(str::to_string),
      file_key:  file.map(str::to_string),
    }
  }

  #[test]
  fn file_wins_over_link_and_text() {
    let (kind, content) = new_post(Some("caption"), Some("https://x"), Some("public/a.png"))
      .classify()
      .unwrap();
    assert_eq!(kind, PostKind::File);
    assert_eq!(content.as_deref(), Some("caption"));
  }

  #[test]
  fn link_replaces_content() {
    let (kind, content) = new_post(Some("ignored"), Some("https://example.com"), None)
      .classify()
      .unwrap();
    assert_eq!(kind, PostKind::Link);
    assert_eq!(content.as_deref(), Some("https://example.com"));
  }

  #[test]
  fn plain_text_post() {
    let (kind, content) = new_post(Some("hello"), None, None).classify().unwrap();
    assert_eq!(kind, PostKind::Text);
    assert_eq!(content.as_deref(), Some("hello"));
  }

  #[test]
  fn empty_post_is_rejected() {
    assert!(matches!(
      new_post(Some("   "), None, None).classify(),
      Err(Error::EmptyPost)
    ));
  }

  #[test]
  fn feed_post_counts_and_viewer_lookup() {
    let viewer = Uuid::new_v4();
    let post_id = Uuid::new_v4();
    let reaction = |author, kind| Reaction {
      reaction_id: Uuid::new_v4(),
      post_id,
      author_id: author,
      kind,
      created_at: chrono::Utc::now(),
    };

    let fp = FeedPost {
      post:      Post {
        post_id,
        author_id: Uuid::new_v4(),
        content: Some("x".into()),
        file_key: None,
        kind: PostKind::Text,
        created_at: chrono::Utc::now(),
      },
      author:    ProfileCard {
        profile_id:  Uuid::new_v4(),
        username:    "poster".into(),
        avatar_key:  None,
        is_verified: false,
      },
      reactions: vec![
        reaction(viewer, ReactionKind::Like),
        reaction(Uuid::new_v4(), ReactionKind::Like),
        reaction(Uuid::new_v4(), ReactionKind::Dislike),
      ],
      comments:  vec![],
    };

    assert_eq!(fp.reaction_count(ReactionKind::Like), 2);
    assert_eq!(fp.reaction_count(ReactionKind::Dislike), 1);
    assert_eq!(fp.viewer_reaction(viewer), Some(ReactionKind::Like));
    assert_eq!(fp.viewer_reaction(Uuid::new_v4()), None);
  }
}
