//! [`SqliteStore`] — the SQLite implementation of [`CommunityStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use atelier_core::{
  identity::{Credentials, Identity, NewIdentity},
  notification::Notification,
  post::{
    Comment, CommentView, FeedPost, NewComment, NewPost, Post, Reaction,
    ReactionKind, ReactionOutcome,
  },
  profile::{Profile, ProfileUpdate},
  store::CommunityStore,
};

use crate::{
  Error, Result,
  encode::{
    RawCard, RawComment, RawCommentRow, RawIdentity, RawNotification, RawPost,
    RawProfile, RawReaction, decode_uuid, encode_dt, encode_post_kind,
    encode_reaction_kind, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The Atelier community store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// calls are serialised onto one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

const PROFILE_COLS: &str = "profile_id, username, mobile, portfolio_link, \
   country, avatar_key, document_key, is_verified, is_admin, created_at, \
   updated_at";

fn read_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    profile_id:     row.get(0)?,
    username:       row.get(1)?,
    mobile:         row.get(2)?,
    portfolio_link: row.get(3)?,
    country:        row.get(4)?,
    avatar_key:     row.get(5)?,
    document_key:   row.get(6)?,
    is_verified:    row.get(7)?,
    is_admin:       row.get(8)?,
    created_at:     row.get(9)?,
    updated_at:     row.get(10)?,
  })
}

fn select_profile(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawProfile>> {
  conn
    .query_row(
      &format!("SELECT {PROFILE_COLS} FROM profiles WHERE profile_id = ?1"),
      rusqlite::params![id_str],
      read_profile,
    )
    .optional()
}

fn read_notification(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawNotification> {
  Ok(RawNotification {
    notification_id: row.get(0)?,
    recipient_id:    row.get(1)?,
    title:           row.get(2)?,
    message:         row.get(3)?,
    is_read:         row.get(4)?,
    created_at:      row.get(5)?,
  })
}

/// What the reaction toggle did, in raw column form.
enum RawOutcome {
  Added(RawReaction),
  Switched(RawReaction),
  Removed { reaction_id: String },
}

// ─── CommunityStore impl ─────────────────────────────────────────────────────

impl CommunityStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn create_identity(&self, input: NewIdentity) -> Result<Identity> {
    let identity = Identity {
      identity_id: Uuid::new_v4(),
      email:       input.email,
      created_at:  Utc::now(),
    };

    let id_str    = encode_uuid(identity.identity_id);
    let email     = identity.email.clone();
    let hash      = input.password_hash;
    let at_str    = encode_dt(identity.created_at);

    // The connection thread serialises calls, so check-then-insert is safe.
    let taken: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM identities WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          return Ok(true);
        }

        conn.execute(
          "INSERT INTO identities (identity_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email, hash, at_str],
        )?;
        Ok(false)
      })
      .await?;

    if taken {
      return Err(atelier_core::Error::EmailTaken(identity.email).into());
    }
    Ok(identity)
  }

  async fn credentials_by_email(
    &self,
    email: &str,
  ) -> Result<Option<Credentials>> {
    let email = email.to_owned();

    let raw: Option<(RawIdentity, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT identity_id, email, created_at, password_hash
               FROM identities WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok((
                  RawIdentity {
                    identity_id: row.get(0)?,
                    email:       row.get(1)?,
                    created_at:  row.get(2)?,
                  },
                  row.get(3)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(raw, password_hash)| {
        Ok(Credentials { identity: raw.into_identity()?, password_hash })
      })
      .transpose()
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT identity_id, email, created_at FROM identities
               WHERE identity_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawIdentity {
                  identity_id: row.get(0)?,
                  email:       row.get(1)?,
                  created_at:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn ensure_profile(
    &self,
    identity_id: Uuid,
    username: String,
  ) -> Result<Profile> {
    let id_str = encode_uuid(identity_id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO profiles
             (profile_id, username, is_verified, is_admin, created_at, updated_at)
           VALUES (?1, ?2, 0, 0, ?3, ?3)",
          rusqlite::params![id_str, username, at_str],
        )?;
        Ok(select_profile(conn, &id_str)?)
      })
      .await?;

    raw
      .map(RawProfile::into_profile)
      .transpose()?
      .ok_or_else(|| atelier_core::Error::ProfileNotFound(identity_id).into())
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| Ok(select_profile(conn, &id_str)?))
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> Result<Profile> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        // COALESCE keeps the stored object keys when the form submits no
        // fresh upload; text fields are replaced wholesale.
        conn.execute(
          "INSERT INTO profiles
             (profile_id, username, mobile, portfolio_link, country,
              avatar_key, document_key, is_verified, is_admin,
              created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8, ?8)
           ON CONFLICT(profile_id) DO UPDATE SET
             username       = excluded.username,
             mobile         = excluded.mobile,
             portfolio_link = excluded.portfolio_link,
             country        = excluded.country,
             avatar_key     = COALESCE(excluded.avatar_key, profiles.avatar_key),
             document_key   = COALESCE(excluded.document_key, profiles.document_key),
             updated_at     = excluded.updated_at",
          rusqlite::params![
            id_str,
            update.username,
            update.mobile,
            update.portfolio_link,
            update.country,
            update.avatar_key,
            update.document_key,
            at_str,
          ],
        )?;
        Ok(select_profile(conn, &id_str)?)
      })
      .await?;

    raw
      .map(RawProfile::into_profile)
      .transpose()?
      .ok_or_else(|| atelier_core::Error::ProfileNotFound(id).into())
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROFILE_COLS} FROM profiles ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], read_profile)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn set_verified(&self, id: Uuid) -> Result<Option<Profile>> {
    self.set_flag(id, "is_verified", true).await
  }

  async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<Option<Profile>> {
    self.set_flag(id, "is_admin", is_admin).await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let (kind, content) = input.classify()?;

    let post = Post {
      post_id:    Uuid::new_v4(),
      author_id:  input.author_id,
      content,
      file_key:   input.file_key,
      kind,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(post.post_id);
    let author_str = encode_uuid(post.author_id);
    let content    = post.content.clone();
    let file_key   = post.file_key.clone();
    let kind_str   = encode_post_kind(post.kind).to_owned();
    let at_str     = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, author_id, content, file_key, kind, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, author_str, content, file_key, kind_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT post_id, author_id, content, file_key, kind, created_at
               FROM posts WHERE post_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPost {
                  post_id:    row.get(0)?,
                  author_id:  row.get(1)?,
                  content:    row.get(2)?,
                  file_key:   row.get(3)?,
                  kind:       row.get(4)?,
                  created_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn feed(&self) -> Result<Vec<FeedPost>> {
    type RawRows =
      (Vec<(RawPost, RawCard)>, Vec<RawReaction>, Vec<RawCommentRow>);

    let (raw_posts, raw_reactions, raw_comments): RawRows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT p.post_id, p.author_id, p.content, p.file_key, p.kind,
                  p.created_at,
                  a.profile_id, a.username, a.avatar_key, a.is_verified
           FROM posts p
           JOIN profiles a ON a.profile_id = p.author_id
           ORDER BY p.created_at DESC",
        )?;
        let posts = stmt
          .query_map([], |row| {
            Ok((
              RawPost {
                post_id:    row.get(0)?,
                author_id:  row.get(1)?,
                content:    row.get(2)?,
                file_key:   row.get(3)?,
                kind:       row.get(4)?,
                created_at: row.get(5)?,
              },
              RawCard {
                profile_id:  row.get(6)?,
                username:    row.get(7)?,
                avatar_key:  row.get(8)?,
                is_verified: row.get(9)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT reaction_id, post_id, author_id, kind, created_at
           FROM reactions",
        )?;
        let reactions = stmt
          .query_map([], |row| {
            Ok(RawReaction {
              reaction_id: row.get(0)?,
              post_id:     row.get(1)?,
              author_id:   row.get(2)?,
              kind:        row.get(3)?,
              created_at:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT c.comment_id, c.post_id, c.author_id, c.content, c.created_at,
                  a.profile_id, a.username, a.avatar_key, a.is_verified
           FROM comments c
           JOIN profiles a ON a.profile_id = c.author_id
           ORDER BY c.created_at DESC",
        )?;
        let comments = stmt
          .query_map([], |row| {
            Ok(RawCommentRow {
              comment: RawComment {
                comment_id: row.get(0)?,
                post_id:    row.get(1)?,
                author_id:  row.get(2)?,
                content:    row.get(3)?,
                created_at: row.get(4)?,
              },
              author:  RawCard {
                profile_id:  row.get(5)?,
                username:    row.get(6)?,
                avatar_key:  row.get(7)?,
                is_verified: row.get(8)?,
              },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((posts, reactions, comments))
      })
      .await?;

    // Group the decorations by post. The comment query is already ordered
    // newest-first, and grouping preserves that order.
    let mut reactions_by_post: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
    for raw in raw_reactions {
      let reaction = raw.into_reaction()?;
      reactions_by_post
        .entry(reaction.post_id)
        .or_default()
        .push(reaction);
    }

    let mut comments_by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for raw in raw_comments {
      let view = raw.into_view()?;
      comments_by_post
        .entry(view.comment.post_id)
        .or_default()
        .push(view);
    }

    raw_posts
      .into_iter()
      .map(|(raw_post, raw_card)| {
        let post = raw_post.into_post()?;
        let author = raw_card.into_card()?;
        let reactions = reactions_by_post.remove(&post.post_id).unwrap_or_default();
        let comments = comments_by_post.remove(&post.post_id).unwrap_or_default();
        Ok(FeedPost { post, author, reactions, comments })
      })
      .collect()
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn react(
    &self,
    post_id: Uuid,
    author_id: Uuid,
    kind: ReactionKind,
  ) -> Result<ReactionOutcome> {
    let post_str   = encode_uuid(post_id);
    let author_str = encode_uuid(author_id);
    let kind_str   = encode_reaction_kind(kind).to_owned();
    let new_id_str = encode_uuid(Uuid::new_v4());
    let at_str     = encode_dt(Utc::now());

    let raw: RawOutcome = self
      .conn
      .call(move |conn| {
        let existing: Option<(String, String, String)> = conn
          .query_row(
            "SELECT reaction_id, kind, created_at FROM reactions
             WHERE post_id = ?1 AND author_id = ?2",
            rusqlite::params![post_str, author_str],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
          )
          .optional()?;

        match existing {
          None => {
            conn.execute(
              "INSERT INTO reactions (reaction_id, post_id, author_id, kind, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)",
              rusqlite::params![new_id_str, post_str, author_str, kind_str, at_str],
            )?;
            Ok(RawOutcome::Added(RawReaction {
              reaction_id: new_id_str,
              post_id:     post_str,
              author_id:   author_str,
              kind:        kind_str,
              created_at:  at_str,
            }))
          }
          Some((reaction_id, existing_kind, _)) if existing_kind == kind_str => {
            conn.execute(
              "DELETE FROM reactions WHERE reaction_id = ?1",
              rusqlite::params![reaction_id],
            )?;
            Ok(RawOutcome::Removed { reaction_id })
          }
          Some((reaction_id, _, created_at)) => {
            conn.execute(
              "UPDATE reactions SET kind = ?2 WHERE reaction_id = ?1",
              rusqlite::params![reaction_id, kind_str],
            )?;
            Ok(RawOutcome::Switched(RawReaction {
              reaction_id,
              post_id: post_str,
              author_id: author_str,
              kind: kind_str,
              created_at,
            }))
          }
        }
      })
      .await?;

    match raw {
      RawOutcome::Added(r) => Ok(ReactionOutcome::Added(r.into_reaction()?)),
      RawOutcome::Switched(r) => {
        Ok(ReactionOutcome::Switched(r.into_reaction()?))
      }
      RawOutcome::Removed { reaction_id } => Ok(ReactionOutcome::Removed {
        reaction_id: decode_uuid(&reaction_id)?,
      }),
    }
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    input.validate()?;

    let comment = Comment {
      comment_id: Uuid::new_v4(),
      post_id:    input.post_id,
      author_id:  input.author_id,
      content:    input.content,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(comment.comment_id);
    let post_str   = encode_uuid(comment.post_id);
    let author_str = encode_uuid(comment.author_id);
    let content    = comment.content.clone();
    let at_str     = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, post_id, author_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, post_str, author_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT comment_id, post_id, author_id, content, created_at
               FROM comments WHERE comment_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawComment {
                  comment_id: row.get(0)?,
                  post_id:    row.get(1)?,
                  author_id:  row.get(2)?,
                  content:    row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn delete_comment(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(atelier_core::Error::CommentNotFound(id).into());
    }
    Ok(())
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn notify(
    &self,
    recipient: Uuid,
    title: String,
    message: String,
  ) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      recipient_id:    recipient,
      title,
      message,
      is_read:         false,
      created_at:      Utc::now(),
    };

    let id_str    = encode_uuid(notification.notification_id);
    let recip_str = encode_uuid(recipient);
    let title     = notification.title.clone();
    let message   = notification.message.clone();
    let at_str    = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications
             (notification_id, recipient_id, title, message, is_read, created_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5)",
          rusqlite::params![id_str, recip_str, title, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT notification_id, recipient_id, title, message, is_read, created_at
               FROM notifications WHERE notification_id = ?1",
              rusqlite::params![id_str],
              read_notification,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }

  async fn inbox(&self, recipient: Uuid) -> Result<Vec<Notification>> {
    let recip_str = encode_uuid(recipient);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, recipient_id, title, message, is_read, created_at
           FROM notifications WHERE recipient_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![recip_str], read_notification)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
          rusqlite::params![id_str],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT notification_id, recipient_id, title, message, is_read, created_at
               FROM notifications WHERE notification_id = ?1",
              rusqlite::params![id_str],
              read_notification,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }
}

// ─── Private helpers ─────────────────────────────────────────────────────────

impl SqliteStore {
  /// Set a boolean profile flag and return the updated row, or `None` if the
  /// profile does not exist.
  async fn set_flag(
    &self,
    id: Uuid,
    column: &'static str,
    value: bool,
  ) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          &format!(
            "UPDATE profiles SET {column} = ?2, updated_at = ?3
             WHERE profile_id = ?1"
          ),
          rusqlite::params![id_str, value, at_str],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(select_profile(conn, &id_str)?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }
}
