//! Integration tests for `SqliteStore` against an in-memory database.

use atelier_core::{
  identity::NewIdentity,
  post::{NewComment, NewPost, PostKind, ReactionKind, ReactionOutcome},
  profile::{Profile, ProfileUpdate},
  store::CommunityStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Create a profile to author posts/comments with.
async fn member(s: &SqliteStore, username: &str) -> Profile {
  s.ensure_profile(Uuid::new_v4(), username.to_string())
    .await
    .unwrap()
}

fn text_post(author: Uuid, text: &str) -> NewPost {
  NewPost {
    author_id: author,
    text:      Some(text.to_string()),
    link:      None,
    file_key:  None,
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_identity_and_read_credentials() {
  let s = store().await;

  let identity = s
    .create_identity(NewIdentity {
      email:         "alice@example.com".into(),
      password_hash: "$argon2id$stub".into(),
    })
    .await
    .unwrap();
  assert_eq!(identity.email, "alice@example.com");

  let creds = s
    .credentials_by_email("alice@example.com")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(creds.identity.identity_id, identity.identity_id);
  assert_eq!(creds.password_hash, "$argon2id$stub");

  let fetched = s.get_identity(identity.identity_id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  let new = |hash: &str| NewIdentity {
    email:         "dup@example.com".into(),
    password_hash: hash.into(),
  };

  s.create_identity(new("h1")).await.unwrap();
  let err = s.create_identity(new("h2")).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atelier_core::Error::EmailTaken(_))
  ));
}

#[tokio::test]
async fn credentials_for_unknown_email_is_none() {
  let s = store().await;
  assert!(s.credentials_by_email("nobody@example.com").await.unwrap().is_none());
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_profile_creates_once() {
  let s = store().await;
  let id = Uuid::new_v4();

  let created = s.ensure_profile(id, "alice".into()).await.unwrap();
  assert_eq!(created.profile_id, id);
  assert_eq!(created.username, "alice");
  assert!(!created.is_verified);
  assert!(!created.is_admin);

  // Second call is a no-op; the original username wins.
  let again = s.ensure_profile(id, "other".into()).await.unwrap();
  assert_eq!(again.username, "alice");
  assert_eq!(s.list_profiles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_profile_replaces_text_fields_and_keeps_keys() {
  let s = store().await;
  let p = member(&s, "bob").await;

  let updated = s
    .update_profile(p.profile_id, ProfileUpdate {
      username:       "bobby".into(),
      mobile:         Some("+4912345".into()),
      portfolio_link: Some("https://bob.example".into()),
      country:        Some("DE".into()),
      avatar_key:     Some("public/ava.png".into()),
      document_key:   None,
    })
    .await
    .unwrap();
  assert_eq!(updated.username, "bobby");
  assert_eq!(updated.avatar_key.as_deref(), Some("public/ava.png"));

  // A later submission without a fresh upload keeps the stored avatar key
  // but clears a text field that came back empty.
  let updated = s
    .update_profile(p.profile_id, ProfileUpdate {
      username:       "bobby".into(),
      mobile:         None,
      portfolio_link: Some("https://bob.example".into()),
      country:        Some("DE".into()),
      avatar_key:     None,
      document_key:   Some("public/nic.png".into()),
    })
    .await
    .unwrap();
  assert_eq!(updated.avatar_key.as_deref(), Some("public/ava.png"));
  assert_eq!(updated.document_key.as_deref(), Some("public/nic.png"));
  assert!(updated.mobile.is_none());
}

#[tokio::test]
async fn update_profile_upserts_missing_row() {
  let s = store().await;
  let id = Uuid::new_v4();

  let created = s
    .update_profile(id, ProfileUpdate {
      username: "fresh".into(),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(created.profile_id, id);
  assert!(!created.is_verified);
}

#[tokio::test]
async fn list_profiles_newest_first() {
  let s = store().await;
  let _first = member(&s, "first").await;
  let _second = member(&s, "second").await;
  let third = member(&s, "third").await;

  let all = s.list_profiles().await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(all[0].profile_id, third.profile_id);
}

#[tokio::test]
async fn set_verified_flips_flag() {
  let s = store().await;
  let p = member(&s, "pending").await;

  let verified = s.set_verified(p.profile_id).await.unwrap().unwrap();
  assert!(verified.is_verified);

  assert!(s.set_verified(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_post_derives_kind() {
  let s = store().await;
  let p = member(&s, "poster").await;

  let text = s.create_post(text_post(p.profile_id, "hello")).await.unwrap();
  assert_eq!(text.kind, PostKind::Text);

  let link = s
    .create_post(NewPost {
      author_id: p.profile_id,
      text:      None,
      link:      Some("https://example.com".into()),
      file_key:  None,
    })
    .await
    .unwrap();
  assert_eq!(link.kind, PostKind::Link);
  assert_eq!(link.content.as_deref(), Some("https://example.com"));

  let file = s
    .create_post(NewPost {
      author_id: p.profile_id,
      text:      Some("caption".into()),
      link:      None,
      file_key:  Some("public/pic.png".into()),
    })
    .await
    .unwrap();
  assert_eq!(file.kind, PostKind::File);

  let fetched = s.get_post(text.post_id).await.unwrap().unwrap();
  assert_eq!(fetched.content.as_deref(), Some("hello"));
}

#[tokio::test]
async fn empty_post_is_rejected() {
  let s = store().await;
  let p = member(&s, "poster").await;

  let err = s
    .create_post(NewPost { author_id: p.profile_id, ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atelier_core::Error::EmptyPost)
  ));
}

// ─── Feed ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_is_newest_first_and_fully_decorated() {
  let s = store().await;
  let alice = member(&s, "alice").await;
  let bob = member(&s, "bob").await;

  let older = s.create_post(text_post(alice.profile_id, "older")).await.unwrap();
  let newer = s.create_post(text_post(bob.profile_id, "newer")).await.unwrap();

  s.react(older.post_id, bob.profile_id, ReactionKind::Like).await.unwrap();
  s.add_comment(NewComment {
    post_id:   older.post_id,
    author_id: bob.profile_id,
    content:   "first comment".into(),
  })
  .await
  .unwrap();
  s.add_comment(NewComment {
    post_id:   older.post_id,
    author_id: alice.profile_id,
    content:   "second comment".into(),
  })
  .await
  .unwrap();

  let feed = s.feed().await.unwrap();
  assert_eq!(feed.len(), 2);

  // Newest post first.
  assert_eq!(feed[0].post.post_id, newer.post_id);
  assert_eq!(feed[0].author.username, "bob");
  assert!(feed[0].reactions.is_empty());
  assert!(feed[0].comments.is_empty());

  // Decorations land on the right post, comments newest first with their
  // authors inlined.
  let decorated = &feed[1];
  assert_eq!(decorated.post.post_id, older.post_id);
  assert_eq!(decorated.reactions.len(), 1);
  assert_eq!(decorated.reactions[0].author_id, bob.profile_id);
  assert_eq!(decorated.comments.len(), 2);
  assert_eq!(decorated.comments[0].comment.content, "second comment");
  assert_eq!(decorated.comments[0].author.username, "alice");
  assert_eq!(decorated.comments[1].author.username, "bob");
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_kind_twice_leaves_zero_reactions() {
  let s = store().await;
  let p = member(&s, "poster").await;
  let post = s.create_post(text_post(p.profile_id, "x")).await.unwrap();

  let first = s
    .react(post.post_id, p.profile_id, ReactionKind::Like)
    .await
    .unwrap();
  assert!(matches!(first, ReactionOutcome::Added(_)));

  let second = s
    .react(post.post_id, p.profile_id, ReactionKind::Like)
    .await
    .unwrap();
  assert!(matches!(second, ReactionOutcome::Removed { .. }));

  let feed = s.feed().await.unwrap();
  assert!(feed[0].reactions.is_empty());
}

#[tokio::test]
async fn different_kind_switches_in_place() {
  let s = store().await;
  let p = member(&s, "poster").await;
  let post = s.create_post(text_post(p.profile_id, "x")).await.unwrap();

  s.react(post.post_id, p.profile_id, ReactionKind::Like).await.unwrap();
  let outcome = s
    .react(post.post_id, p.profile_id, ReactionKind::Dislike)
    .await
    .unwrap();
  assert!(matches!(outcome, ReactionOutcome::Switched(_)));

  // Exactly one live reaction, of the second kind.
  let feed = s.feed().await.unwrap();
  assert_eq!(feed[0].reactions.len(), 1);
  assert_eq!(feed[0].reactions[0].kind, ReactionKind::Dislike);
}

#[tokio::test]
async fn reactions_from_different_users_coexist() {
  let s = store().await;
  let alice = member(&s, "alice").await;
  let bob = member(&s, "bob").await;
  let post = s.create_post(text_post(alice.profile_id, "x")).await.unwrap();

  s.react(post.post_id, alice.profile_id, ReactionKind::Like).await.unwrap();
  s.react(post.post_id, bob.profile_id, ReactionKind::Like).await.unwrap();

  let feed = s.feed().await.unwrap();
  assert_eq!(feed[0].reactions.len(), 2);
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_delete_comment() {
  let s = store().await;
  let p = member(&s, "poster").await;
  let post = s.create_post(text_post(p.profile_id, "x")).await.unwrap();

  let comment = s
    .add_comment(NewComment {
      post_id:   post.post_id,
      author_id: p.profile_id,
      content:   "nice".into(),
    })
    .await
    .unwrap();

  assert!(s.get_comment(comment.comment_id).await.unwrap().is_some());
  s.delete_comment(comment.comment_id).await.unwrap();
  assert!(s.get_comment(comment.comment_id).await.unwrap().is_none());
}

#[tokio::test]
async fn blank_comment_is_rejected() {
  let s = store().await;
  let p = member(&s, "poster").await;
  let post = s.create_post(text_post(p.profile_id, "x")).await.unwrap();

  let err = s
    .add_comment(NewComment {
      post_id:   post.post_id,
      author_id: p.profile_id,
      content:   "   ".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atelier_core::Error::EmptyComment)
  ));
}

#[tokio::test]
async fn delete_missing_comment_errors() {
  let s = store().await;
  let err = s.delete_comment(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atelier_core::Error::CommentNotFound(_))
  ));
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn inbox_is_newest_first() {
  let s = store().await;
  let p = member(&s, "reader").await;

  s.notify(p.profile_id, "first".into(), "m".into()).await.unwrap();
  s.notify(p.profile_id, "second".into(), "m".into()).await.unwrap();

  let inbox = s.inbox(p.profile_id).await.unwrap();
  assert_eq!(inbox.len(), 2);
  assert_eq!(inbox[0].title, "second");
  assert!(inbox.iter().all(|n| !n.is_read));
}

#[tokio::test]
async fn mark_read_flips_flag() {
  let s = store().await;
  let p = member(&s, "reader").await;

  let n = s.notify(p.profile_id, "t".into(), "m".into()).await.unwrap();
  let read = s.mark_read(n.notification_id).await.unwrap().unwrap();
  assert!(read.is_read);

  assert!(s.mark_read(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn inbox_is_scoped_to_the_recipient() {
  let s = store().await;
  let alice = member(&s, "alice").await;
  let bob = member(&s, "bob").await;

  s.notify(alice.profile_id, "for alice".into(), "m".into()).await.unwrap();

  assert_eq!(s.inbox(alice.profile_id).await.unwrap().len(), 1);
  assert!(s.inbox(bob.profile_id).await.unwrap().is_empty());
}
