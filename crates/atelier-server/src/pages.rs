//! Server-rendered pages — one full-page view per client route.
//!
//! The pages are deliberately thin: they render the current state and lean on
//! the JSON API (and its live-update stream) for every action. `/community`
//! and `/profile` redirect anonymous visitors to `/signin`; `/admin`
//! additionally redirects non-admins to `/`.

use askama::Template;
use axum::{
  Router,
  extract::State,
  http::HeaderMap,
  response::{Html, IntoResponse, Redirect, Response},
  routing::get,
};
use chrono::{DateTime, Utc};

use atelier_api::{
  AppState,
  error::ApiError,
  session::{SessionUser, token_from_headers},
};
use atelier_core::{
  post::{PostKind, ReactionKind},
  profile::Profile,
  store::CommunityStore,
};

/// Page-level router, merged next to the `/api` nest.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(home::<S>))
    .route("/about", get(about::<S>))
    .route("/courses", get(courses::<S>))
    .route("/community", get(community::<S>))
    .route("/profile", get(profile::<S>))
    .route("/admin", get(admin::<S>))
    .route("/signin", get(signin::<S>))
    .with_state(state)
}

/// Resolve the session cookie (or bearer header) into a user, if any.
async fn page_session<S>(
  state: &AppState<S>,
  headers: &HeaderMap,
) -> Option<SessionUser>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
{
  let token = token_from_headers(headers)?;
  state.sessions.get(token).await
}

fn render<T: Template>(template: T) -> Result<Response, ApiError> {
  let html = template
    .render()
    .map_err(|e| ApiError::Internal(format!("template error: {e}")))?;
  Ok(Html(html).into_response())
}

fn long_date(at: DateTime<Utc>) -> String {
  at.format("%B %e, %Y %H:%M").to_string()
}

/// Display URL for an avatar: the derived object URL, or the placeholder
/// service keyed by username when no avatar was uploaded.
fn avatar_url<S>(
  state: &AppState<S>,
  username: &str,
  avatar_key: Option<&str>,
) -> String
where
  S: CommunityStore + Clone + Send + Sync + 'static,
{
  match avatar_key {
    Some(key) => state.objects.public_url("avatars", key),
    None => format!(
      "https://ui-avatars.com/api/?name={}&background=random",
      username.replace(' ', "+")
    ),
  }
}

// ─── Static pages ────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
  signed_in: bool,
}

async fn home<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let signed_in = page_session(&state, &headers).await.is_some();
  render(HomeTemplate { signed_in })
}

#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {
  signed_in: bool,
}

async fn about<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let signed_in = page_session(&state, &headers).await.is_some();
  render(AboutTemplate { signed_in })
}

// ─── Courses ─────────────────────────────────────────────────────────────────

struct Course {
  title:     &'static str,
  video_url: &'static str,
}

/// The course catalogue is editorial content, not data.
const COURSES: &[Course] = &[
  Course {
    title:     "Course Introduction",
    video_url: "https://videos.atelier.example/courses/introduction",
  },
  Course {
    title:     "Sketching a Character From Reference",
    video_url: "https://videos.atelier.example/courses/character-sketching",
  },
  Course {
    title:     "Brush Techniques for Digital Ink",
    video_url: "https://videos.atelier.example/courses/brush-techniques",
  },
  Course {
    title:     "Building a Storybook Layout",
    video_url: "https://videos.atelier.example/courses/storybook-layout",
  },
  Course {
    title:     "From Illustration to Instruction Manual",
    video_url: "https://videos.atelier.example/courses/instruction-manuals",
  },
  Course {
    title:     "Preparing Files for Print and Delivery",
    video_url: "https://videos.atelier.example/courses/print-delivery",
  },
];

#[derive(Template)]
#[template(path = "courses.html")]
struct CoursesTemplate {
  signed_in: bool,
  courses:   &'static [Course],
}

async fn courses<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let signed_in = page_session(&state, &headers).await.is_some();
  render(CoursesTemplate { signed_in, courses: COURSES })
}

// ─── Community ───────────────────────────────────────────────────────────────

struct CommentEntry {
  username:   String,
  verified:   bool,
  avatar_url: String,
  content:    String,
  created_at: String,
  own:        bool,
}

struct FeedEntry {
  username:   String,
  verified:   bool,
  avatar_url: String,
  created_at: String,
  text:       Option<String>,
  link:       Option<String>,
  image_url:  Option<String>,
  likes:      usize,
  dislikes:   usize,
  comments:   Vec<CommentEntry>,
}

#[derive(Template)]
#[template(path = "community.html")]
struct CommunityTemplate {
  signed_in: bool,
  entries:   Vec<FeedEntry>,
}

async fn community<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(user) = page_session(&state, &headers).await else {
    return Ok(Redirect::to("/signin").into_response());
  };

  let feed = state.store.feed().await.map_err(ApiError::store)?;

  let entries = feed
    .into_iter()
    .map(|fp| {
      let likes = fp.reaction_count(ReactionKind::Like);
      let dislikes = fp.reaction_count(ReactionKind::Dislike);
      let comments = fp
        .comments
        .iter()
        .map(|cv| CommentEntry {
          username:   cv.author.username.clone(),
          verified:   cv.author.is_verified,
          avatar_url: avatar_url(
            &state,
            &cv.author.username,
            cv.author.avatar_key.as_deref(),
          ),
          content:    cv.comment.content.clone(),
          created_at: long_date(cv.comment.created_at),
          own:        cv.comment.author_id == user.identity_id,
        })
        .collect();

      FeedEntry {
        username:   fp.author.username.clone(),
        verified:   fp.author.is_verified,
        avatar_url: avatar_url(
          &state,
          &fp.author.username,
          fp.author.avatar_key.as_deref(),
        ),
        created_at: long_date(fp.post.created_at),
        text:       match fp.post.kind {
          PostKind::Link => None,
          _ => fp.post.content.clone(),
        },
        link:       match fp.post.kind {
          PostKind::Link => fp.post.content.clone(),
          _ => None,
        },
        image_url:  fp
          .post
          .file_key
          .as_deref()
          .map(|key| state.objects.public_url("community-files", key)),
        likes,
        dislikes,
        comments,
      }
    })
    .collect();

  render(CommunityTemplate { signed_in: true, entries })
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate {
  signed_in:    bool,
  profile:      Profile,
  avatar_url:   String,
  document_url: Option<String>,
}

async fn profile<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(user) = page_session(&state, &headers).await else {
    return Ok(Redirect::to("/signin").into_response());
  };

  let profile = state
    .store
    .ensure_profile(
      user.identity_id,
      atelier_core::profile::username_from_email(&user.email),
    )
    .await
    .map_err(ApiError::store)?;

  let avatar_url =
    avatar_url(&state, &profile.username, profile.avatar_key.as_deref());
  let document_url = profile
    .document_key
    .as_deref()
    .map(|key| state.objects.public_url("verification", key));

  render(ProfileTemplate { signed_in: true, profile, avatar_url, document_url })
}

// ─── Admin ───────────────────────────────────────────────────────────────────

struct UserRow {
  profile_id: String,
  username:   String,
  avatar_url: String,
  mobile:     String,
  country:    String,
  verified:   bool,
  document_url: Option<String>,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
  signed_in: bool,
  users:     Vec<UserRow>,
}

async fn admin<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(user) = page_session(&state, &headers).await else {
    return Ok(Redirect::to("/signin").into_response());
  };

  // Server-side admin guard: non-admins land back on the home page.
  let is_admin = state
    .store
    .get_profile(user.identity_id)
    .await
    .map_err(ApiError::store)?
    .is_some_and(|p| p.is_admin);
  if !is_admin {
    return Ok(Redirect::to("/").into_response());
  }

  let users = state
    .store
    .list_profiles()
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|p| UserRow {
      profile_id:   p.profile_id.to_string(),
      avatar_url:   avatar_url(&state, &p.username, p.avatar_key.as_deref()),
      mobile:       p.mobile.unwrap_or_else(|| "-".to_string()),
      country:      p.country.unwrap_or_else(|| "-".to_string()),
      verified:     p.is_verified,
      document_url: p
        .document_key
        .as_deref()
        .map(|key| state.objects.public_url("verification", key)),
      username:     p.username,
    })
    .collect();

  render(AdminTemplate { signed_in: true, users })
}

// ─── Sign-in ─────────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "signin.html")]
struct SigninTemplate {
  signed_in: bool,
}

async fn signin<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Already signed in: go straight to the profile, like the original.
  if page_session(&state, &headers).await.is_some() {
    return Ok(Redirect::to("/profile").into_response());
  }
  render(SigninTemplate { signed_in: false })
}
