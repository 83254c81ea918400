//! SQL schema for the Atelier SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id   TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,    -- argon2 PHC string
    created_at    TEXT NOT NULL     -- ISO 8601 UTC; store-assigned
);

-- Keyed by the owning identity's UUID. No foreign key: the identity table
-- belongs to the auth layer and profiles only reference it by id.
CREATE TABLE IF NOT EXISTS profiles (
    profile_id     TEXT PRIMARY KEY,
    username       TEXT NOT NULL,
    mobile         TEXT,
    portfolio_link TEXT,
    country        TEXT,
    avatar_key     TEXT,            -- object key in the 'avatars' bucket
    document_key   TEXT,            -- object key in the 'verification' bucket
    is_verified    INTEGER NOT NULL DEFAULT 0,
    is_admin       INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

-- Posts are immutable: no UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS posts (
    post_id    TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES profiles(profile_id),
    content    TEXT,
    file_key   TEXT,                -- object key in 'community-files'
    kind       TEXT NOT NULL,       -- 'text' | 'link' | 'file'
    created_at TEXT NOT NULL
);

-- One live reaction per (post, user); the UNIQUE constraint backs the toggle
-- logic even under a racing double-submit.
CREATE TABLE IF NOT EXISTS reactions (
    reaction_id TEXT PRIMARY KEY,
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    author_id   TEXT NOT NULL REFERENCES profiles(profile_id),
    kind        TEXT NOT NULL,      -- 'like' | 'dislike'
    created_at  TEXT NOT NULL,
    UNIQUE (post_id, author_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(post_id),
    author_id  TEXT NOT NULL REFERENCES profiles(profile_id),
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_id    TEXT NOT NULL REFERENCES profiles(profile_id),
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_created_idx        ON posts(created_at);
CREATE INDEX IF NOT EXISTS reactions_post_idx       ON reactions(post_id);
CREATE INDEX IF NOT EXISTS comments_post_idx        ON comments(post_id);
CREATE INDEX IF NOT EXISTS notifications_recip_idx  ON notifications(recipient_id);

PRAGMA user_version = 1;
";
