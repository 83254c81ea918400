//! Per-user notifications and the admin broadcast target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient_id:    Uuid,
  pub title:           String,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}

/// Who an admin broadcast addresses. Resolved against the profile list at
/// call time; an empty resolution is rejected before any insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastTarget {
  All,
  Verified,
  Selected(Vec<Uuid>),
}

/// Unread count as displayed next to the inbox bell.
pub fn unread_count(inbox: &[Notification]) -> usize {
  inbox.iter().filter(|n| !n.is_read).count()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unread_counts_only_unread() {
    let n = |is_read| Notification {
      notification_id: Uuid::new_v4(),
      recipient_id:    Uuid::new_v4(),
      title:           "t".into(),
      message:         "m".into(),
      is_read,
      created_at:      Utc::now(),
    };
    assert_eq!(unread_count(&[n(false), n(true), n(false)]), 2);
    assert_eq!(unread_count(&[]), 0);
  }

  #[test]
  fn target_json_shapes() {
    assert_eq!(serde_json::to_value(BroadcastTarget::All).unwrap(), serde_json::json!("all"));
    let id = Uuid::new_v4();
    assert_eq!(
      serde_json::to_value(BroadcastTarget::Selected(vec![id])).unwrap(),
      serde_json::json!({ "selected": [id] })
    );
  }
}
