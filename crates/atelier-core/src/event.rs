//! Change events — the invalidation signal behind live views.
//!
//! Every successful mutation publishes exactly one event. Events carry no row
//! data: subscribers re-run the relevant full fetch. The payload is typed so
//! delivery can be scoped (notification events reach only their recipient)
//! without any subscriber parsing strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The tables a subscriber can observe changes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Profiles,
  Posts,
  Reactions,
  Comments,
  Notifications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
  Insert,
  Update,
  Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
  pub table:  Table,
  pub op:     ChangeOp,
  pub row_id: Uuid,
  /// Set only for notification events; scopes delivery to the addressed user.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub recipient: Option<Uuid>,
}

impl ChangeEvent {
  pub fn new(table: Table, op: ChangeOp, row_id: Uuid) -> Self {
    Self { table, op, row_id, recipient: None }
  }

  pub fn notification(op: ChangeOp, row_id: Uuid, recipient: Uuid) -> Self {
    Self {
      table: Table::Notifications,
      op,
      row_id,
      recipient: Some(recipient),
    }
  }

  /// Whether this event should be delivered to `viewer`.
  pub fn visible_to(&self, viewer: Uuid) -> bool {
    self.recipient.is_none_or(|r| r == viewer)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn notification_events_are_scoped() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let public = ChangeEvent::new(Table::Posts, ChangeOp::Insert, Uuid::new_v4());
    assert!(public.visible_to(alice));
    assert!(public.visible_to(bob));

    let scoped = ChangeEvent::notification(ChangeOp::Insert, Uuid::new_v4(), alice);
    assert!(scoped.visible_to(alice));
    assert!(!scoped.visible_to(bob));
  }
}
