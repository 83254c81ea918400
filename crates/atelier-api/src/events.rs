//! The change feed: a broadcast channel of [`ChangeEvent`]s surfaced to
//! clients as a Server-Sent Events stream.
//!
//! Handlers publish one event per successful mutation. Connected viewers
//! re-run the relevant full fetch on any event they receive — the event is an
//! invalidation signal, not a data delta. A lagging subscriber therefore
//! loses nothing by skipping ahead.

use std::convert::Infallible;

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt as _, wrappers::BroadcastStream};

use atelier_core::{event::ChangeEvent, store::CommunityStore};

use crate::{AppState, session::CurrentUser};

const CHANNEL_CAPACITY: usize = 256;

/// Shared publish/subscribe handle for change events.
#[derive(Clone)]
pub struct ChangeFeed {
  tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
    Self { tx }
  }

  /// Publish an event. Having no subscribers is not an error.
  pub fn publish(&self, event: ChangeEvent) {
    let _ = self.tx.send(event);
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
    self.tx.subscribe()
  }
}

impl Default for ChangeFeed {
  fn default() -> Self { Self::new() }
}

/// `GET /events` — the live-update stream for the signed-in user.
///
/// Notification events are delivered only to their recipient; everything
/// else goes to every subscriber.
pub async fn stream<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let viewer = user.identity_id;
  let rx = state.feed.subscribe();

  let stream = BroadcastStream::new(rx).filter_map(move |result| {
    // Lagged receivers just skip; every event means "re-fetch".
    let event = result.ok()?;
    if !event.visible_to(viewer) {
      return None;
    }
    let sse_event = Event::default().event("change").json_data(&event).ok()?;
    Some(Ok::<_, Infallible>(sse_event))
  });

  Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
  use atelier_core::event::{ChangeOp, Table};
  use uuid::Uuid;

  use super::*;

  #[tokio::test]
  async fn events_reach_every_subscriber() {
    let feed = ChangeFeed::new();
    let mut a = feed.subscribe();
    let mut b = feed.subscribe();

    let event = ChangeEvent::new(Table::Posts, ChangeOp::Insert, Uuid::new_v4());
    feed.publish(event.clone());

    assert_eq!(a.recv().await.unwrap().row_id, event.row_id);
    assert_eq!(b.recv().await.unwrap().row_id, event.row_id);
  }

  #[test]
  fn publishing_without_subscribers_is_fine() {
    let feed = ChangeFeed::new();
    feed.publish(ChangeEvent::new(Table::Comments, ChangeOp::Delete, Uuid::new_v4()));
  }
}
