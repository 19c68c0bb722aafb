//! Data bridge: forwards store snapshots and session changes to the UI.
//!
//! Each bridge runs as a background task and shuts down on cancellation
//! or when its source is dropped.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use bizdash_core::{Resource, ResourceDataStore, Session, UserSession};

use crate::action::Action;

/// Forward every snapshot `store` publishes as `Action::StoreUpdated`,
/// starting with the current one.
pub async fn bridge_store(
    resource: Resource,
    store: ResourceDataStore,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut stream = store.subscribe();
    let _ = action_tx.send(Action::StoreUpdated(resource, stream.current().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = stream.changed() => match changed {
                Some(snapshot) => {
                    if action_tx.send(Action::StoreUpdated(resource, snapshot)).is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    debug!(%resource, "store bridge shut down");
}

/// Forward login, logout and refresh-failure transitions.
pub async fn bridge_session(
    mut session: watch::Receiver<Option<UserSession>>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
                let user = session.borrow_and_update().clone();
                if action_tx.send(Action::SessionChanged(user)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("session bridge shut down");
}

/// Wire a session's change feed to the action channel.
pub fn spawn_session_bridge(
    session: &Session,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let rx = session.subscribe();
    tokio::spawn(bridge_session(rx, action_tx, cancel));
}
