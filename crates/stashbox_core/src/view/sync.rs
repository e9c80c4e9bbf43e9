//! Background task that keeps one `ViewState` in step with the store.

use super::projection::{Projection, ViewDefinition};
use super::state::ViewState;
use crate::repo::{RepoError, RepoResult};
use crate::store::Store;
use log::{debug, error, info};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publishes `ViewState<T>` for one view definition.
///
/// State machine: `Loading -> Success (-> Success)*`, with `Error` reachable
/// from `Loading` or `Success`. `Error` stops the task; only
/// [`restart`](Self::restart) leaves it.
pub struct ViewStateSync<T> {
    store: Store,
    definition: ViewDefinition<T>,
    state: Arc<watch::Sender<ViewState<T>>>,
    task: Option<JoinHandle<()>>,
}

impl<T> ViewStateSync<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an idle synchronizer in `Loading` state.
    pub fn new(store: Store, definition: ViewDefinition<T>) -> Self {
        Self {
            store,
            definition,
            state: Arc::new(watch::Sender::new(ViewState::Loading)),
            task: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    /// Subscribes to the store and starts publishing. No-op when running.
    ///
    /// Fails with [`RepoError::Runtime`] outside a Tokio runtime, leaving the
    /// published state untouched.
    pub fn start(&mut self) -> RepoResult<()> {
        if self.is_running() {
            return Ok(());
        }
        let handle = Handle::try_current().map_err(|err| {
            error!(
                "event=view_sync_start module=view status=error view={} error={}",
                self.definition.name, err
            );
            RepoError::Runtime(err.to_string())
        })?;
        self.state.send_replace(ViewState::Loading);
        let projection = Projection::subscribe(&self.store, self.definition);
        let state = Arc::clone(&self.state);
        self.task = Some(handle.spawn(run(self.definition.name, projection, state)));
        info!(
            "event=view_sync_start module=view status=ok view={}",
            self.definition.name
        );
        Ok(())
    }

    /// Cancels the subscription. The last published state is kept.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!(
                "event=view_sync_stop module=view status=ok view={}",
                self.definition.name
            );
        }
    }

    /// Re-initializes the subscription; the only way out of `Error`.
    pub fn restart(&mut self) -> RepoResult<()> {
        self.stop();
        self.start()
    }

    /// Whether the background task is still publishing.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Current state snapshot.
    pub fn state(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state this synchronizer publishes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }
}

impl<T> Drop for ViewStateSync<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<T>(
    name: &'static str,
    mut projection: Projection<T>,
    state: Arc<watch::Sender<ViewState<T>>>,
) where
    T: Send + Sync + 'static,
{
    while let Some(next) = projection.next().await {
        let mut failed = false;
        state.send_modify(|current| {
            current.advance(next);
            failed = current.is_error();
        });

        if failed {
            let message = state.borrow().error().unwrap_or_default().to_string();
            error!("event=view_sync module=view status=error view={name} error={message}");
            return;
        }
        debug!("event=view_sync module=view status=ok view={name}");
    }
    debug!("event=view_sync module=view status=closed view={name}");
}
