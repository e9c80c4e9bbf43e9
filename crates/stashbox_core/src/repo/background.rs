//! Async surface over the blocking repositories.
//!
//! SQLite calls hold the connection lock and do file I/O, so async callers
//! hand them to Tokio's blocking pool instead of running them on a worker.

use super::{RepoError, RepoResult, Repository};
use crate::store::TableStream;
use log::error;
use tokio::runtime::Handle;

/// Runs `f` on the blocking pool of the current Tokio runtime.
pub(crate) async fn run_blocking<T, F>(op: &'static str, f: F) -> RepoResult<T>
where
    F: FnOnce() -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = Handle::try_current().map_err(|err| RepoError::Runtime(err.to_string()))?;
    handle.spawn_blocking(f).await.map_err(|err| {
        error!("event=blocking_task module=repo status=error op={op} error={err}");
        RepoError::Runtime(format!("{op}: {err}"))
    })?
}

/// Repository adapter whose operations can be awaited.
///
/// Semantics match the wrapped [`Repository`] exactly; only the thread the
/// work runs on differs.
#[derive(Clone)]
pub struct AsyncRepository<R> {
    repo: R,
}

impl<R> AsyncRepository<R>
where
    R: Repository + Clone + Send + 'static,
    R::Entity: Clone + Send + 'static,
    R::Id: Send + 'static,
    R::Update: Clone + Send + 'static,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The wrapped blocking repository.
    pub fn blocking(&self) -> &R {
        &self.repo
    }

    /// Subscribing never touches SQLite, so this stays synchronous.
    pub fn observe_all(&self) -> TableStream<R::Entity> {
        self.repo.observe_all()
    }

    pub async fn list_all(&self) -> RepoResult<Vec<R::Entity>> {
        let repo = self.repo.clone();
        run_blocking("list_all", move || repo.list_all()).await
    }

    pub async fn get(&self, id: R::Id) -> RepoResult<Option<R::Entity>> {
        let repo = self.repo.clone();
        run_blocking("get", move || repo.get(id)).await
    }

    pub async fn insert(&self, entity: &R::Entity) -> RepoResult<R::Entity> {
        let repo = self.repo.clone();
        let entity = entity.clone();
        run_blocking("insert", move || repo.insert(&entity)).await
    }

    pub async fn insert_all(&self, entities: &[R::Entity]) -> RepoResult<Vec<R::Entity>> {
        let repo = self.repo.clone();
        let entities = entities.to_vec();
        run_blocking("insert_all", move || repo.insert_all(&entities)).await
    }

    pub async fn update(&self, update: &R::Update) -> RepoResult<R::Entity> {
        let repo = self.repo.clone();
        let update = update.clone();
        run_blocking("update", move || repo.update(&update)).await
    }

    pub async fn delete(&self, id: R::Id) -> RepoResult<()> {
        let repo = self.repo.clone();
        run_blocking("delete", move || repo.delete(id)).await
    }

    pub async fn clear(&self) -> RepoResult<()> {
        let repo = self.repo.clone();
        run_blocking("clear", move || repo.clear()).await
    }
}
