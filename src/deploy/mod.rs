//! Publish-or-skip deployment of compiled process documents.
//!
//! The manager persists every document into a [`DefinitionStore`] and
//! registers it with an [`ExecutionEngine`] only when the engine does not
//! already have that `(id, version)` cached.

use crate::error::{DeploymentError, DeploymentFailure};
use std::fmt;

pub mod engine;
pub mod store;

pub use engine::{DefinitionHandle, ExecutionEngine, InMemoryExecutionEngine};
pub use store::{DefinitionStore, FileDefinitionStore, InMemoryDefinitionStore};

/// What to do when the store already holds a document for the same `(id, version)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Replace the stored document and continue.
    #[default]
    Overwrite,
    /// Leave the stored document untouched and continue.
    Keep,
    /// Fail the deployment if the stored document differs from the new one.
    Reject,
}

/// Progress of a single deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Created,
    CheckedExisting,
    SkipRegister,
    Register,
    Deployed,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployState::Created => "created",
            DeployState::CheckedExisting => "checked-existing",
            DeployState::SkipRegister => "skip-register",
            DeployState::Register => "register",
            DeployState::Deployed => "deployed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub handle: DefinitionHandle,
    /// A document for this key was already in the store.
    pub overwritten: bool,
    /// The document was submitted to the engine during this call.
    pub registered: bool,
    pub state: DeployState,
}

/// Persists process documents and registers them with the engine at most once per key.
///
/// The existence checks are read-then-act and are not atomic: two concurrent
/// deployments of the same key may both register. The engine's registration
/// API is expected to tolerate that.
pub struct DeploymentManager<S, E> {
    store: S,
    engine: E,
    overwrite_policy: OverwritePolicy,
}

impl<S, E> DeploymentManager<S, E>
where
    S: DefinitionStore,
    E: ExecutionEngine,
{
    pub fn new(store: S, engine: E) -> Self {
        Self {
            store,
            engine,
            overwrite_policy: OverwritePolicy::default(),
        }
    }

    pub fn with_overwrite_policy(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn overwrite_policy(&self) -> OverwritePolicy {
        self.overwrite_policy
    }

    /// Stores `document` under `(id, version)` and registers it with the
    /// engine unless the engine already has that key cached.
    pub fn deploy(
        &self,
        id: &str,
        version: &str,
        document: &str,
    ) -> Result<DeploymentReceipt, DeploymentError> {
        let fail = |source: DeploymentFailure| DeploymentError::new(id, version, source);
        let mut state = DeployState::Created;
        log::debug!("Deployment of '{}' (version {}): {}", id, version, state);

        let existing = self
            .store
            .get_document(id, version)
            .map_err(|e| fail(e.into()))?;
        state = transition(id, version, state, DeployState::CheckedExisting);

        let overwritten = existing.is_some();
        match (&existing, self.overwrite_policy) {
            (None, _) => self.save(id, version, document).map_err(fail)?,
            (Some(_), OverwritePolicy::Overwrite) => {
                log::info!(
                    "Process definition '{}' (version {}) already stored, overwriting it",
                    id,
                    version
                );
                self.save(id, version, document).map_err(fail)?;
            }
            (Some(_), OverwritePolicy::Keep) => {
                log::warn!(
                    "Process definition '{}' (version {}) already stored, keeping the stored document",
                    id,
                    version
                );
            }
            (Some(stored), OverwritePolicy::Reject) => {
                if stored != document {
                    return Err(fail(DeploymentFailure::VersionConflict));
                }
                log::info!(
                    "Process definition '{}' (version {}) already stored with identical content",
                    id,
                    version
                );
            }
        }

        let cached = self
            .engine
            .cached_definition(id, version)
            .map_err(|e| fail(e.into()))?;

        let (handle, registered) = match cached {
            Some(handle) => {
                state = transition(id, version, state, DeployState::SkipRegister);
                log::info!(
                    "Process definition '{}' (version {}) already cached by the engine, skipping registration",
                    id,
                    version
                );
                (handle, false)
            }
            None => {
                state = transition(id, version, state, DeployState::Register);
                let handle = self
                    .engine
                    .register_definition(document)
                    .map_err(|e| fail(e.into()))?;
                (handle, true)
            }
        };

        state = transition(id, version, state, DeployState::Deployed);
        Ok(DeploymentReceipt {
            handle,
            overwritten,
            registered,
            state,
        })
    }

    fn save(&self, id: &str, version: &str, document: &str) -> Result<(), DeploymentFailure> {
        self.store
            .save_document(id, version, document)
            .map_err(DeploymentFailure::from)
    }
}

fn transition(id: &str, version: &str, from: DeployState, to: DeployState) -> DeployState {
    log::debug!(
        "Deployment of '{}' (version {}): {} -> {}",
        id,
        version,
        from,
        to
    );
    to
}
