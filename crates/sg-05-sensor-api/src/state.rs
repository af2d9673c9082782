//! Shared handler state.

use sg_01_install_auth::{verify, Key, Verifier};
use sg_02_token::TokenProcessor;
use sg_03_events::ParserRegistry;
use sg_04_output::OutputRouter;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the handlers need. Immutable after construction.
pub struct SensorApi {
    pub(crate) tokens: TokenProcessor,
    pub(crate) verifiers: HashMap<Uuid, Vec<Verifier>>,
    pub(crate) registry: Arc<ParserRegistry>,
    pub(crate) outputs: OutputRouter,
}

impl SensorApi {
    /// Build the API state. Verifiers are indexed by their group.
    pub fn new(
        tokens: TokenProcessor,
        verifiers: impl IntoIterator<Item = Verifier>,
        registry: Arc<ParserRegistry>,
        outputs: OutputRouter,
    ) -> Self {
        let mut by_group: HashMap<Uuid, Vec<Verifier>> = HashMap::new();
        for verifier in verifiers {
            by_group.entry(verifier.group).or_default().push(verifier);
        }

        Self {
            tokens,
            verifiers: by_group,
            registry,
            outputs,
        }
    }

    /// Output router events are dispatched to.
    pub fn outputs(&self) -> &OutputRouter {
        &self.outputs
    }

    /// Number of groups with at least one verifier.
    pub fn group_count(&self) -> usize {
        self.verifiers.len()
    }

    /// True if `key` verifies against any verifier of its group.
    ///
    /// Runs the slow hash once per candidate verifier. Call from a blocking
    /// context.
    pub fn is_key_accepted(&self, key: &Key) -> bool {
        self.verifiers
            .get(&key.group)
            .is_some_and(|candidates| candidates.iter().any(|verifier| verify(key, verifier)))
    }
}

impl std::fmt::Debug for SensorApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorApi")
            .field("groups", &self.verifiers.len())
            .field("registry", &self.registry)
            .field("outputs", &self.outputs.len())
            .finish()
    }
}
