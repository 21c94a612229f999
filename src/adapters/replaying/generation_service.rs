//! Replaying adapter for the `GenerationService` port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{next_interaction, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::generation_service::{
    GenerateFuture, GenerationRequest, GenerationResponse, GenerationService,
};

/// Serves recorded generation results from a cassette.
pub struct ReplayingGenerationService {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGenerationService {
    /// Create a replaying service backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl GenerationService for ReplayingGenerationService {
    fn generate(&self, _request: &GenerationRequest) -> GenerateFuture<'_> {
        let interaction = next_interaction(&self.replayer, "generation_service", "generate");
        Box::pin(async move {
            let interaction = interaction?;
            if let Some(ms) = interaction.latency_ms {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            replay_result::<GenerationResponse>(interaction.output)
        })
    }
}
