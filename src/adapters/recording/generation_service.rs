//! Recording adapter for the `GenerationService` port.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::generation_service::{GenerateFuture, GenerationRequest, GenerationService};

/// Records generation calls while delegating to an inner service.
pub struct RecordingGenerationService {
    inner: Box<dyn GenerationService>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGenerationService {
    /// Wrap `inner`, writing each call to `recorder`.
    pub fn new(inner: Box<dyn GenerationService>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl GenerationService for RecordingGenerationService {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let started = Instant::now();
            let result = self.inner.generate(&request).await;
            let latency = started.elapsed();
            record_result(&recorder, "generation_service", "generate", &request, &result, latency);
            result
        })
    }
}
