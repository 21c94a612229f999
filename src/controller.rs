//! Generation request orchestration.
//!
//! [`GenerationController`] owns the form inputs and the single
//! [`GenerationResult`]. Every change goes through [`GenerationController::update`],
//! which consumes a [`Message`] and returns the [`Effect`]s the runtime must
//! perform. The controller never touches the network itself: it asks for a
//! request to be dispatched and is told about the outcome later through
//! [`Message::GenerationFinished`].
//!
//! Lifecycle: `Idle -> Submitting -> (Succeeded | Failed)`, and back to
//! `Submitting` on the next accepted submit. The previous image is dropped
//! the moment a submit is accepted (clear-on-submit).

use std::fmt;

use crate::error::GenerateError;
use crate::form::{PromptField, RatioSelector};
use crate::params::AspectRatio;
use crate::ports::{GenerationRequest, GenerationResponse};
use crate::upload::{PickedFile, UploadSlot};
use crate::view::{DownloadOffer, ResultView};

/// Notice shown when submit is pressed without an image or prompt.
pub const MISSING_INPUT_NOTICE: &str = "Please upload an image and enter a prompt";

/// Notice shown when a generation succeeds.
pub const SUCCESS_NOTICE: &str = "Your product shot is ready!";

/// Identifies one dispatched generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome state of the most recent generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationResult {
    /// Nothing generated yet, or the result was invalidated.
    #[default]
    Absent,
    /// A request is in flight.
    Pending(RequestId),
    /// The service returned an image reference.
    Ready(String),
    /// The last request failed with this user-facing message.
    Failed(String),
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something completed.
    Success,
    /// Something was rejected or failed.
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Events fed into the controller.
#[derive(Debug)]
pub enum Message {
    /// The picker produced a new source image.
    SelectImage(PickedFile),
    /// The prompt text changed.
    SetPrompt(String),
    /// A different aspect ratio was chosen.
    SelectRatio(AspectRatio),
    /// The generate action was triggered.
    Submit,
    /// A dispatched request settled.
    GenerationFinished {
        /// The request that settled.
        id: RequestId,
        /// What the service (or the timeout) produced.
        outcome: Result<GenerationResponse, GenerateError>,
    },
    /// The download action was triggered.
    Download,
}

/// Work the runtime must carry out after an update.
#[derive(Debug)]
pub enum Effect {
    /// Show a transient notice.
    Notify(Notice),
    /// Send `request` to the generation service with the request timeout.
    Dispatch {
        /// Id to report back in [`Message::GenerationFinished`].
        id: RequestId,
        /// The request to send.
        request: GenerationRequest,
    },
    /// Offer the generated image for saving.
    OfferDownload(DownloadOffer),
}

/// Owns the form state and the generation lifecycle.
#[derive(Debug, Default)]
pub struct GenerationController {
    upload: UploadSlot,
    prompt: PromptField,
    ratio: RatioSelector,
    result: GenerationResult,
    next_id: u64,
    submitted_revision: u64,
}

impl GenerationController {
    /// Controller with `ratio` preselected.
    #[must_use]
    pub fn new(ratio: AspectRatio) -> Self {
        Self {
            ratio: RatioSelector::with(ratio),
            ..Self::default()
        }
    }

    /// Apply one message and return the effects to perform.
    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::SelectImage(file) => {
                self.upload.select(file);
                if !self.is_submitting() && self.result != GenerationResult::Absent {
                    tracing::debug!("new source image, clearing previous result");
                    self.result = GenerationResult::Absent;
                }
                Vec::new()
            }
            Message::SetPrompt(text) => {
                self.prompt.set_text(text);
                Vec::new()
            }
            Message::SelectRatio(ratio) => {
                self.ratio.select(ratio);
                Vec::new()
            }
            Message::Submit => self.submit(),
            Message::GenerationFinished { id, outcome } => self.finish(id, outcome),
            Message::Download => {
                self.view().download().cloned().map(Effect::OfferDownload).into_iter().collect()
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if let GenerationResult::Pending(id) = self.result {
            tracing::debug!(%id, "submit ignored, request already in flight");
            return Vec::new();
        }

        let Some(image) = self.upload.current().filter(|_| !self.prompt.is_empty()) else {
            return vec![Effect::Notify(Notice::error(MISSING_INPUT_NOTICE))];
        };

        let request = GenerationRequest {
            file_name: image.file_name.clone(),
            mime_type: image.mime_type.clone(),
            image: image.bytes.clone(),
            prompt: self.prompt.text().to_string(),
            aspect_ratio: self.ratio.selected(),
        };

        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.submitted_revision = self.upload.revision();
        self.result = GenerationResult::Pending(id);

        tracing::info!(%id, aspect_ratio = %request.aspect_ratio, "generation submitted");
        vec![Effect::Dispatch { id, request }]
    }

    fn finish(
        &mut self,
        id: RequestId,
        outcome: Result<GenerationResponse, GenerateError>,
    ) -> Vec<Effect> {
        if self.result != GenerationResult::Pending(id) {
            tracing::debug!(%id, "ignoring completion for a request that is not in flight");
            return Vec::new();
        }

        if self.upload.revision() != self.submitted_revision {
            tracing::info!(%id, "discarding result for a replaced source image");
            self.result = GenerationResult::Absent;
            return Vec::new();
        }

        match outcome {
            Ok(response) => {
                tracing::info!(%id, image_url = %response.image_url, "generation succeeded");
                self.result = GenerationResult::Ready(response.image_url);
                vec![Effect::Notify(Notice::success(SUCCESS_NOTICE))]
            }
            Err(e) => {
                tracing::warn!(%id, "generation failed: {e}");
                let message = e.user_message();
                self.result = GenerationResult::Failed(message.clone());
                vec![Effect::Notify(Notice::error(message))]
            }
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.result, GenerationResult::Pending(_))
    }

    /// Whether the generate action should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.upload.is_filled() && !self.prompt.is_empty() && !self.is_submitting()
    }

    /// The current generation result.
    #[must_use]
    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    /// What the result panel should show.
    #[must_use]
    pub fn view(&self) -> ResultView {
        ResultView::from_result(&self.result)
    }

    /// The upload slot.
    #[must_use]
    pub fn upload(&self) -> &UploadSlot {
        &self.upload
    }

    /// The prompt field.
    #[must_use]
    pub fn prompt(&self) -> &PromptField {
        &self.prompt
    }

    /// The selected aspect ratio.
    #[must_use]
    pub fn ratio(&self) -> AspectRatio {
        self.ratio.selected()
    }
}
