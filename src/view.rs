//! Result panel presentation derived from the generation state.

use crate::controller::GenerationResult;

/// File name offered when saving a generated image.
pub const DOWNLOAD_FILE_NAME: &str = "product-shot.png";

/// Offer to save the generated image under a suggested name.
///
/// The reference is handed over as-is; nothing is fetched or transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOffer {
    /// The stored image reference.
    pub href: String,
    /// Suggested file name.
    pub file_name: String,
}

/// What the result panel shows.
///
/// Failures are not shown here; they surface as notices and the panel falls
/// back to the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    /// No image yet.
    Placeholder,
    /// A request is in flight.
    Pending,
    /// The generated image and its download action.
    Image {
        /// Reference to display.
        reference: String,
        /// Download action for `reference`.
        download: DownloadOffer,
    },
}

impl ResultView {
    /// Derive the panel from the current result.
    #[must_use]
    pub fn from_result(result: &GenerationResult) -> Self {
        match result {
            GenerationResult::Absent | GenerationResult::Failed(_) => Self::Placeholder,
            GenerationResult::Pending(_) => Self::Pending,
            GenerationResult::Ready(reference) => Self::Image {
                reference: reference.clone(),
                download: DownloadOffer {
                    href: reference.clone(),
                    file_name: DOWNLOAD_FILE_NAME.to_string(),
                },
            },
        }
    }

    /// The download action, when an image is shown.
    #[must_use]
    pub fn download(&self) -> Option<&DownloadOffer> {
        match self {
            Self::Image { download, .. } => Some(download),
            _ => None,
        }
    }

    /// Panel text for the non-image states.
    #[must_use]
    pub fn caption(&self) -> &str {
        match self {
            Self::Placeholder => "Generated image will appear here",
            Self::Pending => "Generating your product shot...",
            Self::Image { reference, .. } => reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_failed_show_placeholder() {
        assert_eq!(ResultView::from_result(&GenerationResult::Absent), ResultView::Placeholder);
        assert_eq!(
            ResultView::from_result(&GenerationResult::Failed("boom".into())),
            ResultView::Placeholder
        );
        assert_eq!(ResultView::Placeholder.caption(), "Generated image will appear here");
        assert!(ResultView::Placeholder.download().is_none());
    }

    #[test]
    fn ready_offers_download_of_same_reference() {
        let view = ResultView::from_result(&GenerationResult::Ready("https://x/y.png".into()));
        let offer = view.download().unwrap();
        assert_eq!(offer.href, "https://x/y.png");
        assert_eq!(offer.file_name, DOWNLOAD_FILE_NAME);
        assert_eq!(view.caption(), "https://x/y.png");
    }
}
