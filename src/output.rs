//! Terminal rendering of notices, the result panel, and session status.

use crate::controller::{GenerationController, Notice, NoticeLevel};
use crate::params::AspectRatio;
use crate::view::{DownloadOffer, ResultView};

/// One-line rendering of a notice.
#[must_use]
pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("✔ {}", notice.text),
        NoticeLevel::Error => format!("✖ {}", notice.text),
    }
}

/// Rendering of the result panel.
#[must_use]
pub fn format_view(view: &ResultView) -> String {
    match view {
        ResultView::Image { reference, download } => {
            format!("Image: {reference}\n{}", format_offer(download))
        }
        other => format!("[{}]", other.caption()),
    }
}

/// Rendering of a download offer.
#[must_use]
pub fn format_offer(offer: &DownloadOffer) -> String {
    format!("Download: {} (save as {})", offer.href, offer.file_name)
}

/// Multi-line summary of the form and the result panel.
#[must_use]
pub fn format_status(controller: &GenerationController) -> String {
    let image = controller.upload().current().map_or_else(
        || "(none)".to_string(),
        |img| match img.preview() {
            Some(p) => format!(
                "{} ({} bytes, preview {})",
                img.file_name,
                img.bytes.len(),
                p.path().display()
            ),
            None => format!("{} ({} bytes, no preview)", img.file_name, img.bytes.len()),
        },
    );
    let prompt = controller.prompt().text();
    let prompt = if prompt.is_empty() { "(empty)" } else { prompt };
    let generate = if controller.is_submitting() {
        "generating..."
    } else if controller.can_submit() {
        "ready"
    } else {
        "disabled"
    };

    format!(
        "Image:  {image}\nPrompt: {prompt}\nRatio:  {}\nGenerate: {generate}\n{}",
        controller.ratio(),
        format_view(&controller.view())
    )
}

/// Table of selectable aspect ratios.
#[must_use]
pub fn format_ratios(selected: AspectRatio) -> String {
    AspectRatio::ALL
        .iter()
        .map(|r| {
            let marker = if *r == selected { "*" } else { " " };
            format!("{marker} {:<5} {}", r.token(), r.description())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
