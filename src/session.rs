//! Runtime that drives a [`GenerationController`].
//!
//! The session executes controller effects: dispatched requests run as
//! spawned tasks bounded by the request timeout, and their outcome comes back
//! through a channel as [`Message::GenerationFinished`]. Everything else
//! (notices, download offers) is handed to the caller for display.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::{Effect, GenerationController, GenerationResult, Message, NoticeLevel};
use crate::error::{AppError, GenerateError};
use crate::output::{format_notice, format_offer, format_ratios, format_status, format_view};
use crate::params::AspectRatio;
use crate::ports::GenerationService;
use crate::upload::PickedFile;

/// Commands understood by the interactive session.
pub const HELP: &str = "\
Commands:
  image <path>    select the product photo
  prompt <text>   describe the scene
  ratio <token>   choose 1:1, 4:3, 16:9 or 9:16
  ratios          list aspect ratios
  generate        submit the generation request
  download        show the download link for the generated image
  status          show the form and result
  help            show this help
  quit            leave the session";

/// Owns a controller and executes its effects.
pub struct Session {
    controller: GenerationController,
    service: Arc<dyn GenerationService>,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    in_flight: Option<JoinHandle<()>>,
}

impl Session {
    /// Session sending requests to `service`, each bounded by `timeout`.
    pub fn new(
        controller: GenerationController,
        service: Arc<dyn GenerationService>,
        timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            service,
            timeout,
            tx,
            rx,
            in_flight: None,
        }
    }

    /// The controller being driven.
    #[must_use]
    pub fn controller(&self) -> &GenerationController {
        &self.controller
    }

    /// Apply a message, start any dispatched request, and return the
    /// remaining effects for display.
    pub fn dispatch(&mut self, message: Message) -> Vec<Effect> {
        let mut shown = Vec::new();
        for effect in self.controller.update(message) {
            match effect {
                Effect::Dispatch { id, request } => {
                    let service = Arc::clone(&self.service);
                    let tx = self.tx.clone();
                    let bound = self.timeout;
                    self.in_flight = Some(tokio::spawn(async move {
                        let outcome =
                            match tokio::time::timeout(bound, service.generate(&request)).await {
                                Ok(result) => result,
                                Err(_) => Err(GenerateError::Timeout(bound)),
                            };
                        // A recording session unwraps its recorder once the last result lands.
                        drop(service);
                        if tx.send(Message::GenerationFinished { id, outcome }).is_err() {
                            tracing::debug!(%id, "session closed before generation finished");
                        }
                    }));
                }
                other => shown.push(other),
            }
        }
        shown
    }

    /// Wait for the in-flight request to report back and apply its outcome.
    ///
    /// Only call this while [`GenerationController::is_submitting`] holds.
    pub async fn next_completion(&mut self) -> Vec<Effect> {
        match self.rx.recv().await {
            Some(message) => self.dispatch(message),
            None => Vec::new(),
        }
    }

    /// Wait until no request is in flight.
    pub async fn settle(&mut self) -> Vec<Effect> {
        let mut shown = Vec::new();
        while self.controller.is_submitting() {
            shown.extend(self.next_completion().await);
        }
        shown
    }

    /// Abort the in-flight request, if any, and wait until its task has
    /// released the service.
    pub async fn abandon(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "in-flight generation abandoned");
            }
        }
    }
}

/// Run a single select, prompt, submit, and await cycle.
///
/// The success notice and the result panel are written to `out`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when the image or prompt is missing and
/// [`AppError::GenerationFailed`] when the request fails.
pub async fn run_once<W: Write>(
    session: &mut Session,
    image: Option<PickedFile>,
    prompt: String,
    out: &mut W,
) -> Result<(), AppError> {
    if let Some(file) = image {
        session.dispatch(Message::SelectImage(file));
    }
    session.dispatch(Message::SetPrompt(prompt));

    let mut effects = session.dispatch(Message::Submit);
    if !session.controller().is_submitting() {
        let text = first_error(&effects).unwrap_or_default();
        return Err(AppError::Validation(text));
    }
    effects.extend(session.settle().await);

    if let GenerationResult::Failed(message) = session.controller().result() {
        return Err(AppError::GenerationFailed(message.clone()));
    }
    render_effects(&effects, out)?;
    writeln!(out, "{}", format_view(&session.controller().view()))?;
    Ok(())
}

/// A parsed interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick a new source image.
    Image(PathBuf),
    /// Replace the prompt text.
    Prompt(String),
    /// Choose an aspect ratio.
    Ratio(AspectRatio),
    /// List aspect ratios.
    Ratios,
    /// Submit.
    Generate,
    /// Ask for the download offer.
    Download,
    /// Show form and result.
    Status,
    /// Show help.
    Help,
    /// End the session.
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// The `prompt` argument is kept exactly as typed after the single separator
/// following the command word.
///
/// # Errors
///
/// Returns a message describing the problem for unknown commands or bad
/// arguments.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_start();
    if line.trim_end().is_empty() {
        return Ok(None);
    }
    let (word, typed) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = typed.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "image" | "img" => {
            if rest.is_empty() {
                return Err("Usage: image <path>".to_string());
            }
            Command::Image(PathBuf::from(rest))
        }
        "prompt" => Command::Prompt(typed.to_string()),
        "ratio" => Command::Ratio(rest.parse()?),
        "ratios" => Command::Ratios,
        "generate" | "gen" => Command::Generate,
        "download" => Command::Download,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(Some(command))
}

/// Run the interactive loop until `quit` or end of input.
///
/// Input keeps being read while a request is in flight. A line that is not
/// valid UTF-8 is reported and skipped. On end of input the loop waits for an
/// in-flight request to settle before returning; on `quit` the request is
/// abandoned.
///
/// # Errors
///
/// Returns an error if writing output fails.
pub async fn run_interactive<R, W>(
    session: &mut Session,
    mut input: R,
    out: &mut W,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut buf = Vec::new();
    let mut input_open = true;
    writeln!(out, "{HELP}")?;

    loop {
        if !input_open && !session.controller().is_submitting() {
            break;
        }
        let submitting = session.controller().is_submitting();

        tokio::select! {
            read = input.read_until(b'\n', &mut buf), if input_open => {
                match read {
                    Ok(0) => input_open = false,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read input");
                        writeln!(out, "✖ {e}")?;
                        input_open = false;
                    }
                }
                if buf.is_empty() {
                    continue;
                }
                let raw = std::mem::take(&mut buf);
                let Ok(line) = std::str::from_utf8(&raw) else {
                    writeln!(out, "✖ Input line is not valid UTF-8")?;
                    continue;
                };
                match parse_command(line.trim_end_matches(['\n', '\r'])) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => execute(session, command, out)?,
                    Ok(None) => {}
                    Err(e) => writeln!(out, "✖ {e}")?,
                }
            }
            effects = session.next_completion(), if submitting => {
                render_effects(&effects, out)?;
                writeln!(out, "{}", format_view(&session.controller().view()))?;
            }
        }
    }

    if session.controller().is_submitting() {
        writeln!(out, "Leaving with a generation still in flight; its result is dropped.")?;
        session.abandon().await;
    }
    Ok(())
}

fn execute<W: Write>(
    session: &mut Session,
    command: Command,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        Command::Image(path) => match PickedFile::from_path(&path) {
            Ok(file) => {
                let name = file.file_name.clone();
                session.dispatch(Message::SelectImage(file));
                let preview = session
                    .controller()
                    .upload()
                    .current()
                    .and_then(|img| img.preview_path())
                    .map_or_else(
                        || "no preview".to_string(),
                        |p| format!("preview {}", p.display()),
                    );
                writeln!(out, "Selected {name} ({preview})")?;
            }
            Err(e) => writeln!(out, "✖ {e}")?,
        },
        Command::Prompt(text) => {
            session.dispatch(Message::SetPrompt(text));
        }
        Command::Ratio(ratio) => {
            session.dispatch(Message::SelectRatio(ratio));
            writeln!(out, "Aspect ratio: {ratio} ({})", ratio.description())?;
        }
        Command::Ratios => writeln!(out, "{}", format_ratios(session.controller().ratio()))?,
        Command::Generate => {
            if session.controller().is_submitting() {
                writeln!(out, "Generate is disabled while a request is in flight.")?;
                return Ok(());
            }
            let effects = session.dispatch(Message::Submit);
            render_effects(&effects, out)?;
            if session.controller().is_submitting() {
                writeln!(out, "{}", format_view(&session.controller().view()))?;
                writeln!(out, "Processing your image... This may take up to a minute")?;
            }
        }
        Command::Download => {
            let effects = session.dispatch(Message::Download);
            if effects.is_empty() {
                writeln!(out, "Nothing to download yet.")?;
            }
            render_effects(&effects, out)?;
        }
        Command::Status => writeln!(out, "{}", format_status(session.controller()))?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn render_effects<W: Write>(effects: &[Effect], out: &mut W) -> std::io::Result<()> {
    for effect in effects {
        match effect {
            Effect::Notify(notice) => writeln!(out, "{}", format_notice(notice))?,
            Effect::OfferDownload(offer) => writeln!(out, "{}", format_offer(offer))?,
            Effect::Dispatch { .. } => {}
        }
    }
    Ok(())
}

fn first_error(effects: &[Effect]) -> Option<String> {
    effects.iter().find_map(|e| match e {
        Effect::Notify(n) if n.level == NoticeLevel::Error => Some(n.text.clone()),
        _ => None,
    })
}
