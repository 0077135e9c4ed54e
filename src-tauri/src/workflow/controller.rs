//! The capture → process → review state machine.
//!
//! `WorkflowController` is the only writer of the current credential,
//! model list, screenshot and result. It lives on the interactive context:
//! user actions call its request methods, which start background jobs, and
//! the job events they produce come back through [`WorkflowController::apply`].

use super::jobs::{CaptureReport, JobDispatcher, JobEvent, ProcessingResult, Screenshot};
use super::state::{Controls, WorkflowState};
use crate::capture::{self, CaptureInvoker, CaptureOutcome, Preview};
use crate::clipboard::ClipboardSink;
use crate::config::{AppConfig, PREVIEW_MAX_HEIGHT, PREVIEW_MAX_WIDTH};
use crate::credentials::{Credential, CredentialStore};
use crate::export;
use crate::llm::{
    models, prompts, CatalogError, GenerationError, ModelCatalog, ModelDescriptor, VisionClient,
};
use crate::markdown;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// External collaborators the workflow drives.
pub struct Services {
    pub catalog: Arc<dyn ModelCatalog>,
    pub capture: Arc<dyn CaptureInvoker>,
    pub vision: Arc<dyn VisionClient>,
    pub clipboard: Box<dyn ClipboardSink>,
}

/// Something the surface must show the user beyond the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    Error { title: String, message: String },
    Warning { title: String, message: String },
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Error { message, .. } | Notice::Warning { message, .. } => message,
        }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub controls: Controls,
    pub status: String,
    pub models: Vec<ModelDescriptor>,
    pub selected_model: Option<String>,
    pub preview: Option<Preview>,
    pub result_html: Option<String>,
    pub prompt_placeholder: &'static str,
}

pub struct WorkflowController {
    config: AppConfig,
    services: Services,
    store: CredentialStore,
    jobs: JobDispatcher,

    state: WorkflowState,
    /// Where a model fetch returns to when it completes.
    resume_state: WorkflowState,
    /// Last credential submitted for a fetch.
    credential: Option<Credential>,
    /// Credential the installed model list was fetched with.
    active_credential: Option<Credential>,
    models: Vec<ModelDescriptor>,
    selected_model: Option<String>,
    screenshot: Option<Screenshot>,
    result: Option<ProcessingResult>,
    status: String,
    notices: Vec<Notice>,
}

impl WorkflowController {
    pub fn new(config: AppConfig, services: Services, jobs: JobDispatcher) -> Self {
        let store = CredentialStore::new(&config.cache_dir);
        Self {
            config,
            services,
            store,
            jobs,
            state: WorkflowState::Idle,
            resume_state: WorkflowState::Idle,
            credential: None,
            active_credential: None,
            models: Vec::new(),
            selected_model: None,
            screenshot: None,
            result: None,
            status: "Ready. Enter API Key to begin.".to_string(),
            notices: Vec::new(),
        }
    }

    // ── Read access ─────────────────────────────────────────────────

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn controls(&self) -> Controls {
        Controls::derive(self.state, !self.models.is_empty())
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn screenshot(&self) -> Option<&Screenshot> {
        self.screenshot.as_ref()
    }

    pub fn result(&self) -> Option<&ProcessingResult> {
        self.result.as_ref()
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.store
    }

    /// Take the notices queued since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            state: self.state,
            controls: self.controls(),
            status: self.status.clone(),
            models: self.models.clone(),
            selected_model: self.selected_model.clone(),
            preview: self.screenshot.as_ref().map(|s| s.preview.clone()),
            result_html: self.result.as_ref().map(|r| r.document.html.clone()),
            prompt_placeholder: prompts::PROMPT_PLACEHOLDER,
        }
    }

    // ── Credential and models ───────────────────────────────────────

    /// Startup: submit the persisted key, or the environment key when
    /// nothing is persisted.
    pub fn bootstrap(&mut self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("[WORKFLOW] {}", e);
                self.status = format!("Could not load API key: {}", e);
                None
            }
        };

        let credential = match stored {
            Some(c) => Some(c),
            None => self.config.env_credential.clone().inspect(|_| {
                log::info!("[WORKFLOW] Using GEMINI_API_KEY from the environment");
            }),
        };

        if let Some(credential) = credential {
            if self.submit(credential) {
                self.status = "API Key loaded. Fetching models...".to_string();
            }
        }
    }

    /// The user entered or edited the key. Starts a model fetch unless the
    /// value is blank, unchanged, or another job is running.
    pub fn submit_credential(&mut self, raw: &str) -> bool {
        match Credential::parse(raw) {
            Some(credential) => self.submit(credential),
            None => false,
        }
    }

    /// Re-fetch models for the current key even though it is unchanged.
    pub fn refresh_models(&mut self) -> bool {
        if self.state.job_in_flight() {
            self.status = "Busy. Wait for the current step to finish.".to_string();
            return false;
        }
        match self.credential.clone() {
            Some(credential) => {
                self.start_fetch(credential);
                true
            }
            None => false,
        }
    }

    fn submit(&mut self, credential: Credential) -> bool {
        if self.credential.as_ref() == Some(&credential) {
            log::debug!("[WORKFLOW] Credential unchanged, not re-fetching");
            return false;
        }
        if self.state.job_in_flight() {
            log::info!("[WORKFLOW] Credential change ignored while {:?}", self.state);
            self.status = "Busy. Wait for the current step to finish.".to_string();
            return false;
        }

        self.credential = Some(credential.clone());
        self.start_fetch(credential);
        true
    }

    fn start_fetch(&mut self, credential: Credential) {
        self.resume_state = self.state;
        self.transition(WorkflowState::AwaitingModelList);
        self.status = "Fetching available models...".to_string();

        let catalog = Arc::clone(&self.services.catalog);
        let crashed_credential = credential.clone();
        self.jobs.dispatch(
            "fetch-models",
            async move {
                let result = catalog.fetch_models(&credential).await;
                JobEvent::ModelsFetched { credential, result }
            },
            move |msg| JobEvent::ModelsFetched {
                credential: crashed_credential,
                result: Err(CatalogError::AuthOrNetwork(format!(
                    "Model fetch task failed: {}",
                    msg
                ))),
            },
        );
    }

    /// Pick a model from the installed list. Unknown ids are ignored.
    pub fn select_model(&mut self, id: &str) -> bool {
        if !self.controls().model_selector {
            return false;
        }
        if !self.models.iter().any(|m| m.id == id) {
            log::warn!("[WORKFLOW] Ignoring unknown model selection {}", id);
            return false;
        }
        self.selected_model = Some(id.to_string());
        true
    }

    // ── Capture ─────────────────────────────────────────────────────

    /// Start an interactive capture. The previous artifact is replaced.
    pub fn request_capture(&mut self) -> bool {
        if !self.controls().capture {
            log::info!("[WORKFLOW] Capture not available while {:?}", self.state);
            return false;
        }

        self.transition(WorkflowState::Capturing);
        self.status = "Taking screenshot... Please select a window.".to_string();

        let invoker = Arc::clone(&self.services.capture);
        let destination = self.config.capture_path.clone();
        self.jobs.dispatch(
            "capture",
            async move {
                let report = match invoker.capture(&destination).await {
                    CaptureOutcome::Success(path) => build_screenshot(path).await,
                    CaptureOutcome::UserCancelled => CaptureReport::Cancelled,
                    CaptureOutcome::Failure(diagnostic) => CaptureReport::Failed(diagnostic),
                };
                JobEvent::CaptureFinished(report)
            },
            |msg| JobEvent::CaptureFinished(CaptureReport::Failed(msg)),
        );
        true
    }

    fn has_capture_artifact(&self) -> bool {
        self.screenshot.as_ref().is_some_and(|s| s.path.exists())
    }

    // ── Processing ──────────────────────────────────────────────────

    /// Send the current screenshot and `user_prompt` to the selected model.
    ///
    /// Without a capture this only queues a warning: no request is made
    /// and the state does not change.
    pub fn request_process(&mut self, user_prompt: &str) -> bool {
        if self.state.job_in_flight() {
            log::info!("[WORKFLOW] Process not available while {:?}", self.state);
            return false;
        }
        if !self.has_capture_artifact() {
            self.warn("No screenshot has been captured yet.");
            return false;
        }
        let (Some(credential), Some(model_id)) =
            (self.active_credential.clone(), self.selected_model.clone())
        else {
            self.warn("No model selected. Enter an API key to load models.");
            return false;
        };
        let Some(image_path) = self.screenshot.as_ref().map(|s| s.path.clone()) else {
            return false;
        };

        self.transition(WorkflowState::Processing);
        self.status = format!("Calling {}...", ModelDescriptor::short_name(&model_id));

        let vision = Arc::clone(&self.services.vision);
        let prompt = prompts::effective_prompt(user_prompt);
        self.jobs.dispatch(
            "generate",
            async move {
                let result = vision
                    .generate(&credential, &model_id, &prompt, &image_path)
                    .await
                    .map(|markdown| {
                        let document = markdown::render(&markdown);
                        ProcessingResult { markdown, document }
                    });
                JobEvent::GenerationFinished(result)
            },
            |msg| JobEvent::GenerationFinished(Err(GenerationError::TaskFailed(msg))),
        );
        true
    }

    // ── Job results ─────────────────────────────────────────────────

    /// Apply a finished job. Must run on the interactive context.
    pub fn apply(&mut self, event: JobEvent) {
        let expected = match &event {
            JobEvent::ModelsFetched { .. } => WorkflowState::AwaitingModelList,
            JobEvent::CaptureFinished(_) => WorkflowState::Capturing,
            JobEvent::GenerationFinished(_) => WorkflowState::Processing,
        };
        if self.state != expected {
            log::warn!(
                "[WORKFLOW] Dropping {} result received while {:?}",
                event.kind(),
                self.state
            );
            return;
        }

        match event {
            JobEvent::ModelsFetched { credential, result } => self.apply_models(credential, result),
            JobEvent::CaptureFinished(report) => self.apply_capture(report),
            JobEvent::GenerationFinished(result) => self.apply_generation(result),
        }
    }

    fn apply_models(
        &mut self,
        credential: Credential,
        result: Result<Vec<ModelDescriptor>, CatalogError>,
    ) {
        let resume = self.resume_state;
        match result {
            Ok(models) => {
                self.selected_model =
                    models::default_selection(&models, &self.config.preferred_model)
                        .map(str::to_string);
                self.models = models;
                self.active_credential = Some(credential.clone());
                self.transition(resume);
                self.status = "Models loaded. Ready to capture.".to_string();

                if let Err(e) = self.store.save(&credential) {
                    log::error!("[WORKFLOW] {}", e);
                    self.status = format!("Could not save API key: {}", e);
                }
            }
            Err(e) => {
                log::error!("[WORKFLOW] Model fetch failed: {}", e);
                self.models.clear();
                self.selected_model = None;
                self.active_credential = None;
                self.transition(resume);
                self.status = "Could not load models.".to_string();
                self.notices.push(Notice::Error {
                    title: "API Error".to_string(),
                    message: format!("Failed to fetch models: {}", e),
                });
            }
        }
    }

    fn apply_capture(&mut self, report: CaptureReport) {
        match report {
            CaptureReport::Ready(screenshot) => {
                log::info!("[WORKFLOW] Screenshot at {}", screenshot.path.display());
                self.screenshot = Some(screenshot);
                self.transition(WorkflowState::Captured);
                self.status = "Screenshot captured. Ready to process.".to_string();
            }
            CaptureReport::Cancelled => {
                self.screenshot = None;
                self.transition(WorkflowState::Idle);
                self.status = "Screenshot cancelled. Ready.".to_string();
            }
            CaptureReport::Failed(diagnostic) => {
                log::warn!("[WORKFLOW] Capture failed: {}", diagnostic);
                self.screenshot = None;
                self.transition(WorkflowState::Idle);
                self.status = format!("Screenshot failed: {}", diagnostic);
            }
        }
    }

    fn apply_generation(&mut self, result: Result<ProcessingResult, GenerationError>) {
        match result {
            Ok(result) => {
                self.result = Some(result);
                self.transition(WorkflowState::ResultReady);
                self.status = "Success! Displaying result.".to_string();
            }
            Err(e) => {
                log::error!("[WORKFLOW] Generation failed: {}", e);
                self.transition(WorkflowState::Captured);
                self.status = "An error occurred.".to_string();
                self.notices.push(Notice::Error {
                    title: "Error".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    // ── Result actions ──────────────────────────────────────────────

    /// Copy the raw Markdown answer to the clipboard.
    pub fn copy_markdown(&mut self) {
        let Some(result) = &self.result else {
            self.status = "Nothing to copy.".to_string();
            return;
        };
        match self.services.clipboard.set_text(&result.markdown) {
            Ok(()) => self.status = "Markdown result copied to clipboard.".to_string(),
            Err(e) => {
                log::error!("[WORKFLOW] {}", e);
                self.notices.push(Notice::Error {
                    title: "Clipboard Error".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Whether there is an answer to save. Sets "Nothing to save." if not.
    pub fn can_save(&mut self) -> bool {
        if self.result.is_none() {
            self.status = "Nothing to save.".to_string();
            return false;
        }
        true
    }

    /// Write the raw Markdown answer to `path` (`.md` added if missing).
    pub fn save_markdown(&mut self, path: &Path) -> Option<PathBuf> {
        let Some(result) = &self.result else {
            self.status = "Nothing to save.".to_string();
            return None;
        };
        match export::save_markdown(path, &result.markdown) {
            Ok(written) => {
                let name = written
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| written.display().to_string());
                self.status = format!("File saved to {}", name);
                Some(written)
            }
            Err(e) => {
                log::error!("[WORKFLOW] {}", e);
                self.notices.push(Notice::Error {
                    title: "Save Error".to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn transition(&mut self, next: WorkflowState) {
        if self.state != next {
            log::info!("[WORKFLOW] {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    fn warn(&mut self, message: &str) {
        log::warn!("[WORKFLOW] {}", message);
        self.notices.push(Notice::Warning {
            title: "Warning".to_string(),
            message: message.to_string(),
        });
    }
}

/// Decode the fresh capture off the async workers. An image that will not
/// decode is reported as a failed capture.
async fn build_screenshot(path: PathBuf) -> CaptureReport {
    let decode_path = path.clone();
    let preview = tokio::task::spawn_blocking(move || {
        capture::load_preview(&decode_path, PREVIEW_MAX_WIDTH, PREVIEW_MAX_HEIGHT)
    })
    .await;

    match preview {
        Ok(Ok(preview)) => CaptureReport::Ready(Screenshot { path, preview }),
        Ok(Err(e)) => CaptureReport::Failed(e.to_string()),
        Err(e) => CaptureReport::Failed(format!("Preview task failed: {}", e)),
    }
}
