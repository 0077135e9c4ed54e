//! Background jobs and the channel that carries their results back.
//!
//! Each user action that blocks (model listing, capture, generation) runs
//! as its own task. A job never touches workflow state: it produces one
//! [`JobEvent`], which the interactive context drains and applies in
//! arrival order.

use crate::capture::Preview;
use crate::credentials::Credential;
use crate::llm::{CatalogError, GenerationError, ModelDescriptor};
use crate::markdown::RenderedDocument;
use std::future::Future;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A capture artifact that decoded cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub path: PathBuf,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureReport {
    Ready(Screenshot),
    Cancelled,
    Failed(String),
}

/// A model answer, kept raw for copy/save and rendered once for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub markdown: String,
    pub document: RenderedDocument,
}

#[derive(Debug)]
pub enum JobEvent {
    ModelsFetched {
        credential: Credential,
        result: Result<Vec<ModelDescriptor>, CatalogError>,
    },
    CaptureFinished(CaptureReport),
    GenerationFinished(Result<ProcessingResult, GenerationError>),
}

impl JobEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            JobEvent::ModelsFetched { .. } => "fetch-models",
            JobEvent::CaptureFinished(_) => "capture",
            JobEvent::GenerationFinished(_) => "generate",
        }
    }
}

pub type JobReceiver = UnboundedReceiver<JobEvent>;

/// Spawns jobs on a runtime and posts their events to the interactive side.
#[derive(Clone)]
pub struct JobDispatcher {
    runtime: Handle,
    events: UnboundedSender<JobEvent>,
}

/// Create a dispatcher bound to `runtime` and the receiver its events go to.
pub fn channel(runtime: Handle) -> (JobDispatcher, JobReceiver) {
    let (events, rx) = mpsc::unbounded_channel();
    (JobDispatcher { runtime, events }, rx)
}

impl JobDispatcher {
    /// Run `job` in the background and post its event.
    ///
    /// If the job panics, `on_crash` turns the panic message into the
    /// job's failure event so the workflow still leaves its busy state.
    pub fn dispatch<F, C>(&self, label: &'static str, job: F, on_crash: C)
    where
        F: Future<Output = JobEvent> + Send + 'static,
        C: FnOnce(String) -> JobEvent + Send + 'static,
    {
        let events = self.events.clone();
        let inner = self.runtime.clone();

        self.runtime.spawn(async move {
            let start = std::time::Instant::now();
            log::info!("[JOBS] {} started", label);

            let event = match inner.spawn(job).await {
                Ok(event) => event,
                Err(e) => {
                    log::error!("[JOBS] {} crashed: {}", label, e);
                    on_crash(e.to_string())
                }
            };

            log::info!("[JOBS] {} finished in {}ms", label, start.elapsed().as_millis());
            if events.send(event).is_err() {
                log::warn!("[JOBS] {} result dropped, interactive side is gone", label);
            }
        });
    }
}
