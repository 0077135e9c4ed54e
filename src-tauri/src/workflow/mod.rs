//! Orchestration core: workflow state machine and its background jobs.

mod controller;
pub mod jobs;
mod state;

pub use controller::{Notice, Services, WorkflowController, WorkflowSnapshot};
pub use jobs::{
    channel, CaptureReport, JobDispatcher, JobEvent, JobReceiver, ProcessingResult, Screenshot,
};
pub use state::{Controls, WorkflowState};
