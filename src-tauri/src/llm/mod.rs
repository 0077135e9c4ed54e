//! Remote vision-model service: catalog listing and generation requests.
//!
//! Both clients sit behind traits so the workflow can be driven by fakes
//! in tests and by the Gemini REST clients in the app.

pub mod api;
pub mod catalog;
pub mod models;
pub mod prompts;
pub mod vision;

pub use catalog::{CatalogError, GeminiCatalog, ModelCatalog};
pub use models::ModelDescriptor;
pub use vision::{GeminiVision, GenerationError, VisionClient};
