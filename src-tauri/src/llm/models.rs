//! Model descriptors: which catalog entries are offered, and in what order.
//!
//! The vision filter is a name heuristic: an entry must support
//! `generateContent` and have "vision" or "flash" in its identifier.
//! It does not prove the model accepts images.

use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::LazyLock;

const GENERATE_CONTENT: &str = "generateContent";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.\d+)").unwrap());

/// One selectable backend model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Full resource name, e.g. `models/gemini-2.5-flash`.
    pub id: String,
    pub display_name: Option<String>,
    pub supports_vision: bool,
    pub is_flash: bool,
    /// First `major.minor` number in the identifier, 0.0 if none.
    pub version: f64,
    pub latest: bool,
}

impl ModelDescriptor {
    /// Derive capability tags from the identifier alone.
    pub fn from_id(id: &str) -> Self {
        let version = VERSION_PATTERN
            .captures(id)
            .and_then(|c| c[1].parse::<f64>().ok())
            .unwrap_or(0.0);

        Self {
            id: id.to_string(),
            display_name: None,
            supports_vision: id.contains("vision"),
            is_flash: id.contains("flash"),
            version,
            latest: id.contains("latest"),
        }
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    /// Short name for status lines: `models/gemini-2.5-flash` -> `gemini-2.5-flash`.
    pub fn short_name(id: &str) -> &str {
        id.rsplit('/').next().unwrap_or(id)
    }

    fn is_offered(&self) -> bool {
        self.supports_vision || self.is_flash
    }
}

/// A catalog entry as listed by the service, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub display_name: Option<String>,
    pub generation_methods: Vec<String>,
}

/// Ordering: "latest" first, then higher version, then identifier A-Z.
pub fn compare(a: &ModelDescriptor, b: &ModelDescriptor) -> Ordering {
    b.latest
        .cmp(&a.latest)
        .then_with(|| b.version.total_cmp(&a.version))
        .then_with(|| a.id.cmp(&b.id))
}

/// Keep the vision-capable entries and sort them.
///
/// Returns an empty list when nothing qualifies; the caller decides
/// whether that is an error.
pub fn filter_and_rank(entries: Vec<CatalogEntry>) -> Vec<ModelDescriptor> {
    let mut models: Vec<ModelDescriptor> = entries
        .into_iter()
        .filter(|e| e.generation_methods.iter().any(|m| m == GENERATE_CONTENT))
        .map(|e| ModelDescriptor::from_id(&e.name).with_display_name(e.display_name))
        .filter(ModelDescriptor::is_offered)
        .collect();

    models.sort_by(compare);
    models
}

/// The preferred identifier if offered, else the top-ranked model.
pub fn default_selection<'a>(models: &'a [ModelDescriptor], preferred: &str) -> Option<&'a str> {
    models
        .iter()
        .find(|m| m.id == preferred)
        .or_else(|| models.first())
        .map(|m| m.id.as_str())
}
