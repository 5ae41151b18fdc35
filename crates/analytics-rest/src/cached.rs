//! Whole-list collections that are fetched in one request.

use std::sync::Arc;

use ridgeline_analytics_client::Executor;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::parser::{parse_elements, ElementParser};

/// A list endpoint fetched in full and cached until the next [`load`].
///
/// The response is a JSON object whose `field` holds the element array:
///
/// ```text
/// {"dashboards": [{"id": "d1", ...}, {"id": "d2", ...}]}
/// ```
///
/// [`load`]: CachedCollection::load
#[derive(Debug)]
pub struct CachedCollection<T> {
    executor: Arc<Executor>,
    path: String,
    field: String,
    parser: ElementParser<T>,
    items: Vec<T>,
    loaded: bool,
}

impl<T> CachedCollection<T> {
    /// Create an unloaded collection for the list at `path`.
    pub fn new(
        executor: Arc<Executor>,
        path: impl Into<String>,
        field: impl Into<String>,
        parser: ElementParser<T>,
    ) -> Self {
        Self {
            executor,
            path: path.into(),
            field: field.into(),
            parser,
            items: Vec::new(),
            loaded: false,
        }
    }

    /// Fetch the list, replacing anything loaded before.
    ///
    /// On failure the previous contents are kept.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn load(&mut self) -> Result<()> {
        let document = self.executor.get_json(&self.path).await?;
        self.items = parse_elements(&document, &self.field, &self.parser);
        self.loaded = true;
        debug!(count = self.items.len(), "Loaded collection");
        Ok(())
    }

    /// Fetch the list only if it has never been loaded.
    pub async fn load_first_time(&mut self) -> Result<()> {
        if !self.loaded {
            self.load().await?;
        }
        Ok(())
    }

    /// The cached elements.
    pub fn get(&self) -> &[T] {
        &self.items
    }

    /// Whether a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Endpoint path, relative to the service base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the array field in the response.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl<T: Clone> CachedCollection<T> {
    /// An owned copy of the cached elements.
    pub fn to_list(&self) -> Vec<T> {
        self.items.clone()
    }
}
