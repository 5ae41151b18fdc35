//! Offset/size windowed collections.
//!
//! A paginated endpoint takes `offset` and `size` query parameters and
//! answers with the element array plus the window it actually served:
//!
//! ```text
//! GET reports?offset=20&size=10
//! {"reports": [...], "offset": 20, "size": 10}
//! ```
//!
//! The server's `offset` and `size` win over the requested ones; they may be
//! sent as numbers or numeric strings.

use std::sync::Arc;

use ridgeline_analytics_client::{Executor, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::parser::{parse_elements, ElementParser, Identifiable};

/// Which server-side pages a [`PaginatedCollection`] currently holds.
///
/// Pages `first_page..=page` of `page_size` elements each are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Page the loaded window starts at.
    pub first_page: usize,
    /// Last page loaded.
    pub page: usize,
    /// Elements per page as reported by the server.
    pub page_size: usize,
}

impl Cursor {
    /// Absolute index of the first loaded element.
    pub fn first_index(&self) -> Option<usize> {
        self.first_page.checked_mul(self.page_size)
    }
}

/// A list endpoint loaded one window of pages at a time.
#[derive(Debug)]
pub struct PaginatedCollection<T> {
    executor: Arc<Executor>,
    path: String,
    field: String,
    parser: ElementParser<T>,
    items: Vec<T>,
    cursor: Option<Cursor>,
}

impl<T> PaginatedCollection<T> {
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
            cursor: None,
        }
    }

    /// Fetch the server's default window without paging parameters.
    ///
    /// Replaces all loaded elements. Missing `offset`/`size` in the response
    /// are taken as `0` and the number of elements returned.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn load(&mut self) -> Result<()> {
        let document = self.fetch(None).await?;
        let items = parse_elements(&document, &self.field, &self.parser);
        let (page, page_size) = served_window(&document, 0, items.len());

        self.replace(items, page, page_size);
        Ok(())
    }

    /// Load the first page of `size` elements. Same as `load_page(0, size)`.
    pub async fn load_size(&mut self, size: usize) -> Result<()> {
        self.load_page(0, size).await
    }

    /// Load page `page` of `size` elements, replacing all loaded elements.
    ///
    /// `size` must be positive.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn load_page(&mut self, page: usize, size: usize) -> Result<()> {
        if size == 0 {
            return Err(Error::invalid_argument("page size must be positive"));
        }
        let offset = page.checked_mul(size).ok_or_else(|| {
            Error::invalid_argument(format!("page {} of size {} is out of range", page, size))
        })?;

        let document = self.fetch(Some((offset, size))).await?;
        let items = parse_elements(&document, &self.field, &self.parser);
        let (page, page_size) = served_window(&document, offset, size);

        self.replace(items, page, page_size);
        Ok(())
    }

    /// Append the page after the last loaded one.
    ///
    /// Loads the default window when nothing is loaded yet, and does nothing
    /// (no request) when [`has_next_page`](Self::has_next_page) is false.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn load_next(&mut self) -> Result<()> {
        let cursor = match self.cursor {
            None => return self.load().await,
            Some(cursor) => cursor,
        };
        if !self.has_next_page() {
            debug!("Last page already loaded");
            return Ok(());
        }

        let offset = cursor
            .page
            .checked_add(1)
            .and_then(|next| next.checked_mul(cursor.page_size))
            .ok_or_else(|| {
                Error::invalid_argument(format!("page after {} is out of range", cursor.page))
            })?;

        let document = self.fetch(Some((offset, cursor.page_size))).await?;
        let items = parse_elements(&document, &self.field, &self.parser);
        let (page, page_size) = served_window(&document, offset, cursor.page_size);

        debug!(appended = items.len(), page, page_size, "Loaded next page");
        self.items.extend(items);
        self.cursor = Some(Cursor {
            first_page: cursor.first_page,
            page,
            page_size,
        });
        Ok(())
    }

    /// Whether another page may exist after the loaded ones.
    ///
    /// True while unloaded. Once loaded, true only if every loaded page was
    /// full; an exactly full last page looks the same as more data.
    pub fn has_next_page(&self) -> bool {
        match self.cursor {
            None => true,
            Some(cursor) => {
                cursor.page_size > 0
                    && cursor
                        .page
                        .checked_sub(cursor.first_page)
                        .and_then(|pages| pages.checked_add(1))
                        .and_then(|pages| pages.checked_mul(cursor.page_size))
                        == Some(self.items.len())
            }
        }
    }

    /// Element at absolute index `index`.
    pub fn get(&self, index: usize) -> Result<&T> {
        match self.loaded_range() {
            Some((first, last)) if (first..=last).contains(&index) => Ok(&self.items[index - first]),
            loaded => Err(Error::new(ErrorKind::IndexOutOfBounds { index, loaded })),
        }
    }

    /// Absolute index of the first loaded element, `None` when unloaded or
    /// empty.
    pub fn first_loaded_index(&self) -> Option<usize> {
        self.loaded_range().map(|(first, _)| first)
    }

    /// Absolute index of the last loaded element, `None` when unloaded or
    /// empty.
    pub fn last_loaded_index(&self) -> Option<usize> {
        self.loaded_range().map(|(_, last)| last)
    }

    /// Absolute index of the first loaded element matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let first = self.first_loaded_index()?;
        self.items.iter().position(predicate).map(|i| first + i)
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn page(&self) -> Option<usize> {
        self.cursor.map(|c| c.page)
    }

    pub fn first_page(&self) -> Option<usize> {
        self.cursor.map(|c| c.first_page)
    }

    pub fn page_size(&self) -> Option<usize> {
        self.cursor.map(|c| c.page_size)
    }

    /// Whether a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.cursor.is_some()
    }

    /// The loaded elements, in server order.
    pub fn items(&self) -> &[T] {
        &self.items
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

    fn loaded_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = self.cursor?.first_index()?;
        let last = first.checked_add(self.items.len() - 1)?;
        Some((first, last))
    }

    fn replace(&mut self, items: Vec<T>, page: usize, page_size: usize) {
        debug!(count = items.len(), page, page_size, "Loaded window");
        self.items = items;
        self.cursor = Some(Cursor {
            first_page: page,
            page,
            page_size,
        });
    }

    async fn fetch(&self, window: Option<(usize, usize)>) -> Result<Value> {
        let mut request = RequestBuilder::get(self.path.as_str());
        if let Some((offset, size)) = window {
            request = request
                .query("offset", offset.to_string())
                .query("size", size.to_string());
        }
        self.executor.execute_json(request).await
    }
}

impl<T: PartialEq> PaginatedCollection<T> {
    /// Absolute index of `element` among the loaded elements.
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.position(|item| item == element)
    }

    /// Whether `element` is among the loaded elements.
    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }
}

impl<T: Identifiable> PaginatedCollection<T> {
    /// Absolute index of the loaded element with identifier `id`.
    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.position(|item| item.id() == id)
    }

    /// Whether an element with identifier `id` is loaded.
    pub fn contains_id(&self, id: &str) -> bool {
        self.index_of_id(id).is_some()
    }
}

/// Page and page size of the window the server actually served.
fn served_window(document: &Value, requested_offset: usize, requested_size: usize) -> (usize, usize) {
    let offset = window_field(document, "offset").unwrap_or(requested_offset);
    let size = window_field(document, "size").unwrap_or(requested_size);
    let page = if size > 0 { offset / size } else { 0 };
    (page, size)
}

fn window_field(document: &Value, key: &str) -> Option<usize> {
    match document.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
