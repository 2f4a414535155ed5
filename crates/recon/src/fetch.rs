//! Collection Fetcher contract.
//!
//! A collection is pulled page by page until the cursor runs out. Matching
//! needs the whole collection, so any page failure aborts the drain.

use std::fmt;
use std::thread;
use std::time::Duration;

/// One page of a cursor-paginated collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn more(items: Vec<T>, next: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(next.into()),
        }
    }
}

/// A remote collection that can be fetched one page at a time.
pub trait PageSource {
    type Item;
    type Error: fmt::Display;

    /// Name used in progress logs ("users", "student profiles", …).
    fn label(&self) -> &str;

    fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Self::Item>, Self::Error>;
}

#[derive(Debug)]
pub enum DrainError<E> {
    /// A page request failed; the collection is incomplete.
    Page { label: String, page: u32, source: E },
    /// The source handed back the cursor it was just given.
    StuckCursor { label: String, cursor: String },
}

impl<E: fmt::Display> fmt::Display for DrainError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { label, page, source } => {
                write!(f, "fetching {label} failed on page {page}: {source}")
            }
            Self::StuckCursor { label, cursor } => {
                write!(f, "{label} pagination stuck: cursor {cursor} repeated")
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for DrainError<E> {}

/// Pull every page of `source`, sleeping `delay` between requests.
pub fn drain<S: PageSource>(
    source: &S,
    delay: Duration,
) -> Result<Vec<S::Item>, DrainError<S::Error>> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 0u32;

    loop {
        page += 1;
        let fetched = source
            .fetch_page(cursor.as_deref())
            .map_err(|source_err| DrainError::Page {
                label: source.label().to_string(),
                page,
                source: source_err,
            })?;

        let count = fetched.items.len();
        all.extend(fetched.items);
        log::info!(
            "fetched {} {} (total so far: {})",
            count,
            source.label(),
            all.len()
        );

        let next = match fetched.next.filter(|c| !c.is_empty()) {
            Some(next) => next,
            None => break,
        };

        if cursor.as_deref() == Some(next.as_str()) {
            return Err(DrainError::StuckCursor {
                label: source.label().to_string(),
                cursor: next,
            });
        }
        cursor = Some(next);

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    Ok(all)
}
