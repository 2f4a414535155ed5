//! Data API client: the GraphQL wire contract used by every command.
//!
//! Blocking reqwest client authenticated with a static API key. Covers the
//! list/get/create/update operations the migrations consume and exposes
//! the paginated lists as [`rostersync_recon::PageSource`]s.
//!
//! No retries. A failed request is returned to the caller as-is.

mod client;
mod ops;
mod pages;
mod queries;

pub use client::{DataApiError, DataClient, GraphqlError, PAGE_LIMIT};
pub use ops::CreatedUser;
pub use pages::{ProfilePages, SubmissionPages, UserPages};
