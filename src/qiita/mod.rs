// src/qiita/mod.rs
// =============================================================================
// Everything that talks to the Qiita v2 API.
//
// Submodules:
// - client: builds authenticated requests and sends them
// - tags: the Tag record plus the /tags query parameters
// - paginate: walks all pages of /tags and collects the tags in order
// =============================================================================

mod client;
mod paginate;
mod tags;

pub use client::QiitaClient;
pub use paginate::{TagPaginator, Termination};
pub use tags::{Sort, Tag, MAX_PER_PAGE};
