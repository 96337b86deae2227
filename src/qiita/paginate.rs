// src/qiita/paginate.rs
// =============================================================================
// Walks every page of `GET /tags` and collects the results in order.
//
// How it works:
// 1. Request page 1
// 2. Any status other than 200 here means "no data": return an empty list
// 3. Otherwise keep its tags and read the `Total-Count` header
// 4. Work out the last page: floor(total / per_page)
// 5. Request pages 2..=last one after another, appending each page's tags
// 6. The first non-200 status stops the loop; what we have so far is kept
//
// Transport errors, malformed JSON and cancellation abort the whole run and
// nothing collected so far is returned.
//
// The count-derived bound is coarse on purpose: when total is not a multiple
// of per_page the trailing partial page is never requested. Callers that want
// every last tag can switch to `Termination::ShortPage`, which keeps going
// until a page comes back with fewer than per_page tags (at most
// MAX_PAGES pages).
// =============================================================================

use crate::config::Config;
use crate::error::Result;
use log::{debug, info, warn};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use super::client::QiitaClient;
use super::tags::{Sort, Tag, TagQuery};

// Response header carrying the number of tags across all pages
pub const TOTAL_COUNT_HEADER: &str = "Total-Count";

// Qiita serves at most 100 pages of any listing
pub const MAX_PAGES: u32 = 100;

/// When to stop asking for more pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// Stop after page floor(Total-Count / per_page)
    #[default]
    TotalCount,
    /// Stop after the first page holding fewer than per_page tags
    ShortPage,
}

// One fetched page, before its tags are moved into the accumulator
#[derive(Debug)]
struct PageResponse {
    status: StatusCode,
    total_count: u64,
    records: Vec<Tag>,
}

/// Drives the sequential fetch of every tag page.
pub struct TagPaginator<'a> {
    client: &'a QiitaClient,
    per_page: u32,
    sort: Sort,
    termination: Termination,
}

impl<'a> TagPaginator<'a> {
    pub fn new(client: &'a QiitaClient, config: &Config) -> Self {
        Self {
            client,
            per_page: config.per_page,
            sort: config.sort,
            termination: config.termination,
        }
    }

    // Fetches every page and returns all tags in page order
    //
    // Returns:
    //   Ok(tags)  - complete or (after a rejected page) truncated result
    //   Err(e)    - transport failure, bad JSON or cancellation
    pub async fn fetch_all(&self, cancel: &CancellationToken) -> Result<Vec<Tag>> {
        let first = self.fetch_page(1, cancel).await?;
        if !is_accepted(first.status) {
            warn!(
                "first page returned HTTP {}, treating as no data",
                first.status.as_u16()
            );
            return Ok(Vec::new());
        }

        let mut tags = first.records;
        info!(
            "page 1: {} tags (Total-Count: {})",
            tags.len(),
            first.total_count
        );

        match self.termination {
            Termination::TotalCount => {
                let last_page = max_page(first.total_count, self.per_page);
                debug!("last page to request: {}", last_page);

                for page in 2..=last_page {
                    if !self.fetch_into(page, &mut tags, cancel).await? {
                        break;
                    }
                }
            }
            Termination::ShortPage => {
                let mut last_len = tags.len();
                let mut page = 2;
                while last_len >= self.per_page as usize {
                    if page > MAX_PAGES {
                        warn!("reached page limit {}, stopping", MAX_PAGES);
                        break;
                    }
                    let before = tags.len();
                    if !self.fetch_into(page, &mut tags, cancel).await? {
                        break;
                    }
                    last_len = tags.len() - before;
                    page += 1;
                }
            }
        }

        info!("collected {} tags", tags.len());
        Ok(tags)
    }

    // Appends page `page` to `tags`
    //
    // Returns false when the API rejected the page and the loop should stop.
    async fn fetch_into(
        &self,
        page: u32,
        tags: &mut Vec<Tag>,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let response = self.fetch_page(page, cancel).await?;
        if !is_accepted(response.status) {
            warn!(
                "page {} returned HTTP {}, stopping with {} tags",
                page,
                response.status.as_u16(),
                tags.len()
            );
            return Ok(false);
        }

        debug!("page {}: {} tags", page, response.records.len());
        tags.extend(response.records);
        Ok(true)
    }

    async fn fetch_page(&self, page: u32, cancel: &CancellationToken) -> Result<PageResponse> {
        let query = TagQuery::new(page, self.per_page, self.sort);
        let request = self.client.tags_request(&query)?;
        let response = self.client.send(request, cancel).await?;

        let status = response.status();
        debug!("page {}: HTTP {}", page, status.as_u16());
        if !is_accepted(status) {
            return Ok(PageResponse {
                status,
                total_count: 0,
                records: Vec::new(),
            });
        }

        let total_count = total_count(response.headers());
        let records = self.client.json(response, cancel).await?;

        Ok(PageResponse {
            status,
            total_count,
            records,
        })
    }
}

// Only a plain 200 carries a page of tags; 204, 206 and friends are rejections
fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK
}

// Missing or non-numeric headers count as zero
fn total_count(headers: &HeaderMap) -> u64 {
    headers
        .get(TOTAL_COUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

// Last page number to request: floor(total / per_page)
fn max_page(total_count: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total_count / u64::from(per_page);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
