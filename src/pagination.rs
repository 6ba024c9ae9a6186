//! Offset-based pagination over listing and search endpoints.
//!
//! ICE listing endpoints return bounded pages: a total result count
//! plus one batch of items starting at a requested offset. The fetcher
//! here turns a per-page callable into a single lazy stream of items,
//! issuing page requests at offsets `0, P, 2P, ...` and yielding items
//! in server order, one page buffered at a time.
//!
//! The first page response carries the total count; it is reused for
//! planning rather than spent on a separate probing call. The stream
//! is single-pass: enumerating twice means fetching twice.

use std::num::NonZeroU64;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::progress::Progress;

/// One bounded batch of items plus the total count of the full result
/// set.
///
/// Listing endpoints spell the fields `count`/`entries`, the search
/// endpoint `resultCount`/`results`; both deserialize into this.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "resultCount")]
    pub count: u64,

    #[serde(rename = "entries", alias = "results", default = "Vec::new")]
    pub items: Vec<T>,
}

/// Knobs for a paginated fetch. The default fetches everything,
/// silently.
pub struct FetchOptions<'a, T> {
    /// Stop after yielding this many items, even if more are
    /// available. A limit of zero yields nothing beyond the initial
    /// count-carrying request.
    pub limit: Option<u64>,

    /// Per-item early-termination check. The triggering item is still
    /// yielded; everything after it, including unfetched pages, is
    /// discarded.
    pub stop_when: Option<Box<dyn FnMut(&T) -> bool + Send + 'a>>,

    /// Sink advanced once per fetched page. `None` is silent.
    pub progress: Option<&'a mut (dyn Progress + Send)>,
}

impl<T> Default for FetchOptions<'_, T> {
    fn default() -> Self {
        Self {
            limit: None,
            stop_when: None,
            progress: None,
        }
    }
}

impl<'a, T> FetchOptions<'a, T> {
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn stop_when(mut self, predicate: impl FnMut(&T) -> bool + Send + 'a) -> Self {
        self.stop_when = Some(Box::new(predicate));
        self
    }

    pub fn progress(mut self, sink: &'a mut (dyn Progress + Send)) -> Self {
        self.progress = Some(sink);
        self
    }
}

/// Lazily fetch every item of a paginated result set.
///
/// `fetch_page` maps an offset to one page response; `page_size` must
/// match the batch size the callable requests. Items stream out in
/// server order. Any error from `fetch_page` is yielded verbatim and
/// terminates the stream; there is no retry and no partial-result
/// recovery.
///
/// The total count is read from the first page and never re-validated
/// against later pages; a result set mutating mid-enumeration may
/// produce duplicate or missing items.
pub fn fetch_all<'a, T, E, F, Fut>(
    mut fetch_page: F,
    page_size: NonZeroU64,
    mut options: FetchOptions<'a, T>,
) -> impl Stream<Item = Result<T, E>> + 'a
where
    T: 'a,
    E: 'a,
    F: FnMut(u64) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, E>> + 'a,
{
    try_stream! {
        let size = page_size.get();
        let mut page = fetch_page(0).await?;
        let goal = match options.limit {
            Some(limit) => page.count.min(limit),
            None => page.count,
        };
        if let Some(progress) = options.progress.as_deref_mut() {
            progress.begin(goal.div_ceil(size));
        }

        let mut yielded: u64 = 0;
        let mut offset: u64 = 0;
        'pages: loop {
            if yielded >= goal {
                break;
            }
            if let Some(progress) = options.progress.as_deref_mut() {
                progress.advance();
            }
            for item in std::mem::take(&mut page.items) {
                let stop = match options.stop_when.as_mut() {
                    Some(predicate) => predicate(&item),
                    None => false,
                };
                yield item;
                yielded += 1;
                if stop || yielded >= goal {
                    break 'pages;
                }
            }
            offset += size;
            if offset >= goal {
                break;
            }
            page = fetch_page(offset).await?;
        }
    }
}

/// Eager counterpart of [`fetch_all`]: drain the stream into a `Vec`.
pub async fn fetch_to_vec<'a, T, E, F, Fut>(
    fetch_page: F,
    page_size: NonZeroU64,
    options: FetchOptions<'a, T>,
) -> Result<Vec<T>, E>
where
    T: 'a,
    E: 'a,
    F: FnMut(u64) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, E>> + 'a,
{
    let stream = fetch_all(fetch_page, page_size, options);
    futures::pin_mut!(stream);
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::future::{Ready, ready};
    use std::rc::Rc;

    fn size(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    /// Fake endpoint serving `0..total` in batches, recording the
    /// offset of every request it receives.
    fn fake_pages(
        total: u64,
        batch: u64,
        offsets: Rc<RefCell<Vec<u64>>>,
    ) -> impl FnMut(u64) -> Ready<Result<Page<u64>, String>> {
        move |offset| {
            offsets.borrow_mut().push(offset);
            let end = offset.saturating_add(batch).min(total);
            let items = if offset >= total {
                Vec::new()
            } else {
                (offset..end).collect()
            };
            ready(Ok(Page {
                count: total,
                items,
            }))
        }
    }

    #[derive(Default)]
    struct Recorded {
        total: Option<u64>,
        ticks: u64,
    }

    impl Progress for Recorded {
        fn begin(&mut self, total_pages: u64) {
            self.total = Some(total_pages);
        }

        fn advance(&mut self) {
            self.ticks += 1;
        }
    }

    #[tokio::test]
    async fn test_yields_all_items_in_server_order() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let mut progress = Recorded::default();
        let items = fetch_to_vec(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::default().progress(&mut progress),
        )
        .await
        .unwrap();

        assert_eq!(items, (0..23).collect::<Vec<_>>());
        assert_eq!(*offsets.borrow(), vec![0, 10, 20]);
        assert_eq!(progress.total, Some(3));
        assert_eq!(progress.ticks, 3);
    }

    #[tokio::test]
    async fn test_limit_caps_items_and_requests() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let mut progress = Recorded::default();
        let items = fetch_to_vec(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::default().limit(15).progress(&mut progress),
        )
        .await
        .unwrap();

        assert_eq!(items, (0..15).collect::<Vec<_>>());
        assert_eq!(*offsets.borrow(), vec![0, 10]);
        assert_eq!(progress.total, Some(2));
        assert_eq!(progress.ticks, 2);
    }

    #[tokio::test]
    async fn test_limit_larger_than_total_is_harmless() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let items = fetch_to_vec(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::default().limit(100),
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 23);
        assert_eq!(*offsets.borrow(), vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_limit_zero_only_issues_the_count_request() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let mut progress = Recorded::default();
        let items = fetch_to_vec(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::default().limit(0).progress(&mut progress),
        )
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(*offsets.borrow(), vec![0]);
        assert_eq!(progress.total, Some(0));
        assert_eq!(progress.ticks, 0);
    }

    #[tokio::test]
    async fn test_empty_result_set() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let items = fetch_to_vec(
            fake_pages(0, 10, offsets.clone()),
            size(10),
            FetchOptions::default(),
        )
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(*offsets.borrow(), vec![0]);
    }

    #[tokio::test]
    async fn test_stop_predicate_halts_mid_page() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let items = fetch_to_vec(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::default().stop_when(|item: &u64| *item == 12),
        )
        .await
        .unwrap();

        // The triggering item is the 13th and is still yielded.
        assert_eq!(items, (0..=12).collect::<Vec<_>>());
        assert_eq!(*offsets.borrow(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_stop_on_last_item_of_page_skips_next_fetch() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let items = fetch_to_vec(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::default().stop_when(|item: &u64| *item == 9),
        )
        .await
        .unwrap();

        assert_eq!(items, (0..10).collect::<Vec<_>>());
        assert_eq!(*offsets.borrow(), vec![0]);
    }

    #[tokio::test]
    async fn test_page_error_propagates_after_earlier_pages() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let fetch = {
            let offsets = offsets.clone();
            move |offset: u64| {
                offsets.borrow_mut().push(offset);
                if offset >= 10 {
                    return ready(Err("boom".to_string()));
                }
                ready(Ok(Page {
                    count: 23,
                    items: (offset..offset + 10).collect::<Vec<u64>>(),
                }))
            }
        };

        let stream = fetch_all(fetch, size(10), FetchOptions::default());
        futures::pin_mut!(stream);

        let mut items = Vec::new();
        let mut error = None;
        while let Some(result) = stream.next().await {
            match result {
                Ok(item) => items.push(item),
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }

        assert_eq!(items, (0..10).collect::<Vec<_>>());
        assert_eq!(error.as_deref(), Some("boom"));
        assert!(stream.next().await.is_none());
        assert_eq!(*offsets.borrow(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_single_item_pages() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let items = fetch_to_vec(
            fake_pages(3, 1, offsets.clone()),
            size(1),
            FetchOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(items, vec![0, 1, 2]);
        assert_eq!(*offsets.borrow(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_lazy_stream_defers_page_requests() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let stream = fetch_all(
            fake_pages(23, 10, offsets.clone()),
            size(10),
            FetchOptions::<u64>::default(),
        );
        futures::pin_mut!(stream);

        // Draining only the first page must not touch later offsets.
        for _ in 0..10 {
            stream.next().await.unwrap().unwrap();
        }
        assert_eq!(*offsets.borrow(), vec![0]);

        stream.next().await.unwrap().unwrap();
        assert_eq!(*offsets.borrow(), vec![0, 10]);
    }

    #[test]
    fn test_page_deserializes_both_endpoint_spellings() {
        let listing: Page<serde_json::Value> =
            serde_json::from_str(r#"{"count": 2, "entries": [{"id": 1}, {"id": 2}]}"#).unwrap();
        assert_eq!(listing.count, 2);
        assert_eq!(listing.items.len(), 2);

        let search: Page<serde_json::Value> =
            serde_json::from_str(r#"{"resultCount": 1, "results": [{"score": 9.5}]}"#).unwrap();
        assert_eq!(search.count, 1);
        assert_eq!(search.items.len(), 1);

        let empty: Page<serde_json::Value> = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert_eq!(empty.count, 0);
        assert!(empty.items.is_empty());
    }
}
