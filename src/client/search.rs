//! Full-text search (POST `search`).
//!
//! Search pages carry `resultCount`/`results` instead of the listing
//! spelling, which [`Page`] absorbs. Results arrive most relevant
//! first, so a score threshold doubles as an early-termination point:
//! once one result falls below it, no further page is worth fetching.

use futures::{Stream, TryStreamExt};
use serde::Serialize;

use super::IceClient;
use crate::error::Result;
use crate::pagination::{self, FetchOptions, Page};
use crate::progress::Progress;
use crate::types::SearchResult;

/// Options for a search. The default fetches every result, silently.
#[derive(Default)]
pub struct SearchQuery<'a> {
    /// Stop fetching once a result scores below this threshold.
    pub min_score: Option<f64>,

    /// Stop after this many results.
    pub limit: Option<u64>,

    /// Sink advanced once per fetched page.
    pub progress: Option<&'a mut (dyn Progress + Send)>,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    #[serde(rename = "queryString")]
    query_string: &'a str,
    parameters: SearchParameters,
}

#[derive(Serialize)]
struct SearchParameters {
    start: u64,
    #[serde(rename = "retrieveCount")]
    retrieve_count: u64,
}

impl IceClient {
    /// Lazily enumerate search results, most relevant first.
    ///
    /// With a `min_score`, the first result scoring below the
    /// threshold terminates the stream; that sentinel result is still
    /// yielded. [`IceClient::search`] drops it. Search responses are
    /// never cached.
    pub fn search_stream<'a>(
        &'a self,
        query: &'a str,
        options: SearchQuery<'a>,
    ) -> impl Stream<Item = Result<SearchResult>> + 'a {
        let page_size = self.page_size();

        let fetch_page = move |offset: u64| {
            let body = SearchBody {
                query_string: query,
                parameters: SearchParameters {
                    start: offset,
                    retrieve_count: page_size.get(),
                },
            };
            async move { self.post_json::<Page<SearchResult>, _>("search", &body).await }
        };

        let stop_when = options.min_score.map(|threshold| {
            Box::new(move |result: &SearchResult| result.score < threshold)
                as Box<dyn FnMut(&SearchResult) -> bool + Send>
        });

        pagination::fetch_all(
            fetch_page,
            page_size,
            FetchOptions {
                limit: options.limit,
                stop_when,
                progress: options.progress,
            },
        )
    }

    /// Eager counterpart of [`IceClient::search_stream`]. Results
    /// below `min_score` are dropped rather than yielded.
    pub async fn search<'a>(
        &'a self,
        query: &'a str,
        options: SearchQuery<'a>,
    ) -> Result<Vec<SearchResult>> {
        let min_score = options.min_score;
        let mut results: Vec<SearchResult> =
            self.search_stream(query, options).try_collect().await?;
        if let Some(threshold) = min_score {
            results.retain(|result| result.score >= threshold);
        }
        Ok(results)
    }
}
