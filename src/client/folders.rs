//! Folder endpoints.

use futures::{Stream, TryStreamExt};

use super::IceClient;
use crate::error::{Error, Result};
use crate::pagination::{self, FetchOptions, Page};
use crate::progress::Progress;
use crate::suggest::did_you_mean;
use crate::types::{Collection, Entry, Folder};

/// Options for enumerating a folder's entries. The default fetches
/// everything, silently.
#[derive(Default)]
pub struct EntryQuery<'a> {
    /// Server-side filter: only entries whose name or part id contains
    /// this string.
    pub filter: Option<String>,

    /// Stop after this many entries.
    pub limit: Option<u64>,

    /// Sink advanced once per fetched page.
    pub progress: Option<&'a mut (dyn Progress + Send)>,
}

impl IceClient {
    /// Folder details (GET `folders/{id}`).
    pub async fn folder(&self, id: i64) -> Result<Folder> {
        self.get_json(&format!("folders/{id}"), &[]).await
    }

    /// Lazily enumerate a folder's entries in server order.
    ///
    /// Entries stream out page by page; dropping the stream abandons
    /// the remaining pages. For folders with tens of thousands of
    /// entries this avoids holding everything in memory at once.
    pub fn folder_entries_stream<'a>(
        &'a self,
        folder_id: i64,
        query: EntryQuery<'a>,
    ) -> impl Stream<Item = Result<Entry>> + 'a {
        let page_size = self.page_size();
        let endpoint = format!("folders/{folder_id}/entries");
        let filter = query.filter;

        let fetch_page = move |offset: u64| {
            let mut params = vec![
                ("limit", page_size.to_string()),
                ("offset", offset.to_string()),
            ];
            if let Some(filter) = &filter {
                params.push(("filter", filter.clone()));
            }
            let endpoint = endpoint.clone();
            async move { self.get_json::<Page<Entry>>(&endpoint, &params).await }
        };

        pagination::fetch_all(
            fetch_page,
            page_size,
            FetchOptions {
                limit: query.limit,
                stop_when: None,
                progress: query.progress,
            },
        )
    }

    /// Eager counterpart of [`IceClient::folder_entries_stream`].
    pub async fn folder_entries<'a>(
        &'a self,
        folder_id: i64,
        query: EntryQuery<'a>,
    ) -> Result<Vec<Entry>> {
        self.folder_entries_stream(folder_id, query)
            .try_collect()
            .await
    }

    /// Resolve a folder name to its id within a collection.
    ///
    /// Unknown names error with did-you-mean suggestions; a name used
    /// by several folders errors with every candidate id.
    pub async fn folder_id_by_name(&self, name: &str, collection: Collection) -> Result<i64> {
        let folders = self.collection_folders(collection).await?;

        let mut ids: Vec<i64> = folders
            .iter()
            .filter(|folder| folder.name == name)
            .map(|folder| folder.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        match ids.as_slice() {
            [] => Err(Error::UnknownName {
                kind: "folder",
                name: name.to_string(),
                suggestions: did_you_mean(name, folders.iter().map(|f| f.name.as_str())),
            }),
            [id] => Ok(*id),
            _ => Err(Error::AmbiguousName {
                kind: "folder",
                name: name.to_string(),
                ids,
            }),
        }
    }
}
