//! Collection endpoints.

use super::{EntryQuery, IceClient};
use crate::error::Result;
use crate::types::{Collection, Entry, Folder};

impl IceClient {
    /// Folders of a collection (GET `collections/{c}/folders`).
    pub async fn collection_folders(&self, collection: Collection) -> Result<Vec<Folder>> {
        self.get_json(
            &format!("collections/{}/folders", collection.as_str()),
            &[],
        )
        .await
    }

    /// Every entry across a collection's folders, skipping the folder
    /// ids in `ignored_folders`. Folders are fetched one after the
    /// other; a failure anywhere abandons the whole listing.
    pub async fn collection_entries(
        &self,
        collection: Collection,
        ignored_folders: &[i64],
    ) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for folder in self.collection_folders(collection).await? {
            if ignored_folders.contains(&folder.id) {
                continue;
            }
            entries.extend(
                self.folder_entries(folder.id, EntryQuery::default())
                    .await?,
            );
        }
        Ok(entries)
    }
}
