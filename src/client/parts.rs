//! Part endpoints.

use std::collections::BTreeMap;

use bytes::Bytes;

use super::{EntryQuery, IceClient};
use crate::error::{Error, Result};
use crate::sequence::SequenceFormat;
use crate::suggest::did_you_mean;
use crate::types::{Collection, Entry, Sample};

/// Where to look when resolving a part by name.
#[derive(Debug, Clone)]
pub enum PartScope {
    /// Specific folders, by id.
    Folders(Vec<i64>),
    /// Every folder of a collection.
    Collection(Collection),
}

impl From<Collection> for PartScope {
    fn from(collection: Collection) -> Self {
        PartScope::Collection(collection)
    }
}

impl IceClient {
    /// Part details (GET `parts/{id}`).
    pub async fn part(&self, id: i64) -> Result<Entry> {
        self.get_json(&format!("parts/{id}"), &[]).await
    }

    /// Physical samples of a part (GET `parts/{id}/samples`).
    pub async fn part_samples(&self, id: i64) -> Result<Vec<Sample>> {
        self.get_json(&format!("parts/{id}/samples"), &[]).await
    }

    /// A part's sequence file as text
    /// (GET `file/{id}/sequence/{format}`).
    ///
    /// The text is returned exactly as served; GenBank output may need
    /// [`crate::sequence::normalize_genbank`] before strict parsers
    /// accept it.
    pub async fn part_sequence(&self, id: i64, format: SequenceFormat) -> Result<String> {
        let raw = self.part_sequence_raw(id, format).await?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Raw bytes variant of [`IceClient::part_sequence`], for writing
    /// straight to disk.
    pub async fn part_sequence_raw(&self, id: i64, format: SequenceFormat) -> Result<Bytes> {
        self.get_bytes(&format!("file/{id}/sequence/{}", format.as_str()))
            .await
    }

    /// Resolve a part name to its id by scanning the folders in
    /// `scope`.
    ///
    /// With `use_filter` the name is pushed down as a server-side
    /// filter, which is faster for a one-off lookup; without it the
    /// full folder listings are pulled, which pays off when a response
    /// cache is configured and many names are resolved against the
    /// same folders.
    pub async fn part_id_by_name(
        &self,
        name: &str,
        scope: impl Into<PartScope>,
        use_filter: bool,
    ) -> Result<i64> {
        let folder_ids = match scope.into() {
            PartScope::Folders(ids) => ids,
            PartScope::Collection(collection) => {
                let mut ids: Vec<i64> = self
                    .collection_folders(collection)
                    .await?
                    .into_iter()
                    .map(|folder| folder.id)
                    .collect();
                // Stable folder order keeps cache keys stable too.
                ids.sort_unstable();
                ids
            }
        };

        let mut names_to_ids: BTreeMap<String, Vec<i64>> = BTreeMap::new();
        for folder_id in folder_ids {
            let query = EntryQuery {
                filter: use_filter.then(|| name.to_string()),
                ..EntryQuery::default()
            };
            for entry in self.folder_entries(folder_id, query).await? {
                names_to_ids
                    .entry(entry.name.clone())
                    .or_default()
                    .push(entry.id);
            }
        }

        let Some(ids) = names_to_ids.get(name) else {
            return Err(Error::UnknownName {
                kind: "part",
                name: name.to_string(),
                suggestions: did_you_mean(name, names_to_ids.keys().map(String::as_str)),
            });
        };

        let mut ids = ids.clone();
        ids.sort_unstable();
        ids.dedup();
        match ids.as_slice() {
            [id] => Ok(*id),
            _ => Err(Error::AmbiguousName {
                kind: "part",
                name: name.to_string(),
                ids,
            }),
        }
    }
}
