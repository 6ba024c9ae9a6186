use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One part record as returned by listing, folder, and part endpoints.
///
/// Endpoints disagree on which fields they include, so everything
/// beyond the identity fields rides along as an opaque map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "partId", default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A folder of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,

    #[serde(rename = "folderName", default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A physical sample of a part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SampleLocation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Nested container chain locating a sample, outermost container
/// first: e.g. a freezer shelf holding a box holding a tube.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleLocation {
    #[serde(rename = "type")]
    pub container: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<SampleLocation>>,
}

impl SampleLocation {
    /// Containers of the chain, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &SampleLocation> {
        std::iter::successors(Some(self), |location| location.child.as_deref())
    }

    /// Display labels joined with `/`, truncated after the container
    /// type `stop_at` (e.g. `"WELL"` or `"TUBE"`).
    pub fn path_string(&self, stop_at: &str) -> String {
        let mut labels = Vec::new();
        for location in self.chain() {
            labels.push(location.display.clone().unwrap_or_default());
            if location.container == stop_at {
                break;
            }
        }
        labels.join("/")
    }
}

/// One search hit: a relevance score plus the matched entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub score: f64,

    #[serde(rename = "entryInfo")]
    pub entry: Entry,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The fixed set of entry collections an ICE instance exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Collection {
    Featured,
    Personal,
    Shared,
    Drafts,
    Pending,
    Deleted,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Featured,
        Collection::Personal,
        Collection::Shared,
        Collection::Drafts,
        Collection::Pending,
        Collection::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Featured => "FEATURED",
            Collection::Personal => "PERSONAL",
            Collection::Shared => "SHARED",
            Collection::Drafts => "DRAFTS",
            Collection::Pending => "PENDING",
            Collection::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FEATURED" => Ok(Collection::Featured),
            "PERSONAL" => Ok(Collection::Personal),
            "SHARED" => Ok(Collection::Shared),
            "DRAFTS" => Ok(Collection::Drafts),
            "PENDING" => Ok(Collection::Pending),
            "DELETED" => Ok(Collection::Deleted),
            _ => Err(format!(
                "unknown collection {s:?} (expected one of FEATURED, PERSONAL, SHARED, DRAFTS, PENDING, DELETED)"
            )),
        }
    }
}
