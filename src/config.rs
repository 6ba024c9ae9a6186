use clap::{Args, Parser, Subcommand};
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{CacheConfig, IceClient};
use crate::sequence::SequenceFormat;
use crate::types::Collection;

#[derive(Debug, Parser)]
#[command(name = "icer")]
#[command(about = "Command-line client for ICE part registries")]
pub struct Config {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Root URL of the ICE instance, e.g. https://ice.genomefoundry.org
    #[arg(long, env = "ICE_ROOT")]
    pub root: String,

    /// API token issued by the instance
    #[arg(
        long,
        env = "ICE_API_TOKEN",
        requires = "api_token_client",
        conflicts_with = "session_id"
    )]
    pub api_token: Option<String>,

    /// Client id the API token was issued for
    #[arg(long, env = "ICE_API_TOKEN_CLIENT")]
    pub api_token_client: Option<String>,

    /// Session id from a login call, alternative to an API token
    #[arg(long, env = "ICE_SESSION_ID")]
    pub session_id: Option<String>,

    /// Entries fetched per request
    #[arg(long, env = "ICE_PAGE_SIZE", default_value = "10")]
    pub page_size: NonZeroU64,

    /// Cache GET responses in memory for this many seconds (0 disables)
    #[arg(long, env = "ICE_CACHE_TTL", default_value = "0")]
    pub cache_ttl: u64,
}

impl ConnectionArgs {
    pub fn build_client(&self) -> crate::Result<IceClient> {
        let mut builder = IceClient::builder(&self.root).page_size(self.page_size);

        if let Some(session_id) = &self.session_id {
            builder = builder.session_id(session_id);
        } else if let (Some(token), Some(client_id)) = (&self.api_token, &self.api_token_client) {
            builder = builder.api_token(client_id, token);
        }

        if self.cache_ttl > 0 {
            builder = builder.cache(CacheConfig {
                time_to_live: Duration::from_secs(self.cache_ttl),
                ..CacheConfig::default()
            });
        }

        builder.build()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the folders of a collection as JSON lines
    Folders {
        #[arg(long, default_value = "personal")]
        collection: Collection,
    },

    /// Stream a folder's entries as JSON lines
    Entries {
        /// Folder id to enumerate
        #[arg(long)]
        folder: i64,

        /// Keep only entries whose name or part id contains this string
        #[arg(long)]
        filter: Option<String>,

        /// Stop after this many entries
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Full-text search, most relevant results first
    Search {
        #[arg(long)]
        query: String,

        /// Drop results scoring below this threshold
        #[arg(long)]
        min_score: Option<f64>,

        /// Stop after this many results
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Download one part's sequence file
    Sequence {
        /// Part id
        #[arg(long)]
        part: i64,

        #[arg(long, default_value = "genbank")]
        format: SequenceFormat,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Find the freezer locations of parts, by name
    Locate {
        /// Part name to look up (repeatable)
        #[arg(long = "name", required = true)]
        names: Vec<String>,

        #[arg(long, default_value = "personal")]
        collection: Collection,
    },

    /// Export a collection: entry listings plus GenBank files
    Export {
        #[arg(long, default_value = "personal")]
        collection: Collection,

        /// Output directory, created if missing
        #[arg(long)]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_token_auth() {
        let config = Config::try_parse_from([
            "icer",
            "--root",
            "https://ice.example.org",
            "--api-token",
            "WHz+BC+7eFV=",
            "--api-token-client",
            "icebot",
            "folders",
            "--collection",
            "shared",
        ])
        .unwrap();
        assert_eq!(config.connection.api_token.as_deref(), Some("WHz+BC+7eFV="));
        assert!(matches!(
            config.command,
            Command::Folders {
                collection: Collection::Shared
            }
        ));
    }

    #[test]
    fn test_token_requires_client_id() {
        let result = Config::try_parse_from([
            "icer",
            "--root",
            "https://ice.example.org",
            "--api-token",
            "abc",
            "folders",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_and_session_conflict() {
        let result = Config::try_parse_from([
            "icer",
            "--root",
            "https://ice.example.org",
            "--api-token",
            "abc",
            "--api-token-client",
            "icebot",
            "--session-id",
            "deadbeef",
            "folders",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_client_without_auth() {
        let config = Config::try_parse_from([
            "icer",
            "--root",
            "https://ice.example.org",
            "--cache-ttl",
            "60",
            "entries",
            "--folder",
            "12",
            "--limit",
            "5",
        ])
        .unwrap();
        assert!(config.connection.build_client().is_ok());
    }
}
