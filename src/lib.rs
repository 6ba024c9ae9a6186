pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod progress;
pub mod sequence;
pub mod suggest;
pub mod types;

pub use client::{Auth, IceClient};
pub use error::{Error, Result};
pub use pagination::{FetchOptions, Page, fetch_all, fetch_to_vec};
