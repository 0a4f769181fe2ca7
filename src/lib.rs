//! mastofollows: list the accounts a Mastodon account follows (or its followers), one handle per line.

pub mod cli;
pub mod fetcher;
pub mod logging;
pub mod model;

// Re-exports for CLI and consumers.
pub use fetcher::{
    ApiClient, ApiClientBuilder, ErrorKind, FetchError, FetchOptions, Fetcher, FollowerStream,
    NextPageToken, Page, Transport,
};
pub use model::{Account, FollowerHandle, Relation};
