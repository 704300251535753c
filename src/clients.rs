pub mod feed;

pub use feed::{FeedClient, FeedError, HttpFeedClient, HttpFeedConfig};
