pub mod aggregate;
pub mod cache;
pub mod normalize;
pub mod score;

pub use aggregate::FeedAggregator;
pub use cache::FeedTableCache;
pub use normalize::TextNormalizer;
pub use score::ObjectivityScorer;
