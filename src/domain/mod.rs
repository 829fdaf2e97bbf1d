pub mod feed;
pub mod item;

pub use feed::{FeedDocument, FeedEntry, FeedFormat, FeedMetadata};
pub use item::ExtractedItem;
