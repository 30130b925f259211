pub mod links;
pub mod stats;

// Re-export the share-link codec
pub use links::{proxy_to_links, proxy_to_single, proxy_to_uri};

// Re-export the stats aggregator
pub use stats::{generate_stats, stats_to_json};
