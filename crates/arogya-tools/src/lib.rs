//! External lookups used by the chains.
//!
//! - [`search`]: web search for scheme, wellness and hospital queries.
//! - [`youtube`]: video lookup for yoga recommendations.

pub mod search;
pub mod youtube;

pub use search::{SearchResult, SearchTool, WebSearch};
pub use youtube::{VideoResult, VideoSearch, YouTubeClient};
