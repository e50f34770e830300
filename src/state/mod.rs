//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: lifecycle of the whole crawl session
//! - `PageState`: outcome of each URL taken off the frontier

mod crawl_phase;
mod page_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use page_state::PageState;
