//! Vote filtering and warning-block rendering.

mod filter;
mod format;

pub use filter::{filter, FilterConfig, WarningSet};
pub use format::{format_block, FLAGGED_PREFIX, SAFE_PREFIX, TOPIC_DELIMITER};
