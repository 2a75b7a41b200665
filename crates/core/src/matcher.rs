//! Resolves library items to rating-service records.

use std::sync::Arc;

use tracing::debug;

use crate::lookup::{Lookup, LookupClient, LookupError};
use crate::media_server::LibraryItem;

/// Tries identifier lookups first, then falls back to a title search.
pub struct Matcher {
    lookup: Arc<LookupClient>,
}

impl Matcher {
    pub fn new(lookup: Arc<LookupClient>) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &LookupClient {
        &self.lookup
    }

    /// Find the record for `item`.
    ///
    /// 1. Each recognized external identifier, in order; the first hit wins
    ///    whatever the title says.
    /// 2. Title and year search.
    ///
    /// A transport failure at any step is returned as-is rather than
    /// falling through to a weaker strategy.
    pub async fn resolve(&self, item: &LibraryItem) -> Result<Lookup, LookupError> {
        for id in item.external_ids.iter().filter(|id| id.is_imdb()) {
            match self.lookup.lookup_by_id(id).await? {
                found @ Lookup::Found(_) => {
                    debug!("{} matched by {}://{}", item.display_name(), id.provider, id.value);
                    return Ok(found);
                }
                Lookup::NotFound => {
                    debug!("{} not found by {}://{}", item.display_name(), id.provider, id.value);
                }
            }
        }

        let result = self.lookup.lookup_by_title(&item.title, item.year).await?;
        if result.is_found() {
            debug!("{} matched by title search", item.display_name());
        }
        Ok(result)
    }
}
