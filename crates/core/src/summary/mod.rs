//! Idempotent splicing of the warning block into summary text.
//!
//! The block always starts with the separator and runs to the end of the
//! field. Everything before it is the user's summary and is returned
//! untouched, so stripping and re-adding the block any number of times
//! converges on the same text.

/// Separator that opens the warning block.
pub const DEFAULT_SEPARATOR: &str = "\n\n———— Content Warnings (via DoesTheDogDie.com) ————";

/// Line prefix used by older releases that wrote warnings without a separator.
const LEGACY_MARKER: &str = "doesthedogdie:";

/// Result of synchronizing one summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub updated: String,
    /// Whether `updated` differs from the input.
    pub changed: bool,
}

/// Finds, strips and re-applies the warning block for one separator.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    separator: String,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl Synchronizer {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The original summary with any warning block removed.
    ///
    /// An exact separator match keeps the preceding text byte-for-byte. A
    /// block whose leading blank lines were edited away, or a legacy
    /// `doesthedogdie:` paragraph after a blank line, is also recognized;
    /// the text before those has its trailing whitespace trimmed.
    pub fn strip<'a>(&self, field: &'a str) -> &'a str {
        if let Some(idx) = field.find(self.separator.as_str()) {
            return &field[..idx];
        }

        let marker = self.separator.trim_start();
        if !marker.is_empty() && marker.len() != self.separator.len() {
            if let Some(idx) = field.find(marker) {
                return field[..idx].trim_end();
            }
        }

        if let Some(idx) = legacy_block_start(field) {
            return field[..idx].trim_end();
        }

        field
    }

    /// Whether `field` currently carries a warning block.
    pub fn has_block(&self, field: &str) -> bool {
        self.strip(field).len() != field.len()
    }

    /// Replace the field's block with `new_block`, or remove it when `None`.
    pub fn sync(&self, field: &str, new_block: Option<&str>) -> SyncOutcome {
        let original = self.strip(field);

        let updated = match new_block {
            Some(block) => {
                let mut s = String::with_capacity(original.len() + block.len());
                s.push_str(original);
                s.push_str(block);
                s
            }
            None => original.to_string(),
        };

        let changed = updated != field;
        SyncOutcome { updated, changed }
    }
}

/// Byte offset of the first legacy marker line that follows a blank line.
///
/// Older releases always wrote the marker as its own paragraph, so a
/// marker on the first line or directly under text is the user's own.
fn legacy_block_start(field: &str) -> Option<usize> {
    let mut offset = 0;
    let mut after_blank = false;
    for line in field.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if after_blank {
            let is_marker = trimmed
                .get(..LEGACY_MARKER.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(LEGACY_MARKER));
            if is_marker {
                return Some(offset);
            }
        }
        after_blank = offset > 0 && trimmed.is_empty();
        offset += line.len();
    }
    None
}
