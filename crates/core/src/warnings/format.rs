//! Renders a [`WarningSet`] into the block appended to summaries.

use super::WarningSet;

/// Leads the flagged-topics line.
pub const FLAGGED_PREFIX: &str = "⚠️  ";
/// Leads the safe-topics line.
pub const SAFE_PREFIX: &str = "✅  ";
/// Joins topic labels on one line.
pub const TOPIC_DELIMITER: &str = " · ";

/// Render the warning block, starting with `separator`.
///
/// Returns `None` when there is nothing to show: no flagged topics, and safe
/// topics either disabled or absent.
pub fn format_block(set: &WarningSet, show_safe: bool, separator: &str) -> Option<String> {
    let show_safe = show_safe && !set.safe.is_empty();
    if set.flagged.is_empty() && !show_safe {
        return None;
    }

    let mut block = String::from(separator);
    if !set.flagged.is_empty() {
        block.push('\n');
        block.push_str(FLAGGED_PREFIX);
        block.push_str(&set.flagged.join(TOPIC_DELIMITER));
    }
    if show_safe {
        block.push('\n');
        block.push_str(SAFE_PREFIX);
        block.push_str(&set.safe.join(TOPIC_DELIMITER));
    }

    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::DEFAULT_SEPARATOR;

    fn set(flagged: &[&str], safe: &[&str]) -> WarningSet {
        WarningSet {
            flagged: flagged.iter().map(|s| s.to_string()).collect(),
            safe: safe.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_nothing_to_say_is_none() {
        assert_eq!(format_block(&set(&[], &[]), true, DEFAULT_SEPARATOR), None);
        assert_eq!(format_block(&set(&[], &["x"]), false, DEFAULT_SEPARATOR), None);
    }

    #[test]
    fn test_flagged_only() {
        let block = format_block(&set(&["animal death"], &["x"]), false, DEFAULT_SEPARATOR);
        assert_eq!(
            block.as_deref(),
            Some("\n\n———— Content Warnings (via DoesTheDogDie.com) ————\n⚠️  animal death")
        );
    }

    #[test]
    fn test_flagged_and_safe() {
        let block = format_block(&set(&["gore", "jump scares"], &["a dog does not die"]), true, "\n--");
        assert_eq!(
            block.as_deref(),
            Some("\n--\n⚠️  gore · jump scares\n✅  a dog does not die")
        );
    }

    #[test]
    fn test_safe_only() {
        let block = format_block(&set(&[], &["no spiders"]), true, "\n--");
        assert_eq!(block.as_deref(), Some("\n--\n✅  no spiders"));
    }

    #[test]
    fn test_deterministic() {
        let s = set(&["a", "b"], &["c"]);
        assert_eq!(
            format_block(&s, true, DEFAULT_SEPARATOR),
            format_block(&s, true, DEFAULT_SEPARATOR)
        );
    }
}
