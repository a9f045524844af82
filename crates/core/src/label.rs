//! Shared revenue labels.
//!
//! A label is identified by its `(text, color)` pair. The same pair attached
//! to many revenues is one stored label; a label nobody references any more
//! is deleted by the registry.

use std::collections::HashSet;

use neutron_shared::types::LabelId;
use serde::{Deserialize, Serialize};

use crate::revenue::RevenueError;

/// Maximum labels kept per revenue in a single create or edit call.
pub const MAX_REVENUE_LABELS: usize = 5;

/// Maximum length of a label's text.
pub const MAX_LABEL_TEXT_LENGTH: usize = 30;

/// A stored label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevenueLabel {
    /// Label id.
    pub id: LabelId,
    /// Label text, used for filtering.
    pub text: String,
    /// `#RRGGBB` color.
    pub color: String,
}

/// A label as supplied by a command, before it is resolved to a stored row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelDraft {
    /// Label text.
    pub text: String,
    /// `#RRGGBB` color.
    pub color: String,
}

impl LabelDraft {
    /// Creates a label draft.
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
        }
    }

    /// Checks text length and color format.
    pub fn validate(&self) -> Result<(), RevenueError> {
        let length = self.text.chars().count();
        if self.text.trim().is_empty() || length > MAX_LABEL_TEXT_LENGTH {
            return Err(RevenueError::InvalidLabel(format!(
                "text must be between 1 and {MAX_LABEL_TEXT_LENGTH} characters"
            )));
        }
        if !is_hex_color(&self.color) {
            return Err(RevenueError::InvalidLabel(format!(
                "'{}' is not a #RRGGBB color",
                self.color
            )));
        }
        Ok(())
    }

    /// True if `label` has the same identity.
    #[must_use]
    pub fn matches(&self, label: &RevenueLabel) -> bool {
        self.text == label.text && self.color == label.color
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validates, de-duplicates by identity, and truncates to [`MAX_REVENUE_LABELS`].
///
/// Entries beyond the cap are dropped silently; invalid entries are an error.
pub fn cap_labels(drafts: Vec<LabelDraft>) -> Result<Vec<LabelDraft>, RevenueError> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(MAX_REVENUE_LABELS);
    for draft in drafts {
        if kept.len() == MAX_REVENUE_LABELS {
            break;
        }
        draft.validate()?;
        if seen.insert((draft.text.clone(), draft.color.clone())) {
            kept.push(draft);
        }
    }
    Ok(kept)
}

/// Labels present in `old` but absent from `current`.
#[must_use]
pub fn removed_labels(old: &[RevenueLabel], current: &[RevenueLabel]) -> Vec<RevenueLabel> {
    let current_ids: HashSet<LabelId> = current.iter().map(|l| l.id).collect();
    old.iter()
        .filter(|l| !current_ids.contains(&l.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str, color: &str) -> RevenueLabel {
        RevenueLabel {
            id: LabelId::new(),
            text: text.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_cap_truncates_silently() {
        let drafts = (0..8)
            .map(|i| LabelDraft::new(format!("tag{i}"), "#A1B2C3"))
            .collect();
        let kept = cap_labels(drafts).unwrap();
        assert_eq!(kept.len(), MAX_REVENUE_LABELS);
        assert_eq!(kept[0].text, "tag0");
        assert_eq!(kept[4].text, "tag4");
    }

    #[test]
    fn test_cap_deduplicates_by_identity() {
        let drafts = vec![
            LabelDraft::new("work", "#FF0000"),
            LabelDraft::new("work", "#FF0000"),
            LabelDraft::new("work", "#00FF00"),
        ];
        let kept = cap_labels(drafts).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_cap_rejects_invalid_labels() {
        assert!(cap_labels(vec![LabelDraft::new("", "#FF0000")]).is_err());
        assert!(cap_labels(vec![LabelDraft::new("x", "red")]).is_err());
        assert!(cap_labels(vec![LabelDraft::new("x", "#GG0000")]).is_err());
    }

    #[test]
    fn test_removed_labels_is_set_difference() {
        let keep = label("keep", "#000000");
        let drop = label("drop", "#FFFFFF");
        let added = label("new", "#123456");

        let removed = removed_labels(&[keep.clone(), drop.clone()], &[keep, added]);
        assert_eq!(removed, vec![drop]);
    }

    #[test]
    fn test_draft_matches_label() {
        let stored = label("rent", "#ABCDEF");
        assert!(LabelDraft::new("rent", "#ABCDEF").matches(&stored));
        assert!(!LabelDraft::new("rent", "#abcdef").matches(&stored));
    }
}
