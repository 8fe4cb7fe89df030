//! Defines the [CheckboxCompletion] enum and the value encoding of CHECKBOX fields.
//!
//! A checkbox value is stored in the session like every other field value: an empty string
//! while untouched, then [CHECKED_VALUE] or [UNCHECKED_VALUE] once toggled.

use serde::{Deserialize, Serialize};

/// The stored value of a checked checkbox.
pub const CHECKED_VALUE: &str = "true";

/// The stored value of a checkbox that has been toggled off.
pub const UNCHECKED_VALUE: &str = "false";

/// When a required checkbox counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxCompletion {
    /// Complete once the signer has toggled the box at all, whatever its final state.
    /// Suits optional opt-ins that still require an explicit answer.
    Touched,

    /// Complete only while the box is checked. Suits "I agree" style acknowledgements.
    Checked,
}

impl CheckboxCompletion {
    /// Returns `true` if a checkbox holding `value` satisfies this rule.
    #[inline]
    pub fn is_complete(&self, value: &str) -> bool {
        match self {
            CheckboxCompletion::Touched => !value.trim().is_empty(),
            CheckboxCompletion::Checked => is_checked(value),
        }
    }
}

/// Returns `true` if the stored checkbox `value` represents a checked box.
///
/// Pre-filled values arrive in whatever form the document was prepared with, so the PDF
/// on-state names "Yes" and "On" (with or without a leading slash) and "1" are accepted
/// alongside [CHECKED_VALUE].
pub fn is_checked(value: &str) -> bool {
    let normalized = value.trim().trim_start_matches('/');

    normalized.eq_ignore_ascii_case(CHECKED_VALUE)
        || normalized.eq_ignore_ascii_case("yes")
        || normalized.eq_ignore_ascii_case("on")
        || normalized == "1"
}

/// Returns the stored value for a checkbox in the given state.
#[inline]
pub fn checkbox_value(is_checked: bool) -> &'static str {
    if is_checked {
        CHECKED_VALUE
    } else {
        UNCHECKED_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touched_accepts_either_state() {
        assert!(!CheckboxCompletion::Touched.is_complete(""));
        assert!(CheckboxCompletion::Touched.is_complete(UNCHECKED_VALUE));
        assert!(CheckboxCompletion::Touched.is_complete(CHECKED_VALUE));
    }

    #[test]
    fn test_checked_requires_on_state() {
        assert!(!CheckboxCompletion::Checked.is_complete(""));
        assert!(!CheckboxCompletion::Checked.is_complete(UNCHECKED_VALUE));
        assert!(CheckboxCompletion::Checked.is_complete(CHECKED_VALUE));
    }

    #[test]
    fn test_pdf_on_state_names() {
        assert!(is_checked("/Yes"));
        assert!(is_checked("On"));
        assert!(is_checked("1"));
        assert!(!is_checked("Off"));
        assert!(!is_checked("/Off"));
    }
}
