//! Defines the [TextFieldRole] enum, covering the editable text-class field types.

use crate::signing::document::autofill::InvestorAutoFillData;

/// The role of a text-class field, deciding where its value is pre-filled from and whether
/// the signer may change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFieldRole {
    /// A plain TEXT field.
    FreeText,
    Company,
    Title,
    Address,
    Email,
}

impl TextFieldRole {
    /// Returns `true` if the signer may edit a field with this role. An EMAIL field is locked
    /// once auto-fill data has supplied the signer's identity-bound email.
    #[inline]
    pub fn is_editable(&self, email_locked: bool) -> bool {
        !(matches!(self, TextFieldRole::Email) && email_locked)
    }

    /// Returns the value this role is pre-filled with from `autofill`, if the auto-fill data
    /// carries one. A FreeText field is never pre-filled from investor data.
    pub fn prefill(&self, autofill: &InvestorAutoFillData) -> Option<String> {
        let value = match self {
            TextFieldRole::FreeText => None,
            TextFieldRole::Company => autofill
                .entity_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .or(autofill.company.as_deref()),
            TextFieldRole::Title => autofill.title.as_deref(),
            TextFieldRole::Address => autofill.address.as_deref(),
            TextFieldRole::Email => autofill.email.as_deref(),
        };

        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_prefers_entity_name() {
        let autofill = InvestorAutoFillData {
            entity_name: Some("Harbor Trust".into()),
            company: Some("Harbor Capital".into()),
            ..Default::default()
        };

        assert_eq!(
            TextFieldRole::Company.prefill(&autofill).as_deref(),
            Some("Harbor Trust")
        );

        let autofill = InvestorAutoFillData {
            entity_name: Some("  ".into()),
            company: Some("Harbor Capital".into()),
            ..Default::default()
        };

        assert_eq!(
            TextFieldRole::Company.prefill(&autofill).as_deref(),
            Some("Harbor Capital")
        );
    }

    #[test]
    fn test_email_locks_only_when_known() {
        assert!(TextFieldRole::Email.is_editable(false));
        assert!(!TextFieldRole::Email.is_editable(true));
        assert!(TextFieldRole::Address.is_editable(true));
    }
}
