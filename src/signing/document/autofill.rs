//! Defines the [InvestorAutoFillData] struct and the pre-fill rule applied to every field
//! when a document is opened.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::signing::field::checkbox::CheckboxCompletion;
use crate::signing::field::signature::CaptureKind;
use crate::signing::field::{FieldKind, SignatureField};

/// Investor details supplied by the host page. The signing engine only reads this data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestorAutoFillData {
    pub name: Option<String>,
    pub entity_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub investment_amount: Option<f64>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl InvestorAutoFillData {
    /// Returns `true` if an email is known, which locks EMAIL fields against edits.
    #[inline]
    pub fn has_email(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty())
    }

    /// Returns the text a typed capture of the given kind starts with: the investor's full
    /// name for a signature, or the initials of that name.
    pub fn default_signature_text(&self, kind: CaptureKind) -> String {
        let name = self.name.as_deref().unwrap_or_default().trim();

        match kind {
            CaptureKind::Signature => name.to_string(),
            CaptureKind::Initials => name
                .split_whitespace()
                .filter_map(|part| part.chars().next())
                .flat_map(char::to_uppercase)
                .join(""),
        }
    }
}

/// Returns the initial value of `field` when its document is opened.
///
/// | Field type  | Source                                                 |
/// |-------------|--------------------------------------------------------|
/// | NAME        | investor name                                          |
/// | EMAIL       | investor email                                         |
/// | DATE_SIGNED | `signing_date`, already formatted for the signer       |
/// | COMPANY     | entity name, else company                              |
/// | TITLE       | investor title                                         |
/// | ADDRESS     | investor address                                       |
/// | other       | the field's pre-existing value                         |
///
/// Missing sources yield an empty string.
pub fn prefill_value(
    field: &SignatureField,
    autofill: &InvestorAutoFillData,
    signing_date: &str,
    default_checkbox: CheckboxCompletion,
) -> String {
    let existing = || field.value.clone().unwrap_or_default();

    match field.kind(default_checkbox) {
        FieldKind::Name => autofill
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        FieldKind::DateSigned => signing_date.to_string(),
        FieldKind::Text(role) => match role.prefill(autofill) {
            Some(value) => value,
            None => existing(),
        },
        FieldKind::Capture(_) | FieldKind::Checkbox(_) => existing(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::field::geometry::FieldRect;
    use crate::signing::field::SignatureFieldType;

    fn autofill() -> InvestorAutoFillData {
        InvestorAutoFillData {
            name: Some("Ada M. Lovelace".into()),
            entity_name: None,
            company: Some("Analytical Partners".into()),
            title: Some("Managing Member".into()),
            investment_amount: Some(250_000.0),
            email: Some("ada@example.com".into()),
            address: Some("12 St James's Square, London".into()),
        }
    }

    fn field(field_type: SignatureFieldType) -> SignatureField {
        SignatureField::new("f", field_type, 1, FieldRect::new(0.0, 0.0, 10.0, 5.0))
    }

    #[test]
    fn test_prefill_by_type() {
        let data = autofill();
        let prefill =
            |field: &SignatureField| prefill_value(field, &data, "10/15/2026", CheckboxCompletion::Checked);

        assert_eq!(prefill(&field(SignatureFieldType::Name)), "Ada M. Lovelace");
        assert_eq!(prefill(&field(SignatureFieldType::Email)), "ada@example.com");
        assert_eq!(prefill(&field(SignatureFieldType::DateSigned)), "10/15/2026");
        assert_eq!(prefill(&field(SignatureFieldType::Company)), "Analytical Partners");
        assert_eq!(prefill(&field(SignatureFieldType::Title)), "Managing Member");
        assert_eq!(
            prefill(&field(SignatureFieldType::Address)),
            "12 St James's Square, London"
        );
        assert_eq!(prefill(&field(SignatureFieldType::Text)), "");
        assert_eq!(
            prefill(&field(SignatureFieldType::Text).with_value("Class A")),
            "Class A"
        );
        assert_eq!(prefill(&field(SignatureFieldType::Checkbox)), "");
    }

    #[test]
    fn test_prefill_without_autofill_is_empty() {
        let data = InvestorAutoFillData::default();

        for field_type in [
            SignatureFieldType::Name,
            SignatureFieldType::Email,
            SignatureFieldType::Company,
            SignatureFieldType::Title,
            SignatureFieldType::Address,
        ] {
            assert_eq!(
                prefill_value(&field(field_type), &data, "", CheckboxCompletion::Checked),
                "",
                "{field_type}"
            );
        }
    }

    #[test]
    fn test_default_signature_text() {
        let data = autofill();

        assert_eq!(data.default_signature_text(CaptureKind::Signature), "Ada M. Lovelace");
        assert_eq!(data.default_signature_text(CaptureKind::Initials), "AML");
        assert_eq!(
            InvestorAutoFillData::default().default_signature_text(CaptureKind::Initials),
            ""
        );
    }
}
