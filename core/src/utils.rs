//! Label derivation and rule-token helpers

use serde::{Deserialize, Serialize};

/// Characters that may not appear in a display name used verbatim as a label
pub const BLACKLISTED_LABEL_CHARS: [char; 5] = ['(', ')', '.', ' ', '-'];

/// Delimiter between rule tokens in a single rule string
pub const RULE_DELIMITER: &str = "::";

/// Whether a data-model entry is a class or a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Class entry; labels are upper camel case
    Class,
    /// Property entry; labels are lower camel case
    Property,
}

/// How node labels are derived from display names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Camel-cased class or property label
    #[default]
    ClassLabel,
    /// The display name itself, when it is a valid label
    DisplayLabel,
}

/// Upper-case the first character and every character following `_`,
/// dropping those underscores
fn camelize(input: &str, uppercase_first_letter: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    if let Some(first) = chars.next() {
        if uppercase_first_letter {
            out.extend(first.to_uppercase());
        } else {
            out.extend(first.to_lowercase());
        }
    }

    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('_', Some(next)) => {
                chars.next();
                out.extend(next.to_uppercase());
            }
            _ => out.push(c),
        }
    }

    out
}

fn prepare_display_name(display_name: &str, strict_camel_case: bool) -> String {
    if strict_camel_case {
        display_name
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    } else {
        display_name.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

/// Convert a display name into a class label (`"Cancer Type"` → `"CancerType"`)
#[must_use]
pub fn class_label_from_display_name(display_name: &str, strict_camel_case: bool) -> String {
    camelize(&prepare_display_name(display_name, strict_camel_case), true)
}

/// Convert a display name into a property label (`"Cancer Type"` → `"cancerType"`)
#[must_use]
pub fn property_label_from_display_name(display_name: &str, strict_camel_case: bool) -> String {
    camelize(&prepare_display_name(display_name, strict_camel_case), false)
}

/// Whether a display name can be used verbatim as a label
#[must_use]
pub fn is_valid_display_label(display_name: &str) -> bool {
    !display_name.contains(BLACKLISTED_LABEL_CHARS)
}

/// Derive a node label from its display name
#[must_use]
pub fn label_from_display_name(
    display_name: &str,
    entry_type: EntryType,
    strict_camel_case: bool,
    style: LabelStyle,
) -> String {
    let camelized = || match entry_type {
        EntryType::Class => class_label_from_display_name(display_name, strict_camel_case),
        EntryType::Property => property_label_from_display_name(display_name, strict_camel_case),
    };

    match style {
        LabelStyle::ClassLabel => camelized(),
        LabelStyle::DisplayLabel if is_valid_display_label(display_name) => display_name.to_string(),
        LabelStyle::DisplayLabel => {
            let label: String = camelized()
                .chars()
                .filter(|c| !BLACKLISTED_LABEL_CHARS.contains(c))
                .collect();
            tracing::warn!(
                "Cannot use display name '{display_name}' as the data model label because it \
                 contains one of {BLACKLISTED_LABEL_CHARS:?}; assigned label '{label}' instead"
            );
            label
        }
    }
}

/// Split rule strings on the `::` delimiter into individual tokens
#[must_use]
pub fn parse_validation_rules<S: AsRef<str>>(rules: &[S]) -> Vec<String> {
    rules
        .iter()
        .flat_map(|rule| rule.as_ref().split(RULE_DELIMITER))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_and_property_labels() {
        assert_eq!(class_label_from_display_name("Cancer Type", false), "CancerType");
        assert_eq!(property_label_from_display_name("Cancer Type", false), "cancerType");
        assert_eq!(
            class_label_from_display_name("BulkRNA-seqAssay", false),
            "BulkRNA-seqAssay"
        );
    }

    #[test]
    fn test_strict_camel_case() {
        assert_eq!(class_label_from_display_name(" year of birth ", true), "YearOfBirth");
        assert_eq!(property_label_from_display_name("year of birth", true), "yearOfBirth");
        // non-strict only removes whitespace
        assert_eq!(property_label_from_display_name("year of birth", false), "yearofbirth");
    }

    #[test]
    fn test_display_label_style() {
        assert_eq!(
            label_from_display_name("Diagnosis", EntryType::Property, false, LabelStyle::DisplayLabel),
            "Diagnosis"
        );
        assert_eq!(
            label_from_display_name("File Format", EntryType::Class, false, LabelStyle::DisplayLabel),
            "FileFormat"
        );
        assert_eq!(
            label_from_display_name("BulkRNA-seqAssay", EntryType::Class, false, LabelStyle::DisplayLabel),
            "BulkRNAseqAssay"
        );
    }

    #[test]
    fn test_parse_validation_rules() {
        assert_eq!(
            parse_validation_rules(&["list like::regex match [A-Z]+"]),
            vec!["list like", "regex match [A-Z]+"]
        );
        assert_eq!(parse_validation_rules(&["int", " unique :: "]), vec!["int", "unique"]);
        assert!(parse_validation_rules::<&str>(&[]).is_empty());
    }
}
