//! Column reconciliation vocabulary.
//!
//! A [`Vocabulary`] is plain data: a table of raw header variants mapped to
//! canonical field names, plus the set of fields rendered verbatim. It is
//! passed to the context builder rather than baked into it.
//!
//! Lookups are case-sensitive and happen after trimming surrounding
//! whitespace. Headers without an entry pass through trimmed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::VocabularyError;
use crate::types::{CanonicalField, ColumnName};

/// Version of the built-in table.
pub const BUILTIN_VERSION: u32 = 1;

const BUILTIN_VARIANTS: &[(&str, &str)] = &[
    ("wo no", "wo_no"),
    ("wo_no", "wo_no"),
    ("wo date", "wo_date"),
    ("wo_date", "wo_date"),
    ("wo des", "wo_des"),
    ("wo_des", "wo_des"),
    ("location_code", "Location_code"),
    ("Location_code", "Location_code"),
    ("customername_code", "customername_code"),
    ("capacity_code", "Capacity_code"),
    ("Capacity_code", "Capacity_code"),
    ("site_incharge", "site_incharge"),
    ("Scada_incharge", "Scada_incharge"),
    ("Re_date", "Re_date"),
    ("Site_Name", "Site_Name"),
    ("Line_1_Workstatus", "Line_1_Workstatus"),
    ("Line_2_Workstatus", "Line_2_Workstatus"),
    ("Payment Terms", "Payment_Terms"),
];

/// Variant → canonical table plus identifier policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    version: u32,
    variants: BTreeMap<String, String>,
    identifier_fields: BTreeSet<String>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting tables where reconciling twice would
    /// differ from reconciling once. Names are stored trimmed, matching how
    /// headers are looked up.
    pub fn new(
        version: u32,
        variants: BTreeMap<String, String>,
        identifier_fields: BTreeSet<String>,
    ) -> Result<Self, VocabularyError> {
        let variants: BTreeMap<String, String> = variants
            .into_iter()
            .map(|(v, c)| (v.trim().to_string(), c.trim().to_string()))
            .collect();
        let identifier_fields = identifier_fields
            .into_iter()
            .map(|f| f.trim().to_string())
            .collect();
        for (variant, canonical) in &variants {
            if variant.is_empty() || canonical.is_empty() {
                return Err(VocabularyError::EmptyName);
            }
            if let Some(target) = variants.get(canonical) {
                if target != canonical {
                    return Err(VocabularyError::NonIdempotent {
                        canonical: canonical.clone(),
                        remapped_to: target.clone(),
                    });
                }
            }
        }
        Ok(Vocabulary { version, variants, identifier_fields })
    }

    /// The built-in WCR table.
    pub fn builtin() -> Self {
        let variants = BUILTIN_VARIANTS
            .iter()
            .map(|(v, c)| ((*v).to_string(), (*c).to_string()))
            .collect();
        Vocabulary {
            version: BUILTIN_VERSION,
            variants,
            identifier_fields: BTreeSet::new(),
        }
    }

    /// Merge extra variants and identifier fields over `self`.
    /// Extra entries win over existing ones with the same variant key.
    pub fn extended(
        &self,
        extra_variants: &BTreeMap<String, String>,
        extra_identifiers: &[String],
    ) -> Result<Self, VocabularyError> {
        let mut variants = self.variants.clone();
        for (variant, canonical) in extra_variants {
            variants.insert(variant.trim().to_string(), canonical.trim().to_string());
        }
        let mut identifiers = self.identifier_fields.clone();
        identifiers.extend(extra_identifiers.iter().map(|s| s.trim().to_string()));
        Vocabulary::new(self.version, variants, identifiers)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn variants(&self) -> &BTreeMap<String, String> {
        &self.variants
    }

    /// Canonical name for one header.
    pub fn canonical_for(&self, column: &ColumnName) -> CanonicalField {
        let trimmed = column.0.trim();
        match self.variants.get(trimmed) {
            Some(canonical) => CanonicalField::from(canonical.as_str()),
            None => CanonicalField::from(trimmed),
        }
    }

    /// Whether `field` is rendered verbatim rather than number-formatted.
    pub fn is_identifier(&self, field: &CanonicalField) -> bool {
        self.identifier_fields.contains(field.as_str())
    }

    /// Map every header to its canonical field, preserving encounter order
    /// (duplicates included).
    pub fn reconcile(&self, columns: &[ColumnName]) -> ColumnMapping {
        ColumnMapping {
            entries: columns
                .iter()
                .map(|c| (c.clone(), self.canonical_for(c)))
                .collect(),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary::builtin()
    }
}

/// Ordered header → canonical pairs for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    entries: Vec<(ColumnName, CanonicalField)>,
}

impl ColumnMapping {
    pub fn entries(&self) -> &[(ColumnName, CanonicalField)] {
        &self.entries
    }

    pub fn canonical_fields(&self) -> impl Iterator<Item = &CanonicalField> {
        self.entries.iter().map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names that more than one header maps to.
    pub fn collisions(&self) -> Vec<&CanonicalField> {
        let mut seen = BTreeSet::new();
        let mut dups = BTreeSet::new();
        for (_, canonical) in &self.entries {
            if !seen.insert(canonical) {
                dups.insert(canonical);
            }
        }
        dups.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<ColumnName> {
        names.iter().map(|n| ColumnName::from(*n)).collect()
    }

    #[test]
    fn known_variants_map_after_trimming() {
        let vocab = Vocabulary::builtin();
        let mapping = vocab.reconcile(&cols(&["  wo no ", "Payment Terms", "capacity_code"]));
        let canon: Vec<&str> = mapping.canonical_fields().map(|c| c.as_str()).collect();
        assert_eq!(canon, vec!["wo_no", "Payment_Terms", "Capacity_code"]);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let vocab = Vocabulary::builtin();
        let mapping = vocab.reconcile(&cols(&["WO NO"]));
        assert_eq!(mapping.entries()[0].1.as_str(), "WO NO");
    }

    #[test]
    fn unknown_headers_pass_through_trimmed() {
        let vocab = Vocabulary::builtin();
        let mapping = vocab.reconcile(&cols(&[" Line_3_UOM "]));
        assert_eq!(mapping.entries()[0].1.as_str(), "Line_3_UOM");
    }

    #[test]
    fn padded_names_are_trimmed_on_construction() {
        let variants = BTreeMap::from([
            (" wo no ".to_string(), " wo_no".to_string()),
            ("wo_no".to_string(), "wo_no ".to_string()),
        ]);
        let vocab = Vocabulary::new(1, variants, BTreeSet::from([" wo_no ".to_string()])).unwrap();
        let first = vocab.reconcile(&cols(&["wo no"]));
        assert_eq!(first.entries()[0].1.as_str(), "wo_no");
        let second = vocab.reconcile(&cols(&[first.entries()[0].1.as_str()]));
        assert_eq!(second.entries()[0].1.as_str(), "wo_no");
        assert!(vocab.is_identifier(&CanonicalField::from("wo_no")));
    }

    #[test]
    fn padded_canonical_remapped_elsewhere_is_rejected() {
        let variants = BTreeMap::from([
            ("wo no".to_string(), " wo_no".to_string()),
            ("wo_no".to_string(), "order_no".to_string()),
        ]);
        assert!(matches!(
            Vocabulary::new(1, variants, BTreeSet::new()),
            Err(VocabularyError::NonIdempotent { .. })
        ));
    }

    #[test]
    fn reconciling_canonical_headers_is_a_no_op() {
        let vocab = Vocabulary::builtin();
        let first = vocab.reconcile(&cols(&["wo no", "wo date", "Payment Terms", "extra"]));
        let canonical: Vec<ColumnName> = first
            .canonical_fields()
            .map(|c| ColumnName::from(c.as_str()))
            .collect();
        let second = vocab.reconcile(&canonical);
        let again: Vec<&str> = second.canonical_fields().map(|c| c.as_str()).collect();
        assert_eq!(again, vec!["wo_no", "wo_date", "Payment_Terms", "extra"]);
    }

    #[test]
    fn duplicates_keep_encounter_order() {
        let vocab = Vocabulary::builtin();
        let mapping = vocab.reconcile(&cols(&["wo no", "x", "wo_no"]));
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.collisions(), vec![&CanonicalField::from("wo_no")]);
    }

    #[test]
    fn non_idempotent_table_is_rejected() {
        let mut variants = BTreeMap::new();
        variants.insert("a".to_string(), "b".to_string());
        variants.insert("b".to_string(), "c".to_string());
        let err = Vocabulary::new(1, variants, BTreeSet::new()).unwrap_err();
        assert!(matches!(err, VocabularyError::NonIdempotent { .. }));
    }

    #[test]
    fn extension_adds_variants_and_identifiers() {
        let mut extra = BTreeMap::new();
        extra.insert("Work Order".to_string(), "wo_no".to_string());
        let vocab = Vocabulary::builtin()
            .extended(&extra, &["wo_no".to_string()])
            .expect("valid");
        assert_eq!(vocab.canonical_for(&"Work Order".into()).as_str(), "wo_no");
        assert!(vocab.is_identifier(&CanonicalField::from("wo_no")));
    }

    #[test]
    fn builtin_table_is_valid() {
        let builtin = Vocabulary::builtin();
        let rebuilt = Vocabulary::new(
            builtin.version(),
            builtin.variants().clone(),
            BTreeSet::new(),
        );
        assert!(rebuilt.is_ok());
    }
}
