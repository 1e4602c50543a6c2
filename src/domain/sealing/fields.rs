//! Field sets and their canonical serialization.
//!
//! The MAC input is a deterministic byte string built from an unordered
//! field map: keys are sorted byte-wise ascending, each field is rendered
//! as `key=value`, and the tokens are joined with `*`. The `*` separator is
//! a constraint inherited from the upstream protocol: no field value may
//! legitimately contain an unescaped `*`, and that responsibility stays
//! with the caller.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::SealError;

/// Reserved field name carrying the seal itself. Never part of the MAC input.
pub const SEAL_FIELD: &str = "MAC";

/// Token separator of the canonical string.
const SEPARATOR: char = '*';

/// An unordered mapping from field name to pre-encoded field value.
///
/// Keys are unique and non-empty; insertion order is irrelevant because
/// canonicalization always sorts. Backed by a `BTreeMap`, so iteration is
/// already in byte-wise ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSet {
    fields: BTreeMap<String, String>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value under the same name.
    ///
    /// # Errors
    ///
    /// Returns `SealError::EmptyFieldName` for an empty name; the canonical
    /// format has no way to represent one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SealError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SealError::EmptyFieldName);
        }
        self.fields.insert(name, value.into());
        Ok(())
    }

    /// Build a field set from name/value pairs.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, SealError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name, value)?;
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&String> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter()
    }

    /// The canonical MAC input: fields sorted byte-wise by name, rendered
    /// `key=value` and joined with `*`.
    pub fn canonicalize(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set_of(pairs: &[(&str, &str)]) -> FieldSet {
        FieldSet::try_from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn canonicalize_sorts_by_key() {
        let fields = set_of(&[("montant", "42.50EUR"), ("TPE", "1234567"), ("lgue", "FR")]);
        // Uppercase sorts before lowercase in byte order.
        assert_eq!(
            fields.canonicalize(),
            "TPE=1234567*lgue=FR*montant=42.50EUR"
        );
    }

    #[test]
    fn canonicalize_is_insertion_order_invariant() {
        let a = set_of(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let b = set_of(&[("c", "3"), ("a", "1"), ("b", "2")]);
        assert_eq!(a.canonicalize(), b.canonicalize());
        assert_eq!(a.canonicalize(), "a=1*b=2*c=3");
    }

    #[test]
    fn empty_set_canonicalizes_to_empty_string() {
        assert_eq!(FieldSet::new().canonicalize(), "");
    }

    #[test]
    fn empty_field_name_is_rejected() {
        let mut fields = FieldSet::new();
        assert!(matches!(
            fields.insert("", "value"),
            Err(SealError::EmptyFieldName)
        ));
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut fields = FieldSet::new();
        fields.insert("reference", "OLD").unwrap();
        fields.insert("reference", "NEW").unwrap();
        assert_eq!(fields.get("reference"), Some(&"NEW".to_string()));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn remove_returns_value() {
        let mut fields = set_of(&[("MAC", "abcd"), ("TPE", "1")]);
        assert_eq!(fields.remove(SEAL_FIELD), Some("abcd".to_string()));
        assert!(!fields.contains(SEAL_FIELD));
        assert_eq!(fields.remove(SEAL_FIELD), None);
    }

    proptest! {
        /// Canonicalization only depends on the mapping, never on the order
        /// fields were inserted in.
        #[test]
        fn canonicalize_invariant_under_permutation(
            pairs in proptest::collection::vec(
                ("[a-zA-Z][a-zA-Z0-9_-]{0,11}", "[a-zA-Z0-9:/@. -]{0,24}"),
                0..8,
            ),
            seed in any::<u64>(),
        ) {
            let forward = FieldSet::try_from_pairs(pairs.clone()).unwrap();

            // Deterministic shuffle driven by the seed.
            let mut shuffled = pairs;
            let mut state = seed;
            for i in (1..shuffled.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                shuffled.swap(i, (state % (i as u64 + 1)) as usize);
            }
            let reordered = FieldSet::try_from_pairs(shuffled).unwrap();

            prop_assert_eq!(forward.canonicalize(), reordered.canonicalize());
        }
    }
}
