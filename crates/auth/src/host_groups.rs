//! Canonicalization of backend host-group identifiers.
//!
//! Both backends report host-group scoping as raw nullable strings; this is
//! the single place where they become canonical UUIDs.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::HostGroupParseError;

/// Canonicalize a raw host-group identifier list.
///
/// - `None` input means "no restriction" and stays `None`. This is distinct
///   from `Some(vec![])`, which means "restricted to nothing".
/// - A `None` element is the "ungrouped" bucket and is kept as a value,
///   deduplicated like any parsed UUID.
/// - Duplicates are dropped, keeping first-occurrence order.
/// - Any element that is not a valid UUID aborts the whole conversion; no
///   partial list is ever returned.
pub fn normalize_host_groups(
    ids: Option<Vec<Option<String>>>,
) -> Result<Option<Vec<Option<Uuid>>>, HostGroupParseError> {
    let Some(ids) = ids else {
        return Ok(None);
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let parsed = match id {
            None => None,
            Some(raw) => Some(Uuid::parse_str(&raw).map_err(|source| HostGroupParseError {
                value: raw.clone(),
                source,
            })?),
        };
        if seen.insert(parsed) {
            out.push(parsed);
        }
    }

    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_ONE: &str = "f3f5bfbe-80c3-4e09-be3e-17ec5ab360c6";
    const GROUP_TWO: &str = "b757589c-b927-42cc-80d1-a13747f253f9";

    fn uuid(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn absent_input_stays_absent() {
        assert_eq!(normalize_host_groups(None).unwrap(), None);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_host_groups(Some(vec![])).unwrap(), Some(vec![]));
    }

    #[test]
    fn preserves_order_and_keeps_ungrouped_marker() {
        let input = vec![Some(GROUP_ONE.to_string()), None, Some(GROUP_TWO.to_string())];
        assert_eq!(
            normalize_host_groups(Some(input)).unwrap(),
            Some(vec![Some(uuid(GROUP_ONE)), None, Some(uuid(GROUP_TWO))])
        );
    }

    #[test]
    fn removes_duplicates_in_first_occurrence_order() {
        let input = vec![
            Some(GROUP_ONE.to_string()),
            None,
            Some(GROUP_TWO.to_string()),
            Some(GROUP_ONE.to_string()),
            None,
        ];
        assert_eq!(
            normalize_host_groups(Some(input)).unwrap(),
            Some(vec![Some(uuid(GROUP_ONE)), None, Some(uuid(GROUP_TWO))])
        );
    }

    #[test]
    fn malformed_element_fails_entire_conversion() {
        let input = vec![Some(GROUP_ONE.to_string()), Some("not-a-uuid".to_string())];
        let err = normalize_host_groups(Some(input)).unwrap_err();
        assert_eq!(err.value, "not-a-uuid");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn raw_element() -> impl Strategy<Value = Option<String>> {
            prop_oneof![
                any::<u128>().prop_map(|n| Some(Uuid::from_u128(n).to_string())),
                Just(None),
            ]
        }

        proptest! {
            /// Output has no duplicates and every value came from the input.
            #[test]
            fn output_is_distinct_subsequence(input in proptest::collection::vec(raw_element(), 0..16)) {
                let parsed: Vec<Option<Uuid>> = input
                    .iter()
                    .map(|e| e.as_ref().map(|s| Uuid::parse_str(s).unwrap()))
                    .collect();

                let out = normalize_host_groups(Some(input)).unwrap().unwrap();

                let mut seen = HashSet::new();
                for value in &out {
                    prop_assert!(seen.insert(value.clone()));
                    prop_assert!(parsed.contains(value));
                }
                // First-occurrence order: out equals parsed with later
                // duplicates removed.
                let mut expected = Vec::new();
                for value in parsed {
                    if !expected.contains(&value) {
                        expected.push(value);
                    }
                }
                prop_assert_eq!(out, expected);
            }

            /// One malformed element fails the whole list, wherever it sits.
            #[test]
            fn malformed_element_always_fails(
                prefix in proptest::collection::vec(raw_element(), 0..8),
                suffix in proptest::collection::vec(raw_element(), 0..8),
                junk in "[a-z ]{1,12}",
            ) {
                let mut input = prefix;
                input.push(Some(junk));
                input.extend(suffix);
                prop_assert!(normalize_host_groups(Some(input)).is_err());
            }
        }
    }
}
