//! Property tests for reduction normalization.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use casilla::domain::entities::ReductionShape;
use casilla::domain::services::{ReductionNormalizer, LEGACY_REDUCTIONS};

/// A legacy mapping: some recognized keys with amounts in cents, optionally
/// with a distinct theoretical companion.
fn legacy_map() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::vec(
        (any::<bool>(), 0i64..10_000_000, proptest::option::of(0i64..10_000_000)),
        LEGACY_REDUCTIONS.len(),
    )
    .prop_map(|entries| {
        let mut map = Map::new();
        for (entry, (present, real, teorico)) in LEGACY_REDUCTIONS.iter().zip(entries) {
            if !present {
                continue;
            }
            map.insert(entry.key.to_string(), json!(real as f64 / 100.0));
            if let Some(teorico) = teorico {
                map.insert(format!("{}Teorico", entry.key), json!(teorico as f64 / 100.0));
            }
        }
        map
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A legacy mapping and the canonical list it is rewritten to
    /// normalize to the same reductions.
    #[test]
    fn property_legacy_and_canonical_shapes_agree(map in legacy_map()) {
        let normalizer = ReductionNormalizer::new();
        let mut tree = json!({ "reducciones": Value::Object(map) });

        let legacy = normalizer.apply(&mut tree).unwrap();
        prop_assert_eq!(legacy.shape, ReductionShape::Legacy);

        let canonical = normalizer.normalize(tree.get("reducciones")).unwrap();
        prop_assert_eq!(canonical.shape, ReductionShape::Canonical);
        prop_assert_eq!(canonical.reductions, legacy.reductions);
    }

    /// PROPERTY: Normalizing the canonical form again leaves the tree untouched.
    #[test]
    fn property_canonical_rewrite_is_stable(map in legacy_map()) {
        let normalizer = ReductionNormalizer::new();
        let mut tree = json!({ "reducciones": Value::Object(map) });
        normalizer.apply(&mut tree).unwrap();
        let once = tree.clone();

        normalizer.apply(&mut tree).unwrap();
        prop_assert_eq!(tree, once);
    }

    /// PROPERTY: Unrecognized legacy keys are always rejected.
    #[test]
    fn property_unknown_legacy_key_is_rejected(key in "[a-z]{3,12}") {
        prop_assume!(LEGACY_REDUCTIONS.iter().all(|r| r.key != key));
        let mut map = Map::new();
        map.insert(key, json!(10));
        let tree = json!({ "reducciones": Value::Object(map) });
        prop_assert!(ReductionNormalizer::new().normalize(tree.get("reducciones")).is_err());
    }
}
