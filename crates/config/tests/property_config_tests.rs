//! Property-based tests for store lookups.
//!
//! Test coverage:
//! - Overrides always win over the source, for arbitrary keys and values.
//! - Nested JSON documents resolve every leaf through its dotted path.
//! - Integer strings cast to the same integer they were formatted from.

use proptest::prelude::*;
use serde_json::{Map, Value};
use std::fs;
use tempfile::TempDir;

use cfgkit::{Caster, Config, JsonConfig, MemoryConfig, path};

/// Keys made of plain segments (no dots or escapes inside a segment).
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_map(String::from)
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

proptest! {
    #[test]
    fn prop_memory_override_wins(
        key in segment_strategy(),
        seeded in scalar_strategy(),
        overridden in scalar_strategy(),
    ) {
        let cfg = MemoryConfig::new([(key.clone(), seeded)]);
        cfg.set(&key, overridden.clone());
        prop_assert_eq!(cfg.get(&key), Some(overridden));
        prop_assert!(cfg.exists(&key));
    }

    #[test]
    fn prop_json_override_wins(
        outer in segment_strategy(),
        inner in segment_strategy(),
        stored in scalar_strategy(),
        overridden in scalar_strategy(),
    ) {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cfg.json");
        let mut section = Map::new();
        section.insert(inner.clone(), stored);
        let mut root = Map::new();
        root.insert(outer.clone(), Value::Object(section));
        fs::write(&file, Value::Object(root).to_string()).unwrap();

        let cfg = JsonConfig::new([&file]).unwrap();
        let key = format!("{outer}.{inner}");
        prop_assert!(cfg.exists(&key));

        cfg.set(&key, overridden.clone());
        prop_assert_eq!(cfg.get(&key), Some(overridden));
    }

    #[test]
    fn prop_nested_leaves_resolve(
        entries in prop::collection::btree_map(
            (segment_strategy(), segment_strategy()),
            scalar_strategy(),
            1..8,
        ),
    ) {
        let mut root = Map::new();
        for ((outer, inner), value) in &entries {
            let section = root
                .entry(outer.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(section) = section {
                section.insert(inner.clone(), value.clone());
            }
        }
        let doc = Value::Object(root);

        for ((outer, inner), value) in &entries {
            let key = format!("{outer}.{inner}");
            prop_assert_eq!(path::lookup(&doc, &key), Some(value.clone()));
        }
    }

    #[test]
    fn prop_integer_strings_cast(n in any::<i64>()) {
        let caster = Caster::new(Some(Value::String(n.to_string())));
        prop_assert_eq!(caster.i64().unwrap(), n);
        prop_assert_eq!(caster.string().unwrap(), n.to_string());
    }
}
