//! Property-based tests - roundtrip guarantees over generated inputs
//!
//! Covers both entry points: arbitrary `Value` graphs through
//! `encode`/`decode`, and Rust types through `to_string`/`from_str`.

use lino_objects_codec::{decode, encode, from_str, links, to_string, Key, List, Map, Value};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn arb_key() -> impl Strategy<Value = Key> {
    prop_oneof![
        ".*".prop_map(Key::from),
        any::<i64>().prop_map(Key::from),
        any::<bool>().prop_map(Key::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        Just(Value::Undefined),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_map(Value::Float),
        ".*".prop_map(Value::Str),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::List(items.into_iter().collect::<List>())),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_value_graph_roundtrip(value in arb_value()) {
        let text = encode(&value).unwrap();
        let back = decode(&text).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_encoded_text_is_one_link(value in arb_value()) {
        let text = encode(&value).unwrap();
        let parsed = links::parse(&text).unwrap();
        prop_assert_eq!(parsed.len(), 1);
        prop_assert_eq!(parsed[0].to_string(), text);
    }

    #[test]
    fn prop_any_string_survives(s in any::<String>()) {
        let back = decode(&encode(&Value::from(s.as_str())).unwrap()).unwrap();
        prop_assert_eq!(back.as_str(), Some(s.as_str()));
    }

    #[test]
    fn prop_f64_bits_survive(f in any::<f64>()) {
        let back = decode(&encode(&Value::Float(f)).unwrap()).unwrap();
        let g = back.as_f64().unwrap();
        if f.is_nan() {
            prop_assert!(g.is_nan());
        } else {
            prop_assert_eq!(f.to_bits(), g.to_bits());
        }
    }

    #[test]
    fn prop_shared_child_decodes_shared(items in prop::collection::vec(any::<i32>(), 0..8)) {
        let child = List::from_vec(items.into_iter().map(Value::from).collect());
        let outer = List::from_vec(vec![Value::from(child.clone()), Value::from(child)]);
        let back = decode(&encode(&Value::from(outer)).unwrap()).unwrap();
        let back = back.as_list().unwrap();
        let first = back.get(0).unwrap();
        let second = back.get(1).unwrap();
        prop_assert!(first.as_list().unwrap().ptr_eq(second.as_list().unwrap()));
    }

    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_string(s in ".*") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }
}
