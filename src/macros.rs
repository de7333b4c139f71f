/// Builds a [`Value`](crate::Value) tree with JSON-like syntax.
///
/// Every `[...]` and `{...}` creates a new container. Anything that is not
/// `null`, `undefined`, `true`, `false`, an array or an object is passed to
/// `Value::from`, so existing `List`/`Map` handles can be spliced in to build
/// shared or cyclic graphs.
///
/// ```rust
/// use lino_objects_codec::{lino, Value};
///
/// let user = lino!({
///     "name": "Alice",
///     "tags": ["admin", 1, 2.5],
///     "manager": null
/// });
/// let map = user.as_map().unwrap();
/// assert_eq!(map.get("name"), Some(Value::from("Alice")));
/// assert_eq!(map.get("manager"), Some(Value::Null));
/// ```
#[macro_export]
macro_rules! lino {
    (null) => {
        $crate::Value::Null
    };

    (undefined) => {
        $crate::Value::Undefined
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List($crate::List::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List($crate::List::from_vec(vec![$($crate::lino!($elem)),*]))
    };

    ({}) => {
        $crate::Value::Map($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let map = $crate::Map::new();
        $(
            map.insert($key, $crate::lino!($value));
        )*
        $crate::Value::Map(map)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{List, Map, Value};

    #[test]
    fn test_lino_macro_primitives() {
        assert_eq!(lino!(null), Value::Null);
        assert_eq!(lino!(undefined), Value::Undefined);
        assert_eq!(lino!(true), Value::Bool(true));
        assert_eq!(lino!(false), Value::Bool(false));
        assert_eq!(lino!(42), Value::Int(42));
        assert_eq!(lino!(3.5), Value::Float(3.5));
        assert_eq!(lino!("hello"), Value::Str("hello".to_string()));
    }

    #[test]
    fn test_lino_macro_lists() {
        assert_eq!(lino!([]), Value::List(List::new()));

        let list = lino!([1, "two", true]);
        let list = list.as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some(Value::Int(1)));
        assert_eq!(list.get(1), Some(Value::from("two")));
        assert_eq!(list.get(2), Some(Value::Bool(true)));
    }

    #[test]
    fn test_lino_macro_maps() {
        assert_eq!(lino!({}), Value::Map(Map::new()));

        let obj = lino!({
            "name": "Alice",
            "age": 30,
            "nested": {"ok": true}
        });
        let map = obj.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("age"), Some(Value::Int(30)));
        let nested = map.get("nested").unwrap();
        assert_eq!(nested.as_map().unwrap().get("ok"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_lino_macro_splices_handles() {
        let shared = List::new();
        let value = lino!([(shared.clone()), (shared.clone())]);
        let list = value.as_list().unwrap();
        let first = list.get(0).unwrap();
        assert!(first.as_list().unwrap().ptr_eq(&shared));
    }
}
