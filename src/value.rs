//! The object graph value model.
//!
//! [`Value`] is the kind of value a dynamic-language runtime manipulates:
//! scalars plus two container kinds. Scalars are plain values; containers
//! ([`List`] and [`Map`]) are shared handles, so two positions in a graph can
//! refer to the same container and a container can contain itself.
//!
//! ## Core Types
//!
//! - [`Value`]: null, undefined, bool, int, bigint, float, string, list, map
//! - [`List`]: shared, growable, ordered sequence of values
//! - [`Map`]: shared, insertion-ordered mapping from [`Key`] to value
//! - [`Key`]: the scalar values usable as map keys
//!
//! ## Usage Patterns
//!
//! ### Sharing and cycles
//!
//! ```rust
//! use lino_objects_codec::{List, Map, Value};
//!
//! let shared = List::from_vec(vec![Value::from(1), Value::from(2)]);
//! let outer = List::new();
//! outer.push(shared.clone());
//! outer.push(shared.clone());
//!
//! // Both slots hold the same container
//! let first = outer.get(0).unwrap();
//! let second = outer.get(1).unwrap();
//! assert!(first.as_list().unwrap().ptr_eq(second.as_list().unwrap()));
//!
//! // A map that contains itself
//! let node = Map::new();
//! node.insert("self", node.clone());
//! assert!(node.get("self").unwrap().as_map().unwrap().ptr_eq(&node));
//! ```
//!
//! ### Equality
//!
//! `==` on values is structural. It treats `NaN` as equal to itself and
//! terminates on cyclic graphs. Use [`List::ptr_eq`] / [`Map::ptr_eq`] to
//! ask about identity.

use crate::identity::{Ancestors, ContainerId};
use crate::{Error, Result};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A value in an object graph.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::Value;
///
/// let null = Value::Null;
/// let num = Value::from(42);
/// let text = Value::from("hello");
///
/// assert!(null.is_null());
/// assert!(num.is_int());
/// assert!(text.is_str());
/// ```
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    /// A value that was never given, distinct from an explicit `Null`.
    Undefined,
    Bool(bool),
    Int(i64),
    /// Integers outside the `i64` range.
    BigInt(BigInt),
    Float(f64),
    Str(String),
    List(List),
    Map(Map),
}

/// A shared, growable list of values.
///
/// Cloning a `List` clones the handle, not the elements. Handles are
/// reference counted, so a list that reaches itself is never freed on drop;
/// call [`Value::release`] when a cyclic graph is no longer needed.
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Vec<Value>>>);

/// A shared, insertion-ordered map.
///
/// Cloning a `Map` clones the handle, not the entries. As with [`List`], a
/// map that reaches itself stays allocated until [`Value::release`] breaks
/// the cycle.
#[derive(Clone, Default)]
pub struct Map(Rc<RefCell<IndexMap<Key, Value>>>);

/// A map key: any scalar [`Value`].
///
/// Floats compare and hash by bit pattern, so `NaN` can be a key. Every
/// `NaN` is stored as [`f64::NAN`], which makes all of them the same key;
/// `0.0` and `-0.0` stay distinct.
#[derive(Clone, Debug)]
pub enum Key {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Str(String),
}

impl List {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding `values`.
    #[must_use]
    pub fn from_vec(values: Vec<Value>) -> Self {
        List(Rc::new(RefCell::new(values)))
    }

    /// Appends a value to the end of the list.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Returns the element at `index`. Containers come back as handles to
    /// the same container.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        self.0
            .borrow_mut()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a snapshot of the elements.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Borrows the underlying elements.
    ///
    /// # Panics
    ///
    /// Panics if the list is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    /// Returns `true` if both handles point at the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn container_id(&self) -> ContainerId {
        ContainerId::of(&self.0)
    }

    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> std::rc::Weak<RefCell<Vec<Value>>> {
        Rc::downgrade(&self.0)
    }
}

impl Map {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, keeping the original position of an existing key.
    ///
    /// Returns the previous value for the key, if any.
    pub fn insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value.into())
    }

    /// Looks up a value by key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::{Map, Value};
    ///
    /// let map = Map::new();
    /// map.insert("name", "Alice");
    /// map.insert(1, true);
    /// assert_eq!(map.get("name"), Some(Value::from("Alice")));
    /// assert_eq!(map.get(1), Some(Value::Bool(true)));
    /// assert_eq!(map.get("missing"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        self.0.borrow().get(&key.into()).cloned()
    }

    #[must_use]
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.0.borrow().contains_key(&key.into())
    }

    /// Removes an entry, preserving the order of the remaining entries.
    pub fn remove(&self, key: impl Into<Key>) -> Option<Value> {
        self.0.borrow_mut().shift_remove(&key.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a snapshot of the keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Returns a snapshot of the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Borrows the underlying entries.
    ///
    /// # Panics
    ///
    /// Panics if the map is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, IndexMap<Key, Value>> {
        self.0.borrow()
    }

    /// Returns `true` if both handles point at the same map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn container_id(&self) -> ContainerId {
        ContainerId::of(&self.0)
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List::from_vec(iter.into_iter().collect())
    }
}

impl FromIterator<(Key, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Map(Rc::new(RefCell::new(iter.into_iter().collect())))
    }
}

impl Key {
    /// Returns the string if this key is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Null, Key::Null) | (Key::Undefined, Key::Undefined) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::BigInt(a), Key::BigInt(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::Str(a), Key::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Null | Key::Undefined => {}
            Key::Bool(b) => b.hash(state),
            Key::Int(i) => i.hash(state),
            Key::BigInt(i) => i.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::Str(s) => s.hash(state),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::Str(value.clone())
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Key::Float(f64::NAN)
        } else {
            Key::Float(value)
        }
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Null => Value::Null,
            Key::Undefined => Value::Undefined,
            Key::Bool(b) => Value::Bool(b),
            Key::Int(i) => Value::Int(i),
            Key::BigInt(i) => Value::BigInt(i),
            Key::Float(f) => Value::Float(f),
            Key::Str(s) => Value::Str(s),
        }
    }
}

impl TryFrom<Value> for Key {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Key::Null),
            Value::Undefined => Ok(Key::Undefined),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Int(i) => Ok(Key::Int(i)),
            Value::BigInt(i) => Ok(Key::BigInt(i)),
            Value::Float(f) => Ok(Key::from(f)),
            Value::Str(s) => Ok(Key::Str(s)),
            Value::List(_) | Value::Map(_) => Err(Error::invalid_node(&format!(
                "map key must be a scalar, found {}",
                value.kind_name()
            ))),
        }
    }
}

impl Value {
    /// Empties every container reachable from this value.
    ///
    /// Containers are reference counted, so a cycle keeps itself alive after
    /// the last outside handle is dropped. Releasing clears each reachable
    /// list and map, which breaks every cycle and lets the graph be freed.
    /// Other handles into the graph observe the containers as empty.
    /// Scalars are left untouched.
    ///
    /// ```rust
    /// use lino_objects_codec::{decode, Value};
    ///
    /// let value = decode("(object obj_0 ((str c2VsZg==) (ref obj_0)))").unwrap();
    /// value.release();
    /// assert!(value.as_map().unwrap().is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if a reachable container is currently borrowed.
    pub fn release(&self) {
        let mut pending = vec![self.clone()];
        while let Some(value) = pending.pop() {
            match value {
                Value::List(list) => {
                    let items = std::mem::take(&mut *list.0.borrow_mut());
                    pending.extend(items);
                }
                Value::Map(map) => {
                    let entries = std::mem::take(&mut *map.0.borrow_mut());
                    pending.extend(entries.into_values());
                }
                _ => {}
            }
        }
    }

    /// Returns the tag name this value is written under.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::BigInt(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "array",
            Value::Map(_) => "object",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` for both `Int` and `BigInt`.
    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns `true` for lists and maps, the values that carry identity.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if it fits in an `i64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::Value;
    ///
    /// assert_eq!(Value::from(7).as_i64(), Some(7));
    /// assert_eq!(Value::from(7.0).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::BigInt(i) => i64::try_from(i).ok(),
            _ => None,
        }
    }

    /// Returns the integer as a `BigInt`, whichever variant holds it.
    #[must_use]
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Int(i) => Some(BigInt::from(*i)),
            Value::BigInt(i) => Some(i.clone()),
            _ => None,
        }
    }

    /// Returns the float, widening `Int` values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn container_id(&self) -> Option<ContainerId> {
        match self {
            Value::List(list) => Some(list.container_id()),
            Value::Map(map) => Some(map.container_id()),
            _ => None,
        }
    }

    /// Structural equality.
    ///
    /// Floats compare by value except that `NaN` equals `NaN`; `Int` and
    /// `BigInt` compare numerically. Cycles are handled by assuming a pair of
    /// containers already under comparison is equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_objects_codec::{List, Value};
    ///
    /// let a = List::new();
    /// a.push(a.clone());
    /// let b = List::new();
    /// b.push(b.clone());
    /// assert!(Value::from(a).deep_eq(&Value::from(b)));
    /// assert!(Value::Float(f64::NAN).deep_eq(&Value::Float(f64::NAN)));
    /// ```
    #[must_use]
    pub fn deep_eq(&self, other: &Value) -> bool {
        deep_eq(self, other, &mut HashSet::new())
    }
}

fn deep_eq(a: &Value, b: &Value, assumed: &mut HashSet<(ContainerId, ContainerId)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::Int(x), Value::BigInt(y)) | (Value::BigInt(y), Value::Int(x)) => {
            &BigInt::from(*x) == y
        }
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.container_id(), y.container_id())) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| deep_eq(a, b, assumed))
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.container_id(), y.container_id())) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter().zip(y.iter()).all(|((ka, va), (kb, vb))| {
                    ka == kb && deep_eq(va, vb, assumed)
                })
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        deep_eq(
            &Value::List(self.clone()),
            &Value::List(other.clone()),
            &mut HashSet::new(),
        )
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        deep_eq(
            &Value::Map(self.clone()),
            &Value::Map(other.clone()),
            &mut HashSet::new(),
        )
    }
}

fn fmt_value(value: &Value, f: &mut fmt::Formatter<'_>, path: &Ancestors) -> fmt::Result {
    match value {
        Value::Null => f.write_str("Null"),
        Value::Undefined => f.write_str("Undefined"),
        Value::Bool(b) => write!(f, "Bool({})", b),
        Value::Int(i) => write!(f, "Int({})", i),
        Value::BigInt(i) => write!(f, "BigInt({})", i),
        Value::Float(x) => write!(f, "Float({:?})", x),
        Value::Str(s) => write!(f, "Str({:?})", s),
        Value::List(list) => {
            let id = list.container_id();
            if path.contains(id) {
                return f.write_str("<cycle>");
            }
            let path = path.with(id);
            f.write_str("[")?;
            for (i, item) in list.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                fmt_value(item, f, &path)?;
            }
            f.write_str("]")
        }
        Value::Map(map) => {
            let id = map.container_id();
            if path.contains(id) {
                return f.write_str("<cycle>");
            }
            let path = path.with(id);
            f.write_str("{")?;
            for (i, (key, item)) in map.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}: ", key)?;
                fmt_value(item, f, &path)?;
            }
            f.write_str("}")
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(self, f, &Ancestors::new())
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(&Value::List(self.clone()), f, &Ancestors::new())
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(&Value::Map(self.clone()), f, &Ancestors::new())
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Null | Key::Undefined => serializer.serialize_unit(),
            Key::Bool(b) => serializer.serialize_bool(*b),
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::BigInt(i) => serialize_bigint(i, serializer),
            Key::Float(f) => serializer.serialize_f64(*f),
            Key::Str(s) => serializer.serialize_str(s),
        }
    }
}

/// Big integers go out as `i128` when they fit and as decimal text otherwise.
fn serialize_bigint<S>(value: &BigInt, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match i128::try_from(value) {
        Ok(i) => serializer.serialize_i128(i),
        Err(_) => serializer.serialize_str(&value.to_string()),
    }
}

/// Serializes a value while refusing to follow a cycle.
struct Acyclic<'a> {
    value: &'a Value,
    path: Ancestors,
}

impl Serialize for Acyclic<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error as _;

        if let Some(id) = self.value.container_id() {
            if self.path.contains(id) {
                return Err(S::Error::custom(Error::CyclicValue(
                    self.value.kind_name().to_string(),
                )));
            }
        }

        match self.value {
            Value::Null | Value::Undefined => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::BigInt(i) => serialize_bigint(i, serializer),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let path = self.path.with(list.container_id());
                let items = list.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&Acyclic {
                        value: item,
                        path: path.clone(),
                    })?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let path = self.path.with(map.container_id());
                let entries = map.borrow();
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries.iter() {
                    out.serialize_entry(
                        key,
                        &Acyclic {
                            value: item,
                            path: path.clone(),
                        },
                    )?;
                }
                out.end()
            }
        }
    }
}

/// Serializes the value as a tree. Shared containers are written once per
/// occurrence; a cyclic graph is an error.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Acyclic {
            value: self,
            path: Ancestors::new(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid object graph value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::Str(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::Str(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(List::from_vec(items)))
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                use serde::de::Error as _;

                let map = Map::new();
                while let Some((key, item)) = access.next_entry::<Value, Value>()? {
                    let key = Key::try_from(key).map_err(A::Error::custom)?;
                    map.insert(key, item);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::custom(format!("Expected int, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::custom(format!("Expected float, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::custom(format!("Expected bool, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(Error::custom(format!(
                "Expected str, found {}",
                other.kind_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

/// Integers that fit in an `i64` become [`Value::Int`].
impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(value),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(List::from_vec(value))
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
