//! Container identity for the encoder.
//!
//! Two pieces of state decide whether a container is written out in full or
//! as a `(ref obj_N)` back-reference:
//!
//! - [`IdentityTracker`]: every container seen so far in the current encode,
//!   with the reference id it was given on first encounter.
//! - [`Ancestors`]: the containers on the current recursion path. It is a
//!   persistent set: extending it returns a new set and leaves the parent's
//!   untouched, so sibling subtrees never see each other's path.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identity of a container handle, valid while the container is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(usize);

impl ContainerId {
    pub(crate) fn of<T>(handle: &Rc<T>) -> Self {
        ContainerId(Rc::as_ptr(handle) as *const () as usize)
    }
}

/// A per-encode reference id, rendered as `obj_<n>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefId(usize);

impl RefId {
    /// Returns the sequence number of this id.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj_{}", self.0)
    }
}

/// Result of [`IdentityTracker::track`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tracked {
    /// First encounter; the container has just been given this id.
    Fresh(RefId),
    /// The container was already given this id earlier in the encode.
    Reused(RefId),
}

impl Tracked {
    #[must_use]
    pub const fn ref_id(&self) -> RefId {
        match self {
            Tracked::Fresh(id) | Tracked::Reused(id) => *id,
        }
    }
}

/// Assigns reference ids to containers in first-encounter order.
///
/// Ids start at `obj_0` for every new tracker.
///
/// # Examples
///
/// ```rust
/// use lino_objects_codec::identity::{IdentityTracker, Tracked};
/// use lino_objects_codec::{List, Value};
///
/// let a = Value::from(List::new());
/// let b = Value::from(List::new());
/// let mut tracker = IdentityTracker::new();
///
/// assert_eq!(tracker.track(&a).unwrap().ref_id().to_string(), "obj_0");
/// assert_eq!(tracker.track(&b).unwrap().ref_id().to_string(), "obj_1");
/// assert!(matches!(tracker.track(&a), Some(Tracked::Reused(_))));
/// assert!(tracker.track(&Value::from(3)).is_none());
/// ```
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashMap<ContainerId, RefId>,
    next: usize,
}

impl IdentityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a container value. Returns `None` for scalars, which have no
    /// identity.
    pub fn track(&mut self, value: &crate::Value) -> Option<Tracked> {
        value.container_id().map(|id| self.track_id(id))
    }

    pub(crate) fn track_id(&mut self, id: ContainerId) -> Tracked {
        if let Some(ref_id) = self.seen.get(&id) {
            return Tracked::Reused(*ref_id);
        }
        let ref_id = RefId(self.next);
        self.next += 1;
        self.seen.insert(id, ref_id);
        Tracked::Fresh(ref_id)
    }

    /// Number of containers tracked so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

struct PathNode {
    id: ContainerId,
    parent: Option<Rc<PathNode>>,
}

/// An immutable set of the containers on the current recursion path.
///
/// Cloning is O(1); [`Ancestors::with`] shares the parent's nodes.
#[derive(Clone, Default)]
pub struct Ancestors {
    head: Option<Rc<PathNode>>,
    depth: usize,
}

impl Ancestors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new set extended with `id`.
    #[must_use]
    pub fn with(&self, id: ContainerId) -> Self {
        Ancestors {
            head: Some(Rc::new(PathNode {
                id,
                parent: self.head.clone(),
            })),
            depth: self.depth + 1,
        }
    }

    #[must_use]
    pub fn contains(&self, id: ContainerId) -> bool {
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if current.id == id {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }

    /// Number of containers on the path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Debug for Ancestors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids = Vec::with_capacity(self.depth);
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            ids.push(current.id);
            node = current.parent.as_deref();
        }
        f.debug_list().entries(ids.iter().rev()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{List, Map, Value};

    #[test]
    fn test_ids_are_sequential_per_tracker() {
        let values: Vec<Value> = (0..3).map(|_| Value::from(Map::new())).collect();
        let mut tracker = IdentityTracker::new();
        for (i, value) in values.iter().enumerate() {
            assert_eq!(tracker.track(value), Some(Tracked::Fresh(RefId(i))));
        }
        assert_eq!(tracker.len(), 3);

        let mut fresh = IdentityTracker::new();
        assert_eq!(fresh.track(&values[2]), Some(Tracked::Fresh(RefId(0))));
    }

    #[test]
    fn test_ref_id_index_matches_rendering() {
        let values: Vec<Value> = (0..12).map(|_| Value::from(List::new())).collect();
        let mut tracker = IdentityTracker::new();
        let ids: Vec<RefId> = values
            .iter()
            .filter_map(|value| tracker.track(value))
            .map(|tracked| tracked.ref_id())
            .collect();
        let last = ids[11];
        assert_eq!(last.index(), 11);
        assert_eq!(last.to_string(), format!("obj_{}", last.index()));
        assert!(ids.iter().enumerate().all(|(i, id)| id.index() == i));
    }

    #[test]
    fn test_clones_share_identity() {
        let list = List::new();
        let mut tracker = IdentityTracker::new();
        let first = tracker.track(&Value::from(list.clone()));
        let second = tracker.track(&Value::from(list));
        assert_eq!(first, Some(Tracked::Fresh(RefId(0))));
        assert_eq!(second, Some(Tracked::Reused(RefId(0))));
    }

    #[test]
    fn test_ancestors_are_persistent() {
        let (first, second) = (List::new(), List::new());
        let (a, b) = (first.container_id(), second.container_id());
        let root = Ancestors::new();
        let left = root.with(a);
        let right = root.with(b);

        assert!(left.contains(a));
        assert!(!left.contains(b));
        assert!(right.contains(b));
        assert!(!right.contains(a));
        assert!(!root.contains(a));
        assert_eq!(left.with(b).depth(), 2);
    }
}
