use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use crate::entity::{Entity, Param};
use crate::handle::{EntityHandle, ParamHandle, RequestHandle};
use crate::request::Request;

/// Anything stored by handle.
pub trait Identified {
    type Handle: Copy + Ord + Debug + Display;

    fn handle(&self) -> Self::Handle;
}

impl Identified for Request {
    type Handle = RequestHandle;

    fn handle(&self) -> RequestHandle {
        self.h
    }
}

impl Identified for Entity {
    type Handle = EntityHandle;

    fn handle(&self) -> EntityHandle {
        self.h
    }
}

impl Identified for Param {
    type Handle = ParamHandle;

    fn handle(&self) -> ParamHandle {
        self.h
    }
}

/// Append-only destination for generated objects, keyed by handle.
pub trait Sink<T: Identified> {
    fn contains(&self, handle: T::Handle) -> bool;
    fn add(&mut self, item: T);
}

impl<T: Identified> Sink<T> for Vec<T> {
    fn contains(&self, handle: T::Handle) -> bool {
        self.iter().any(|item| item.handle() == handle)
    }

    fn add(&mut self, item: T) {
        self.push(item);
    }
}

/// Collection ordered and indexed by handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, T::Handle: Serialize",
    deserialize = "T: Deserialize<'de>, T::Handle: Deserialize<'de>"
))]
pub struct IdList<T: Identified> {
    items: BTreeMap<T::Handle, T>,
}

impl<T: Identified> IdList<T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Insert `item`. Panics if its handle is already present.
    pub fn add(&mut self, item: T) {
        let h = item.handle();
        assert!(!self.items.contains_key(&h), "handle {h} is not unique");
        self.items.insert(h, item);
    }

    pub fn contains(&self, handle: T::Handle) -> bool {
        self.items.contains_key(&handle)
    }

    pub fn find(&self, handle: T::Handle) -> Option<&T> {
        self.items.get(&handle)
    }

    pub fn find_mut(&mut self, handle: T::Handle) -> Option<&mut T> {
        self.items.get_mut(&handle)
    }

    pub fn remove(&mut self, handle: T::Handle) -> Option<T> {
        self.items.remove(&handle)
    }

    /// Items in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn handles(&self) -> impl Iterator<Item = T::Handle> + '_ {
        self.items.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Identified> Default for IdList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> Sink<T> for IdList<T> {
    fn contains(&self, handle: T::Handle) -> bool {
        IdList::contains(self, handle)
    }

    fn add(&mut self, item: T) {
        IdList::add(self, item);
    }
}

impl IdList<Request> {
    /// Give `request` the next free handle and insert it. User requests
    /// never receive one of the reserved reference-plane handles.
    pub fn add_and_assign_id(&mut self, mut request: Request) -> RequestHandle {
        let next = self
            .items
            .keys()
            .next_back()
            .map(|h| h.value() + 1)
            .unwrap_or(0)
            .max(RequestHandle::FIRST_USER.value());
        let h = RequestHandle::new(next);
        request.h = h;
        self.add(request);
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::GroupHandle;
    use crate::request::{ReferencePlane, RequestKind};

    fn line() -> Request {
        Request::new(RequestHandle::FIRST_USER, RequestKind::LineSegment, GroupHandle(2))
    }

    #[test]
    fn test_assign_id_skips_reserved_handles() {
        let mut requests = IdList::new();
        let a = requests.add_and_assign_id(line());
        let b = requests.add_and_assign_id(line());
        assert_eq!(a, RequestHandle::FIRST_USER);
        assert_eq!(b, RequestHandle::new(5));
        assert_eq!(requests.find(b).map(|r| r.h), Some(b));
    }

    #[test]
    fn test_assign_id_after_references() {
        let mut requests = IdList::new();
        for plane in ReferencePlane::ALL {
            requests.add(Request::reference(plane));
        }
        let h = requests.add_and_assign_id(line());
        assert_eq!(h, RequestHandle::FIRST_USER);
        assert_eq!(requests.len(), 4);
    }

    #[test]
    fn test_iteration_is_handle_ordered() {
        let mut params = IdList::new();
        params.add(Param { h: ParamHandle(9) });
        params.add(Param { h: ParamHandle(3) });
        params.add(Param { h: ParamHandle(5) });
        let order: Vec<u32> = params.handles().map(|h| h.0).collect();
        assert_eq!(order, vec![3, 5, 9]);
    }

    #[test]
    #[should_panic(expected = "not unique")]
    fn test_duplicate_add_panics() {
        let mut params = IdList::new();
        params.add(Param { h: ParamHandle(1) });
        params.add(Param { h: ParamHandle(1) });
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<Param> = Vec::new();
        Sink::add(&mut sink, Param { h: ParamHandle(4) });
        assert!(Sink::contains(&sink, ParamHandle(4)));
        assert!(!Sink::contains(&sink, ParamHandle(5)));
    }
}
