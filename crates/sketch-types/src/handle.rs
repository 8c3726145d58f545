use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the point slots of a single entity.
pub const MAX_POINTS_IN_ENTITY: usize = 12;

/// Sub-offsets that partition the handle namespace owned by one request.
///
/// Entity and parameter handles live in separate namespaces, so the same
/// offset may be used once for an entity and once for a parameter. Within a
/// namespace the ranges below never overlap and must never be reassigned.
pub mod offset {
    /// The primary entity (line, circle, ...). Also the datum point itself.
    pub const PRIMARY: u32 = 0;
    /// Point `i` lives at `FIRST_POINT + i`.
    pub const FIRST_POINT: u32 = 1;
    /// Coordinate `c` of point `i` lives at `POINT_PARAMS + POINT_PARAM_STRIDE * i + c`.
    pub const POINT_PARAMS: u32 = 16;
    pub const POINT_PARAM_STRIDE: u32 = 3;
    /// The normal entity, and the first of its quaternion parameters.
    pub const NORMAL: u32 = 32;
    pub const NORMAL_PARAM_COUNT: u32 = 4;
    /// The distance entity and its single parameter.
    pub const DISTANCE: u32 = 64;
    /// Width of the sub-offset field in a derived handle.
    pub const BITS: u32 = 16;
}

/// Handle of a user-authored request.
///
/// Request handles are confined to 15 bits so that every derived entity
/// handle keeps its top bit clear; entities with the top bit set belong to
/// other generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RequestHandle(u32);

impl RequestHandle {
    pub const REFERENCE_XY: Self = Self(1);
    pub const REFERENCE_YZ: Self = Self(2);
    pub const REFERENCE_ZX: Self = Self(3);
    /// Lowest handle ever assigned to a user-created request.
    pub const FIRST_USER: Self = Self(4);
    pub const MAX: u32 = 0x7fff;

    /// Panics if `v` is 0 or does not fit the request namespace. Request 0
    /// is never handed out: its primary entity would be `EntityHandle::FREE_IN_3D`.
    pub const fn new(v: u32) -> Self {
        assert!(v != 0, "request handle 0 is reserved");
        assert!(v <= Self::MAX, "request handle outside the request namespace");
        Self(v)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// True for the three reserved reference-plane requests.
    pub fn is_reference(self) -> bool {
        self == Self::REFERENCE_XY || self == Self::REFERENCE_YZ || self == Self::REFERENCE_ZX
    }

    /// Entity handle at sub-offset `k` of this request.
    pub fn entity(self, k: u32) -> EntityHandle {
        assert!(k < (1 << offset::BITS), "entity sub-offset {k} out of range");
        EntityHandle((self.0 << offset::BITS) | k)
    }

    /// Parameter handle at sub-offset `k` of this request.
    pub fn param(self, k: u32) -> ParamHandle {
        assert!(k < (1 << offset::BITS), "param sub-offset {k} out of range");
        ParamHandle((self.0 << offset::BITS) | k)
    }

    pub fn primary_entity(self) -> EntityHandle {
        self.entity(offset::PRIMARY)
    }

    /// Handle of point `index`. Points follow the primary entity, except
    /// when the request has no primary entity (datum point), in which case
    /// the first point takes the primary slot.
    pub fn point_entity(self, index: usize, has_primary: bool) -> EntityHandle {
        assert!(index < MAX_POINTS_IN_ENTITY, "point index {index} out of range");
        let base = if has_primary { offset::FIRST_POINT } else { offset::PRIMARY };
        self.entity(base + index as u32)
    }

    /// Parameter for coordinate `coord` (0 = x/u, 1 = y/v, 2 = z) of point `index`.
    pub fn point_param(self, index: usize, coord: usize) -> ParamHandle {
        assert!(index < MAX_POINTS_IN_ENTITY, "point index {index} out of range");
        assert!(coord < offset::POINT_PARAM_STRIDE as usize, "point coordinate {coord} out of range");
        self.param(offset::POINT_PARAMS + offset::POINT_PARAM_STRIDE * index as u32 + coord as u32)
    }

    pub fn normal_entity(self) -> EntityHandle {
        self.entity(offset::NORMAL)
    }

    /// Parameter for quaternion component `component` (w, x, y, z) of the normal.
    pub fn normal_param(self, component: usize) -> ParamHandle {
        assert!(
            component < offset::NORMAL_PARAM_COUNT as usize,
            "normal component {component} out of range"
        );
        self.param(offset::NORMAL + component as u32)
    }

    pub fn distance_entity(self) -> EntityHandle {
        self.entity(offset::DISTANCE)
    }

    pub fn distance_param(self) -> ParamHandle {
        self.param(offset::DISTANCE)
    }
}

impl TryFrom<u32> for RequestHandle {
    type Error = String;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        if v == 0 {
            return Err("request handle 0 is reserved".to_string());
        }
        if v > Self::MAX {
            return Err(format!("request handle {v:#x} exceeds {:#x}", Self::MAX));
        }
        Ok(Self(v))
    }
}

impl From<RequestHandle> for u32 {
    fn from(h: RequestHandle) -> u32 {
        h.0
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{:03x}", self.0)
    }
}

/// Handle of a generated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHandle(pub u32);

impl EntityHandle {
    /// Workplane sentinel: the entity or request is free in 3D space.
    pub const FREE_IN_3D: Self = Self(0);

    pub fn is_from_request(self) -> bool {
        self.0 & 0x8000_0000 == 0
    }

    /// The request that generated this entity, if any.
    pub fn request(self) -> Option<RequestHandle> {
        let v = self.0 >> offset::BITS;
        (self.is_from_request() && v != 0).then_some(RequestHandle(v))
    }

    /// Sub-offset of this entity within its request's namespace.
    pub fn sub_offset(self) -> u32 {
        self.0 & ((1 << offset::BITS) - 1)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{:08x}", self.0)
    }
}

/// Handle of a solver parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamHandle(pub u32);

impl ParamHandle {
    pub fn request(self) -> Option<RequestHandle> {
        let v = self.0 >> offset::BITS;
        (self.0 & 0x8000_0000 == 0 && v != 0).then_some(RequestHandle(v))
    }

    pub fn sub_offset(self) -> u32 {
        self.0 & ((1 << offset::BITS) - 1)
    }
}

impl fmt::Display for ParamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{:08x}", self.0)
    }
}

/// Handle of the group that owns a request and everything it generates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupHandle(pub u32);

impl GroupHandle {
    /// Group holding the three reference planes.
    pub const REFERENCES: Self = Self(1);
}

/// Handle of a visual style. Resolution happens outside this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleHandle(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_and_param_layout() {
        let r = RequestHandle::new(0x12);
        assert_eq!(r.primary_entity(), EntityHandle(0x0012_0000));
        assert_eq!(r.point_entity(0, true), EntityHandle(0x0012_0001));
        assert_eq!(r.point_entity(0, false), EntityHandle(0x0012_0000));
        assert_eq!(r.point_param(1, 2), ParamHandle(0x0012_0000 + 16 + 3 + 2));
        assert_eq!(r.normal_entity(), EntityHandle(0x0012_0020));
        assert_eq!(r.normal_param(3), ParamHandle(0x0012_0023));
        assert_eq!(r.distance_entity(), EntityHandle(0x0012_0040));
        assert_eq!(r.distance_param(), ParamHandle(0x0012_0040));
    }

    #[test]
    fn test_reverse_mapping() {
        let r = RequestHandle::new(0x7fff);
        let e = r.point_entity(4, true);
        assert!(e.is_from_request());
        assert_eq!(e.request(), Some(r));
        assert_eq!(e.sub_offset(), 5);
        assert_eq!(r.normal_param(2).request(), Some(r));

        let foreign = EntityHandle(0x8001_0002);
        assert!(!foreign.is_from_request());
        assert_eq!(foreign.request(), None);
    }

    #[test]
    fn test_reference_handles() {
        assert!(RequestHandle::REFERENCE_XY.is_reference());
        assert!(RequestHandle::REFERENCE_ZX.is_reference());
        assert!(!RequestHandle::FIRST_USER.is_reference());
        assert_eq!(RequestHandle::REFERENCE_YZ.to_string(), "r002");
    }

    #[test]
    #[should_panic(expected = "request namespace")]
    fn test_request_handle_too_large() {
        let _ = RequestHandle::new(0x8000);
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn test_request_handle_zero_is_reserved() {
        let _ = RequestHandle::new(0);
    }

    #[test]
    fn test_no_request_owns_the_free_sentinel() {
        assert_ne!(RequestHandle::new(1).primary_entity(), EntityHandle::FREE_IN_3D);
        assert_eq!(EntityHandle::FREE_IN_3D.request(), None);
    }

    #[test]
    #[should_panic(expected = "point index")]
    fn test_point_index_out_of_range() {
        let _ = RequestHandle::new(5).point_entity(MAX_POINTS_IN_ENTITY, true);
    }

    #[test]
    fn test_request_handle_serde_rejects_out_of_range() {
        let ok: RequestHandle = serde_json::from_str("7").unwrap();
        assert_eq!(ok, RequestHandle::new(7));
        assert!(serde_json::from_str::<RequestHandle>("32768").is_err());
        assert!(serde_json::from_str::<RequestHandle>("0").is_err());
    }
}
