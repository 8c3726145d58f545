use serde::{Deserialize, Serialize};

use crate::handle::{
    EntityHandle, GroupHandle, ParamHandle, StyleHandle, MAX_POINTS_IN_ENTITY,
};

/// Parameter slots on one entity: the largest user is a 3D normal (quaternion).
pub const MAX_PARAMS_IN_ENTITY: usize = 4;

/// The kind of a generated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityKind {
    PointIn3d,
    PointIn2d,
    NormalIn3d,
    NormalIn2d,
    Distance,
    Workplane,
    LineSegment,
    Cubic,
    CubicPeriodic,
    Circle,
    ArcOfCircle,
    TtfText,
}

impl EntityKind {
    pub fn is_point(self) -> bool {
        matches!(self, EntityKind::PointIn3d | EntityKind::PointIn2d)
    }

    pub fn is_normal(self) -> bool {
        matches!(self, EntityKind::NormalIn3d | EntityKind::NormalIn2d)
    }

    pub fn is_distance(self) -> bool {
        matches!(self, EntityKind::Distance)
    }

    pub fn is_workplane(self) -> bool {
        matches!(self, EntityKind::Workplane)
    }

    pub fn has_text(self) -> bool {
        matches!(self, EntityKind::TtfText)
    }

    /// Number of solver parameters an entity of this kind owns directly.
    /// A 2D normal reads its orientation from the workplane and owns none.
    pub fn param_count(self) -> usize {
        match self {
            EntityKind::PointIn3d => 3,
            EntityKind::PointIn2d => 2,
            EntityKind::NormalIn3d => 4,
            EntityKind::Distance => 1,
            _ => 0,
        }
    }
}

/// Fixed-capacity sequence of handles. Filling past `N` or reading an index
/// at or beyond `N` is a programming defect and panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slots<H, const N: usize>(Vec<H>);

impl<H: Copy, const N: usize> Slots<H, N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, h: H) {
        assert!(self.0.len() < N, "slot capacity {N} exceeded");
        self.0.push(h);
    }

    /// The handle in slot `i`, or `None` if the slot is empty.
    pub fn get(&self, i: usize) -> Option<H> {
        assert!(i < N, "slot index {i} out of range (capacity {N})");
        self.0.get(i).copied()
    }

    pub fn first(&self) -> Option<H> {
        self.0.first().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[H] {
        &self.0
    }
}

impl<H: Copy, const N: usize> Default for Slots<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

pub type PointSlots = Slots<EntityHandle, MAX_POINTS_IN_ENTITY>;
pub type ParamSlots = Slots<ParamHandle, MAX_PARAMS_IN_ENTITY>;

/// A generated geometric object. Cross-references to points, normal and
/// distance are handles into the entity registry, not owned values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub h: EntityHandle,
    pub kind: EntityKind,
    pub group: GroupHandle,
    pub style: StyleHandle,
    pub workplane: EntityHandle,
    pub construction: bool,
    pub extra_points: usize,
    pub points: PointSlots,
    pub normal: Option<EntityHandle>,
    pub distance: Option<EntityHandle>,
    pub params: ParamSlots,
    pub text: String,
    pub font: String,
}

impl Entity {
    pub fn new(h: EntityHandle, kind: EntityKind) -> Self {
        Self {
            h,
            kind,
            group: GroupHandle::default(),
            style: StyleHandle::default(),
            workplane: EntityHandle::FREE_IN_3D,
            construction: false,
            extra_points: 0,
            points: PointSlots::new(),
            normal: None,
            distance: None,
            params: ParamSlots::new(),
            text: String::new(),
            font: String::new(),
        }
    }

    pub fn is_free_in_3d(&self) -> bool {
        self.workplane == EntityHandle::FREE_IN_3D
    }
}

/// A scalar unknown. Its value belongs to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub h: ParamHandle,
}
