use serde::{Deserialize, Serialize};

use crate::handle::{EntityHandle, GroupHandle, RequestHandle, StyleHandle};

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestKind {
    Workplane,
    DatumPoint,
    LineSegment,
    Cubic,
    CubicPeriodic,
    Circle,
    ArcOfCircle,
    TtfText,
}

impl RequestKind {
    /// Kinds whose primary entity carries a text string and font.
    pub fn has_text(self) -> bool {
        matches!(self, RequestKind::TtfText)
    }
}

/// One of the three canonical reference planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReferencePlane {
    Xy,
    Yz,
    Zx,
}

impl ReferencePlane {
    pub const ALL: [ReferencePlane; 3] = [ReferencePlane::Xy, ReferencePlane::Yz, ReferencePlane::Zx];

    pub fn handle(self) -> RequestHandle {
        match self {
            ReferencePlane::Xy => RequestHandle::REFERENCE_XY,
            ReferencePlane::Yz => RequestHandle::REFERENCE_YZ,
            ReferencePlane::Zx => RequestHandle::REFERENCE_ZX,
        }
    }

    pub fn from_handle(h: RequestHandle) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.handle() == h)
    }

    /// Short tag used in request descriptions.
    pub fn tag(self) -> &'static str {
        match self {
            ReferencePlane::Xy => "#XY",
            ReferencePlane::Yz => "#YZ",
            ReferencePlane::Zx => "#ZX",
        }
    }
}

/// A user-created intent that expands into entities and parameters.
/// Requests are never modified by expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub h: RequestHandle,
    pub kind: RequestKind,
    /// Points beyond the recipe's base count; only used by extendable kinds.
    #[serde(default)]
    pub extra_points: usize,
    pub group: GroupHandle,
    #[serde(default)]
    pub style: StyleHandle,
    /// `EntityHandle::FREE_IN_3D` when not confined to a workplane.
    pub workplane: EntityHandle,
    #[serde(default)]
    pub construction: bool,
    /// Text payload, read only for text kinds.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font: String,
}

impl Request {
    /// A request of `kind` with default payload, free in 3D.
    pub fn new(h: RequestHandle, kind: RequestKind, group: GroupHandle) -> Self {
        Self {
            h,
            kind,
            extra_points: 0,
            group,
            style: StyleHandle::default(),
            workplane: EntityHandle::FREE_IN_3D,
            construction: false,
            text: String::new(),
            font: String::new(),
        }
    }

    /// The workplane request backing one of the reference planes.
    pub fn reference(plane: ReferencePlane) -> Self {
        Self::new(plane.handle(), RequestKind::Workplane, GroupHandle::REFERENCES)
    }

    pub fn on_workplane(mut self, workplane: EntityHandle) -> Self {
        self.workplane = workplane;
        self
    }

    pub fn with_extra_points(mut self, extra_points: usize) -> Self {
        self.extra_points = extra_points;
        self
    }

    pub fn is_free_in_3d(&self) -> bool {
        self.workplane == EntityHandle::FREE_IN_3D
    }
}
