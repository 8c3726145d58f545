use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use sketch_types::{EntityKind, RequestKind, MAX_POINTS_IN_ENTITY};

/// Label returned for request kinds missing from the table.
pub const UNKNOWN_LABEL: &str = "???";

/// How one request kind expands into entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub request_kind: RequestKind,
    /// `None` when the request has no primary entity of its own (datum point).
    pub entity_kind: Option<EntityKind>,
    /// Base number of point sub-entities.
    pub points: usize,
    /// Whether the request's `extra_points` are added to `points`.
    pub extendable: bool,
    pub has_normal: bool,
    pub has_distance: bool,
    pub label: String,
}

impl Recipe {
    pub fn new(
        request_kind: RequestKind,
        entity_kind: Option<EntityKind>,
        points: usize,
        extendable: bool,
        has_normal: bool,
        has_distance: bool,
        label: &str,
    ) -> Self {
        Self {
            request_kind,
            entity_kind,
            points,
            extendable,
            has_normal,
            has_distance,
            label: label.to_string(),
        }
    }

    /// Number of points generated for a request with `extra_points`.
    /// Saturates, so an absurd count still fails the point limit check.
    pub fn point_count(&self, extra_points: usize) -> usize {
        if self.extendable {
            self.points.saturating_add(extra_points)
        } else {
            self.points
        }
    }
}

/// Rows rejected while building a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("request kind {kind:?} appears more than once")]
    DuplicateRequestKind { kind: RequestKind },

    #[error("entity kind {kind:?} is produced by more than one request kind")]
    DuplicateEntityKind { kind: EntityKind },

    #[error("{kind:?} needs a normal but generates no point to anchor it")]
    NormalWithoutPoint { kind: RequestKind },

    #[error("{kind:?} has {points} base points, limit is {limit}")]
    TooManyPoints {
        kind: RequestKind,
        points: usize,
        limit: usize,
    },
}

/// Immutable, ordered mapping from request kind to recipe.
///
/// The built-in table is available through [`SchemaTable::shared`]; custom
/// tables can be deserialized or built with [`SchemaTable::from_rows`], both
/// of which validate the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Recipe>", into = "Vec<Recipe>")]
pub struct SchemaTable {
    rows: Vec<Recipe>,
}

static SHARED: OnceLock<SchemaTable> = OnceLock::new();

impl SchemaTable {
    /// The built-in table.
    pub fn standard() -> Self {
        use EntityKind as E;
        use RequestKind as R;

        //                            entity                 pts  xtra   normal dist
        let rows = vec![
            Recipe::new(R::Workplane, Some(E::Workplane), 1, false, true, false, "workplane"),
            Recipe::new(R::DatumPoint, None, 1, false, false, false, "datum-point"),
            Recipe::new(R::LineSegment, Some(E::LineSegment), 2, false, false, false, "line-segment"),
            Recipe::new(R::Cubic, Some(E::Cubic), 4, true, false, false, "cubic-bezier"),
            Recipe::new(R::CubicPeriodic, Some(E::CubicPeriodic), 3, true, false, false, "periodic-cubic"),
            Recipe::new(R::Circle, Some(E::Circle), 1, false, true, true, "circle"),
            Recipe::new(R::ArcOfCircle, Some(E::ArcOfCircle), 3, false, true, false, "arc-of-circle"),
            Recipe::new(R::TtfText, Some(E::TtfText), 2, false, true, false, "ttf-text"),
        ];
        Self { rows }
    }

    /// Process-wide built-in table, built on first use and never mutated.
    pub fn shared() -> &'static SchemaTable {
        SHARED.get_or_init(SchemaTable::standard)
    }

    /// Build a table from custom rows.
    pub fn from_rows(rows: Vec<Recipe>) -> Result<Self, SchemaError> {
        let mut request_kinds = HashSet::new();
        let mut entity_kinds = HashSet::new();

        for row in &rows {
            if !request_kinds.insert(row.request_kind) {
                return Err(SchemaError::DuplicateRequestKind {
                    kind: row.request_kind,
                });
            }
            if let Some(kind) = row.entity_kind {
                if !entity_kinds.insert(kind) {
                    return Err(SchemaError::DuplicateEntityKind { kind });
                }
            }
            if row.points > MAX_POINTS_IN_ENTITY {
                return Err(SchemaError::TooManyPoints {
                    kind: row.request_kind,
                    points: row.points,
                    limit: MAX_POINTS_IN_ENTITY,
                });
            }
            // An extendable row may still receive points at expansion time.
            if row.has_normal && row.points == 0 && !row.extendable {
                return Err(SchemaError::NormalWithoutPoint {
                    kind: row.request_kind,
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Recipe] {
        &self.rows
    }

    pub fn recipe_for_request_kind(&self, kind: RequestKind) -> Option<&Recipe> {
        self.rows.iter().find(|r| r.request_kind == kind)
    }

    /// Inverse lookup: the recipe whose primary entity has `kind`. Point,
    /// normal and distance kinds have no recipe of their own.
    pub fn recipe_for_entity_kind(&self, kind: EntityKind) -> Option<&Recipe> {
        self.rows.iter().find(|r| r.entity_kind == Some(kind))
    }

    /// Request kind that produces entities of `kind`.
    ///
    /// Panics if no row produces `kind`: an entity that no request could
    /// have generated means the table or the entity graph is corrupt.
    pub fn request_kind_for_entity_kind(&self, kind: EntityKind) -> RequestKind {
        match self.recipe_for_entity_kind(kind) {
            Some(recipe) => recipe.request_kind,
            None => panic!("no request kind produces entity kind {kind:?}"),
        }
    }

    pub fn display_label(&self, kind: RequestKind) -> &str {
        self.recipe_for_request_kind(kind)
            .map(|r| r.label.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }
}

impl Default for SchemaTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Recipe>> for SchemaTable {
    type Error = SchemaError;

    fn try_from(rows: Vec<Recipe>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<SchemaTable> for Vec<Recipe> {
    fn from(table: SchemaTable) -> Self {
        table.rows
    }
}
