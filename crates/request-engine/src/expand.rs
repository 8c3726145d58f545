use tracing::{debug, error, instrument};

use sketch_types::{
    offset, Entity, EntityHandle, EntityKind, ParamHandle, Param, Request, RequestHandle,
    RequestKind, Sink, MAX_POINTS_IN_ENTITY,
};

use crate::schema::SchemaTable;

/// Reasons an expansion is refused. Nothing is written to either sink when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("request {request}: no recipe for request kind {kind:?}")]
    UnknownRequestKind {
        request: RequestHandle,
        kind: RequestKind,
    },

    #[error("request {request}: positioning a normal requires a point")]
    NormalWithoutPoint { request: RequestHandle },

    #[error("request {request}: {count} points exceed the limit of {limit}")]
    TooManyPoints {
        request: RequestHandle,
        count: usize,
        limit: usize,
    },

    #[error("request {request}: parameters of {count} points run into the normal's range")]
    PointParamsOverlapNormal { request: RequestHandle, count: usize },

    #[error("entity {handle} already exists")]
    DuplicateEntity { handle: EntityHandle },

    #[error("param {handle} already exists")]
    DuplicateParam { handle: ParamHandle },
}

/// Everything one request generates, in insertion order: points, then the
/// normal, then the distance, with the primary entity last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub entities: Vec<Entity>,
    pub params: Vec<Param>,
}

impl Expansion {
    pub fn primary(&self) -> Option<&Entity> {
        self.entities
            .last()
            .filter(|e| !e.kind.is_point() && !e.kind.is_normal() && !e.kind.is_distance())
    }

    pub fn points(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind.is_point())
    }

    pub fn normal(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind.is_normal())
    }

    pub fn distance(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind.is_distance())
    }
}

/// Expands requests according to a schema table.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    table: &'a SchemaTable,
}

impl Default for Expander<'static> {
    fn default() -> Self {
        Self::new(SchemaTable::shared())
    }
}

impl<'a> Expander<'a> {
    pub fn new(table: &'a SchemaTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a SchemaTable {
        self.table
    }

    /// Generate `request` into the two sinks.
    ///
    /// The whole expansion is computed and checked against both sinks before
    /// anything is inserted, so a failure leaves them untouched. Expanding a
    /// request whose output is already present fails with a duplicate error;
    /// callers regenerating a model clear their lists first.
    #[instrument(skip_all, fields(request = %request.h, kind = ?request.kind))]
    pub fn expand<E, P>(
        &self,
        request: &Request,
        entities: &mut E,
        params: &mut P,
    ) -> Result<(), ExpandError>
    where
        E: Sink<Entity>,
        P: Sink<Param>,
    {
        let expansion = self.plan(request)?;

        if let Some(e) = expansion.entities.iter().find(|e| entities.contains(e.h)) {
            debug!(entity = %e.h, "request output already present");
            return Err(ExpandError::DuplicateEntity { handle: e.h });
        }
        if let Some(p) = expansion.params.iter().find(|p| params.contains(p.h)) {
            debug!(param = %p.h, "request output already present");
            return Err(ExpandError::DuplicateParam { handle: p.h });
        }

        debug!(
            entities = expansion.entities.len(),
            params = expansion.params.len(),
            "committing expansion"
        );

        for p in expansion.params {
            params.add(p);
        }
        for e in expansion.entities {
            entities.add(e);
        }
        Ok(())
    }

    /// Compute what `request` expands into without touching any collection.
    #[instrument(skip(self, request), fields(request = %request.h, kind = ?request.kind))]
    pub fn plan(&self, request: &Request) -> Result<Expansion, ExpandError> {
        let h = request.h;
        let recipe = self
            .table
            .recipe_for_request_kind(request.kind)
            .ok_or(ExpandError::UnknownRequestKind {
                request: h,
                kind: request.kind,
            })?;

        let point_count = recipe.point_count(request.extra_points);
        if point_count > MAX_POINTS_IN_ENTITY {
            error!(point_count, "request generates too many points");
            return Err(ExpandError::TooManyPoints {
                request: h,
                count: point_count,
                limit: MAX_POINTS_IN_ENTITY,
            });
        }
        if recipe.has_normal {
            if point_count == 0 {
                error!("recipe needs a normal but produced no point to anchor it");
                return Err(ExpandError::NormalWithoutPoint { request: h });
            }
            let point_params_end =
                offset::POINT_PARAMS + offset::POINT_PARAM_STRIDE * point_count as u32;
            if point_params_end > offset::NORMAL {
                error!(point_count, "point parameters collide with normal parameters");
                return Err(ExpandError::PointParamsOverlapNormal {
                    request: h,
                    count: point_count,
                });
            }
        }

        let free = request.is_free_in_3d();
        let mut out = Expansion::default();

        let mut primary = recipe.entity_kind.map(|kind| {
            let mut e = Entity::new(h.primary_entity(), kind);
            e.extra_points = request.extra_points;
            e.group = request.group;
            e.style = request.style;
            e.workplane = request.workplane;
            e.construction = request.construction;
            if request.kind.has_text() {
                e.text = request.text.clone();
                e.font = request.font.clone();
            }
            e
        });
        let has_primary = primary.is_some();

        let point_kind = if free {
            EntityKind::PointIn3d
        } else {
            EntityKind::PointIn2d
        };
        for i in 0..point_count {
            let mut p = sub_entity(request, h.point_entity(i, has_primary), point_kind);
            for coord in 0..point_kind.param_count() {
                let ph = h.point_param(i, coord);
                p.params.push(ph);
                out.params.push(Param { h: ph });
            }
            if let Some(e) = primary.as_mut() {
                e.points.push(p.h);
            }
            out.entities.push(p);
        }

        if recipe.has_normal {
            let normal_kind = if free {
                EntityKind::NormalIn3d
            } else {
                EntityKind::NormalIn2d
            };
            let mut n = sub_entity(request, h.normal_entity(), normal_kind);
            // On a workplane the orientation is read from the workplane itself.
            for component in 0..normal_kind.param_count() {
                let ph = h.normal_param(component);
                n.params.push(ph);
                out.params.push(Param { h: ph });
            }
            // Where the normal is drawn; purely cosmetic.
            n.points.push(h.point_entity(0, has_primary));
            if let Some(e) = primary.as_mut() {
                e.normal = Some(n.h);
            }
            out.entities.push(n);
        }

        if recipe.has_distance {
            let mut d = sub_entity(request, h.distance_entity(), EntityKind::Distance);
            let ph = h.distance_param();
            d.params.push(ph);
            out.params.push(Param { h: ph });
            if let Some(e) = primary.as_mut() {
                e.distance = Some(d.h);
            }
            out.entities.push(d);
        }

        if let Some(e) = primary {
            out.entities.push(e);
        }

        debug!(
            entities = out.entities.len(),
            params = out.params.len(),
            "expanded request"
        );
        Ok(out)
    }
}

/// A point, normal or distance entity owned by `request`.
fn sub_entity(request: &Request, h: EntityHandle, kind: EntityKind) -> Entity {
    let mut e = Entity::new(h, kind);
    e.group = request.group;
    e.style = request.style;
    e.workplane = request.workplane;
    e
}
