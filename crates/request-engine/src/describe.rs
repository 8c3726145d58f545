use sketch_types::{EntityHandle, ReferencePlane, Request, RequestKind, MAX_POINTS_IN_ENTITY};

use crate::schema::SchemaTable;

/// Compact identity tag such as `r01a-line-segment` or `r001-#XY`.
pub fn description_string(table: &SchemaTable, request: &Request) -> String {
    let label = match ReferencePlane::from_handle(request.h) {
        Some(plane) => plane.tag(),
        None => table.display_label(request.kind),
    };
    format!("{}-{}", request.h, label)
}

/// Which point of `request` the entity `he` is, if any.
pub fn index_of_point(request: &Request, he: EntityHandle) -> Option<usize> {
    if request.kind == RequestKind::DatumPoint {
        return (he == request.h.point_entity(0, false)).then_some(0);
    }
    (0..MAX_POINTS_IN_ENTITY).find(|&i| he == request.h.point_entity(i, true))
}
