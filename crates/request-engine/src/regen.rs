use tracing::{debug, instrument};

use sketch_types::{Entity, IdList, Param, Request};

use crate::expand::{ExpandError, Expander};
use crate::schema::SchemaTable;

/// Entities and parameters produced by a regeneration pass.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub entities: IdList<Entity>,
    pub params: IdList<Param>,
}

/// Expand every request, in handle order, into fresh collections.
pub fn regenerate(table: &SchemaTable, requests: &IdList<Request>) -> Result<Generated, ExpandError> {
    let mut generated = Generated::default();
    regenerate_into(table, requests, &mut generated)?;
    Ok(generated)
}

/// Clear `generated` and rebuild it from `requests`. The first failing
/// request aborts the pass; objects from earlier requests stay in place.
#[instrument(skip_all, fields(requests = requests.len()))]
pub fn regenerate_into(
    table: &SchemaTable,
    requests: &IdList<Request>,
    generated: &mut Generated,
) -> Result<(), ExpandError> {
    generated.entities.clear();
    generated.params.clear();

    let expander = Expander::new(table);
    for request in requests.iter() {
        expander.expand(request, &mut generated.entities, &mut generated.params)?;
    }

    debug!(
        entities = generated.entities.len(),
        params = generated.params.len(),
        "regenerated requests"
    );
    Ok(())
}
