pub mod describe;
pub mod expand;
pub mod regen;
pub mod schema;

pub use describe::{description_string, index_of_point};
pub use expand::{ExpandError, Expander, Expansion};
pub use regen::{regenerate, regenerate_into, Generated};
pub use schema::{Recipe, SchemaError, SchemaTable, UNKNOWN_LABEL};
pub use sketch_types::*;
