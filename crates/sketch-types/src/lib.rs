pub mod entity;
pub mod handle;
pub mod id_list;
pub mod request;

pub use entity::*;
pub use handle::*;
pub use id_list::*;
pub use request::*;
