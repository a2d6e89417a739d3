pub mod collection;
pub mod model;

pub use collection::Collection;
pub use model::{Model, ModelKind};
