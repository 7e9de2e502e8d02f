//! Definition and instance management on top of the process engine.

mod definitions;
mod instances;
pub mod store;

pub use definitions::DefinitionService;
pub use instances::InstanceService;
pub use store::{DefinitionStore, InstanceStore};
