//! Dependency graph assembly and diagnostic dumps

mod assembly;
mod dump;

pub use assembly::{
    assemble, DependencyGraphDescription, GraphBuilder, RestoreUnitEntry, UnitStatus,
    GRAPH_FORMAT_VERSION,
};
pub use dump::{GraphDumper, DG_FILE_EXTENSION};
