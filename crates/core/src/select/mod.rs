pub mod expansion;
pub mod marker_path;
pub mod matcher;
pub mod migration;
pub mod resolver;
pub mod selection;

pub use expansion::ExpandedMarkerIdTree;
pub use marker_path::MarkerPath;
pub use matcher::RawPathMatch;
pub use migration::{MigrationResult, MigrationState, SelectionController};
pub use resolver::ResolvedPath;
pub use selection::{Selection, SelectionError};
