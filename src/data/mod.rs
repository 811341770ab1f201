//! Data module - CSV loading, column roles and the preparation pipeline
//!
//! ```text
//!   CSV ──► loader ──► Dataset ──► preparer ──► PreparedData
//!                        ▲            ▲
//!                        │            └── ColumnRoles + LapSelector
//!                        └── column kinds detected once at load
//! ```

mod loader;
mod model;
mod preparer;

pub use loader::{DataLoader, LoaderError};
pub use model::{ColumnKind, ColumnRoles, DataPreview, Dataset, LapSelector, LapValue, Role};
pub use preparer::{
    DataPreparer, GeoCenter, PrepareError, PreparedData, PreparedPoint, COORDINATE_SCALE,
};
