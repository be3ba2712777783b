//! City model: sectors, the measure catalog, and the mutable city state.

pub mod measure;
pub mod sector;
pub mod state;

pub use measure::{Measure, MeasureCatalog};
pub use sector::{Sector, SectorMap};
pub use state::{ADOPTION_STEP, City, CityConfig};
