//! Route composition: segments, the route table, lazy module loading and
//! navigation.

pub mod composer;
pub mod loader;
pub mod manifest;
pub mod router;
pub mod segment;
pub mod table;

pub use composer::{LoadResult, RouteComposer};
pub use loader::{FeatureModule, LoaderId, LoaderRef, ModuleLoader, RouteMetadata, ViewMatch, ViewRoute};
pub use manifest::{LoaderRegistry, ManifestRoute, RouteManifest};
pub use router::{Activation, Navigation, Router};
pub use segment::{path_components, Segment};
pub use table::{Resolution, RouteEntry, RouteMatch, RouteTable};
