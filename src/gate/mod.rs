pub mod core;
pub mod region;


// Re-export the primary types so `crate::gate::*` paths stay short.
pub use self::core::{AuthorityGate, GateHandle};
pub use region::{ContentTemplate, EmptyTemplate, MountedView, ViewInstance, ViewRegion, ViewScope};
