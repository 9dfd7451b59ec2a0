#![no_main]

// Harness: resolve_path
// Strategy: register a fixed table, feed arbitrary navigation paths, and check
// that resolution never panics and any match is a whole-component prefix.

use libfuzzer_sys::fuzz_target;
use authgate_core::error::LoadFailure;
use authgate_core::routing::{path_components, FeatureModule, Resolution, RouteTable};

fuzz_target!(|path: &str| {
    let mut table = RouteTable::new();
    for seg in ["book", "admin", "admin/metrics", "a/b/c"] {
        let _ = table.register(seg, || futures::future::ready(Ok::<_, LoadFailure>(FeatureModule::new("fuzz"))));
    }

    if let Resolution::Matched(m) = table.resolve(path) {
        let components = path_components(path);
        let depth = m.entry.segment.depth();
        assert!(depth <= components.len());
        assert!(m.entry.segment.components().eq(components[..depth].iter().copied()));
        assert_eq!(m.remainder, components[depth..].join("/"));
    }
});
