#![no_main]

// Harness: segment_parse
// Strategy: any string that parses as a segment must survive a serde round
// trip and split into non-empty components.

use libfuzzer_sys::fuzz_target;
use authgate_core::routing::Segment;

fuzz_target!(|text: &str| {
    if let Ok(seg) = Segment::parse(text) {
        assert!(seg.components().all(|c| !c.is_empty()));
        let json = serde_json::to_string(&seg).expect("segment serializes");
        let back: Segment = serde_json::from_str(&json).expect("valid segment deserializes");
        assert_eq!(seg, back);
    }
});
