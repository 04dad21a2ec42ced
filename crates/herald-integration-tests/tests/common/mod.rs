//! Shared helpers for integration tests.

use herald_events::EventResult;
use serde_json::{Value, json};

/// Build the event set most dispatch tests share.
#[allow(dead_code)]
pub fn job_emitter() -> EventResult<herald_events::Emitter> {
    herald_events::Emitter::with_events([
        herald_test::spread_event("job").with_tags(true),
        herald_test::channel_event("deploy", &["start", "end"]),
        herald_test::test_event("plain"),
    ])
}

/// The tag map `{tag: true, ...}` for `tags`.
#[allow(dead_code)]
pub fn tag_map(tags: &[&str]) -> Value {
    let mut map = serde_json::Map::new();
    for tag in tags {
        map.insert((*tag).to_owned(), json!(true));
    }
    Value::Object(map)
}
