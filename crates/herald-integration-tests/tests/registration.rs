//! Event registration and listener management through the public API.

use herald_events::prelude::*;
use herald_test::{Recorder, noop_listener, test_event};
use serde_json::json;

#[test]
fn duplicate_registration_without_shared_fails() {
    let emitter = Emitter::with_events(["a"]).unwrap();

    let err = emitter.register_event("a").unwrap_err();
    assert!(matches!(err, EventError::DuplicateEvent { ref name } if name == "a"));
}

#[test]
fn shared_registration_keeps_first_definition() {
    let emitter = Emitter::new();
    emitter
        .register_event(EventDefinition::new("a").with_spread(true).with_shared(true))
        .unwrap();
    emitter
        .register_event(EventDefinition::new("a").with_clone(true))
        .unwrap();

    let definition = emitter.definition("a").unwrap();
    assert!(definition.spread);
    assert!(!definition.clone);
}

#[test]
fn shared_on_second_registration_is_enough() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    emitter
        .register_event(EventDefinition::new("a").with_tags(true).with_shared(true))
        .unwrap();

    assert!(!emitter.definition("a").unwrap().tags);
}

#[test]
fn register_list_stops_at_first_failure() {
    let emitter = Emitter::new();
    let err = emitter
        .register_events([test_event("a"), test_event("b"), test_event("a")])
        .unwrap_err();

    assert!(matches!(err, EventError::DuplicateEvent { .. }));
    assert_eq!(emitter.event_names(), vec!["a", "b"]);
}

#[test]
fn invalid_definition_is_rejected() {
    let emitter = Emitter::new();
    let err = emitter
        .register_event(EventDefinition::new("a").with_channels(Vec::<String>::new()))
        .unwrap_err();
    assert!(matches!(err, EventError::InvalidEventOptions { ref field, .. } if field == "channels"));

    let err = EventDefinition::from_json(json!({ "name": "a", "speed": 1 })).unwrap_err();
    assert!(matches!(err, EventError::InvalidEventOptions { .. }));
}

#[test]
fn prevalidated_definitions_register_without_validation() {
    let definitions = Emitter::validate([test_event("a"), test_event("b")]).unwrap();

    let emitter = Emitter::new();
    emitter
        .register_events_with(definitions, RegisterOptions { validate: false })
        .unwrap();
    assert_eq!(emitter.event_names(), vec!["a", "b"]);
}

#[test]
fn unregistered_event_operations_fail() {
    let emitter = Emitter::new();
    let listener = noop_listener();

    assert!(matches!(
        emitter.has_listeners("ghost"),
        Err(EventError::UnknownEvent { .. })
    ));
    assert!(matches!(
        emitter.remove_all_listeners("ghost"),
        Err(EventError::UnknownEvent { .. })
    ));
    assert!(matches!(
        emitter.remove_listener("ghost", &listener),
        Err(EventError::UnknownEvent { .. })
    ));
    assert!(matches!(
        emitter.on("ghost", listener),
        Err(EventError::UnknownEvent { .. })
    ));
}

#[test]
fn remove_listener_removes_every_subscription_of_it() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();
    let repeated = recorder.listener("repeated");
    let other = recorder.listener("other");

    emitter
        .on("a", repeated.clone())
        .unwrap()
        .on("a", other)
        .unwrap()
        .on("a", repeated.clone())
        .unwrap();
    assert_eq!(emitter.listener_count("a").unwrap(), 3);

    emitter.remove_listener("a", &repeated).unwrap();
    assert_eq!(emitter.listener_count("a").unwrap(), 1);

    // Removing again is not an error.
    emitter.off("a", &repeated).unwrap();

    emitter.emit("a", json!(null)).unwrap();
    assert_eq!(recorder.labels(), vec!["other"]);
}

#[test]
fn remove_all_listeners_empties_the_event() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    emitter.on("a", noop_listener()).unwrap();
    emitter.on("a", noop_listener()).unwrap();
    assert!(emitter.has_listeners("a").unwrap());

    emitter.remove_all_listeners("a").unwrap();
    assert!(!emitter.has_listeners("a").unwrap());

    emitter.remove_all_listeners("a").unwrap();
}

#[test]
fn subscription_channels_must_be_allowed() {
    let emitter = Emitter::with_events([herald_test::channel_event("deploy", &["start", "end"])])
        .unwrap();

    let err = emitter
        .on(
            ListenerOptions::new("deploy").with_channels(["start", "pause", "resume"]),
            noop_listener(),
        )
        .unwrap_err();

    match err {
        EventError::UnknownEventChannels { event, channels } => {
            assert_eq!(event, "deploy");
            assert_eq!(channels, vec!["pause", "resume"]);
        },
        other => panic!("expected UnknownEventChannels, got {other:?}"),
    }
    assert!(!emitter.has_listeners("deploy").unwrap());
}

#[test]
fn listener_options_from_json() {
    let emitter = Emitter::with_events([herald_test::tagged_event("t")]).unwrap();

    let options = ListenerOptions::from_json(json!({
        "name": "t",
        "count": 2,
        "filter": ["a", "b"],
    }))
    .unwrap();
    emitter.on(options, noop_listener()).unwrap();
    assert_eq!(emitter.listener_count("t").unwrap(), 1);

    let zero = ListenerOptions::from_json(json!({ "name": "t", "count": 0 })).unwrap();
    let err = emitter.on(zero, noop_listener()).unwrap_err();
    assert!(matches!(err, EventError::InvalidListenerOptions { ref field, .. } if field == "count"));

    let err = ListenerOptions::from_json(json!({ "name": "t", "count": -1 })).unwrap_err();
    assert!(matches!(err, EventError::InvalidListenerOptions { .. }));

    let err = ListenerOptions::from_json(json!({ "name": "t", "priority": 1 })).unwrap_err();
    assert!(matches!(err, EventError::InvalidListenerOptions { .. }));

    let err = ListenerOptions::from_json(json!({
        "name": "t",
        "filter": { "tags": ["a"], "x": 1 },
    }))
    .unwrap_err();
    assert!(
        matches!(err, EventError::InvalidListenerOptions { ref field, .. } if field == "filter.x")
    );
}

#[test]
fn emitter_clones_share_registrations() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();

    let clone = emitter.clone();
    clone.on("a", recorder.listener("via-clone")).unwrap();
    emitter.emit("a", json!(1)).unwrap();

    assert_eq!(recorder.labels(), vec!["via-clone"]);
}
