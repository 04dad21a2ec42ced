//! Synchronous dispatch: matching, delivery flags and the `emit` error policy.

mod common;

use std::sync::Arc;

use herald_events::prelude::*;
use herald_test::{
    Recorder, channel_event, counting_payload, failing_listener, panicking_listener, spread_event,
    tagged_event, test_event,
};
use serde_json::{Value, json};

use common::{job_emitter, tag_map};

#[test]
fn spread_and_tags_deliver_positional_arguments() {
    let emitter = Emitter::new();
    emitter
        .register_event(EventDefinition::new("test").with_spread(true).with_tags(true))
        .unwrap();

    let recorder = Recorder::new();
    emitter.on("test", recorder.listener("handler")).unwrap();

    emitter
        .emit(EmitCriteria::new("test").with_tags(["x", "y"]), json!([1, 2, 3]))
        .unwrap();

    assert_eq!(
        recorder.args(0).unwrap(),
        vec![json!(1), json!(2), json!(3), json!({ "x": true, "y": true })]
    );
}

#[test]
fn first_error_surfaces_after_every_handler_ran() {
    let emitter = Emitter::with_events(["a", "b"]).unwrap();
    let recorder = Recorder::new();
    let handler1 = recorder.listener("h1");
    let handler2 = recorder.failing("h2", "handler2 failed");

    for listener in [&handler1, &handler2, &handler1, &handler2, &handler1] {
        emitter.on("a", listener.clone()).unwrap();
    }

    let err = emitter.emit("a", json!(null)).unwrap_err();

    assert_eq!(recorder.labels(), vec!["h1", "h2", "h1", "h2", "h1"]);
    match err {
        EventError::ListenerInvocation { event, source } => {
            assert_eq!(event, "a");
            assert_eq!(source.to_string(), "handler2 failed");
        },
        other => panic!("expected ListenerInvocation, got {other:?}"),
    }
}

#[test]
fn only_the_first_failure_is_returned() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    emitter.on("a", failing_listener("first")).unwrap();
    emitter.on("a", failing_listener("second")).unwrap();

    let err = emitter.emit("a", json!(null)).unwrap_err();
    assert_eq!(err.listener_error().unwrap().to_string(), "first");
}

#[test]
fn panicking_listener_does_not_stop_the_pass() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();
    emitter.on("a", panicking_listener("kaboom")).unwrap();
    emitter.on("a", recorder.listener("after")).unwrap();

    let err = emitter.emit("a", json!(null)).unwrap_err();

    assert!(err.to_string().contains("kaboom"));
    assert_eq!(recorder.labels(), vec!["after"]);
}

#[test]
fn count_exhaustion_removes_the_handler() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();
    emitter
        .on(ListenerOptions::new("a").with_count(2), recorder.listener("limited"))
        .unwrap();
    emitter.on("a", recorder.listener("forever")).unwrap();

    for n in 0..4 {
        emitter.emit("a", json!(n)).unwrap();
    }

    let limited = recorder
        .calls()
        .into_iter()
        .filter(|call| call.label == "limited")
        .count();
    assert_eq!(limited, 2);
    assert_eq!(recorder.count(), 6);
    assert_eq!(emitter.listener_count("a").unwrap(), 1);
}

#[test]
fn count_is_not_consumed_by_skipped_updates() {
    let emitter = Emitter::with_events([channel_event("deploy", &["start", "end"])]).unwrap();
    let recorder = Recorder::new();
    emitter
        .on(
            ListenerOptions::new("deploy").with_channels(["end"]).with_count(1),
            recorder.listener("end"),
        )
        .unwrap();

    emitter
        .emit(EmitCriteria::new("deploy").with_channel("start"), json!(1))
        .unwrap();
    assert!(emitter.has_listeners("deploy").unwrap());

    emitter
        .emit(EmitCriteria::new("deploy").with_channel("end"), json!(2))
        .unwrap();
    assert!(!emitter.has_listeners("deploy").unwrap());
    assert_eq!(recorder.args(0).unwrap(), vec![json!(2)]);
}

#[test]
fn once_runs_a_single_time() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();
    emitter
        .once(ListenerOptions::new("a").with_count(5), recorder.listener("once"))
        .unwrap();

    emitter.emit("a", json!(1)).unwrap();
    emitter.emit("a", json!(2)).unwrap();

    assert_eq!(recorder.count(), 1);
    assert!(!emitter.has_listeners("a").unwrap());
}

#[test]
fn remove_all_listeners_mid_pass_keeps_the_snapshot() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();

    let inner = emitter.clone();
    let clearing = recorder.clone();
    emitter
        .on(
            "a",
            Listener::new(move |invocation: &Invocation| -> anyhow::Result<()> {
                clearing.record("clearer", invocation);
                inner.remove_all_listeners("a")?;
                Ok(())
            }),
        )
        .unwrap();
    emitter.on("a", recorder.listener("second")).unwrap();
    emitter.on("a", recorder.listener("third")).unwrap();

    emitter.emit("a", json!(null)).unwrap();
    assert_eq!(recorder.labels(), vec!["clearer", "second", "third"]);

    recorder.clear();
    emitter.emit("a", json!(null)).unwrap();
    assert_eq!(recorder.count(), 0);
}

#[test]
fn subscribing_mid_pass_applies_to_later_passes() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();

    let inner = emitter.clone();
    let late = recorder.listener("late");
    emitter
        .once(
            "a",
            Listener::new(move |_: &Invocation| -> anyhow::Result<()> {
                inner.on("a", late.clone())?;
                Ok(())
            }),
        )
        .unwrap();

    emitter.emit("a", json!(1)).unwrap();
    assert_eq!(recorder.count(), 0);

    emitter.emit("a", json!(2)).unwrap();
    assert_eq!(recorder.labels(), vec!["late"]);
}

#[test]
fn listeners_may_publish_re_entrantly() {
    let emitter = Emitter::with_events(["outer", "inner"]).unwrap();
    let recorder = Recorder::new();

    let forwarder = emitter.clone();
    emitter
        .on(
            "outer",
            Listener::new(move |invocation: &Invocation| -> anyhow::Result<()> {
                let value = invocation.arg(0).cloned().unwrap_or(Value::Null);
                forwarder.emit("inner", json!({ "forwarded": value }))?;
                Ok(())
            }),
        )
        .unwrap();
    emitter.on("inner", recorder.listener("inner")).unwrap();

    emitter.emit("outer", json!(7)).unwrap();

    assert_eq!(recorder.args(0).unwrap(), vec![json!({ "forwarded": 7 })]);
}

#[test]
fn clone_override_receives_the_shared_value() {
    let emitter = Emitter::new();
    emitter
        .register_event(EventDefinition::new("c").with_clone(true))
        .unwrap();

    let recorder = Recorder::new();
    emitter
        .on(ListenerOptions::new("c").with_clone(false), recorder.listener("original-1"))
        .unwrap();
    emitter.on("c", recorder.listener("cloned")).unwrap();
    emitter
        .on(ListenerOptions::new("c").with_clone(false), recorder.listener("original-2"))
        .unwrap();

    emitter.emit("c", json!({ "nested": [1, 2] })).unwrap();

    let calls = recorder.calls();
    let original_1 = calls[0].args.shared(0).unwrap();
    let cloned = calls[1].args.shared(0).unwrap();
    let original_2 = calls[2].args.shared(0).unwrap();

    assert!(Arc::ptr_eq(original_1, original_2));
    assert!(!Arc::ptr_eq(original_1, cloned));
    assert_eq!(original_1, cloned);
}

#[test]
fn lazy_payload_is_generated_once() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let recorder = Recorder::new();
    emitter.on("a", recorder.listener("one")).unwrap();
    emitter.on("a", recorder.listener("two")).unwrap();

    let (payload, generated) = counting_payload(json!({ "expensive": true }));
    emitter.emit("a", payload).unwrap();

    assert_eq!(generated.calls(), 1);
    let calls = recorder.calls();
    assert!(Arc::ptr_eq(
        calls[0].args.shared(0).unwrap(),
        calls[1].args.shared(0).unwrap()
    ));
    assert_eq!(calls[0].values(), vec![json!({ "expensive": true })]);
}

#[test]
fn lazy_payload_is_skipped_without_a_match() {
    let emitter = Emitter::with_events([channel_event("deploy", &["start", "end"])]).unwrap();
    emitter
        .on(
            ListenerOptions::new("deploy").with_channels(["end"]),
            herald_test::noop_listener(),
        )
        .unwrap();

    let (payload, generated) = counting_payload(json!(1));
    emitter
        .emit(EmitCriteria::new("deploy").with_channel("start"), payload)
        .unwrap();

    assert_eq!(generated.calls(), 0);
}

#[test]
fn lazy_payload_can_be_spread() {
    let emitter = Emitter::with_events([spread_event("s")]).unwrap();
    let recorder = Recorder::new();
    emitter.on("s", recorder.listener("spread")).unwrap();

    emitter
        .emit("s", Payload::lazy(|| json!(["a", "b"])))
        .unwrap();

    assert_eq!(recorder.args(0).unwrap(), vec![json!("a"), json!("b")]);
}

#[test]
fn tag_filter_all_and_any() {
    let emitter = Emitter::with_events([test_event("t")]).unwrap();
    let recorder = Recorder::new();
    emitter
        .on(
            ListenerOptions::new("t").with_filter(TagFilter::all(["a", "b"])),
            recorder.listener("all"),
        )
        .unwrap();
    emitter
        .on(
            ListenerOptions::new("t").with_filter(TagFilter::any(["a", "b"])),
            recorder.listener("any"),
        )
        .unwrap();

    let cases: [(Option<Vec<&str>>, Vec<&str>); 5] = [
        (None, vec![]),
        (Some(vec!["c"]), vec![]),
        (Some(vec!["a"]), vec!["any"]),
        (Some(vec!["b", "c"]), vec!["any"]),
        (Some(vec!["a", "b", "c"]), vec!["all", "any"]),
    ];

    for (tags, expected) in cases {
        recorder.clear();
        let criteria = match tags {
            Some(tags) => EmitCriteria::new("t").with_tags(tags),
            None => EmitCriteria::new("t"),
        };
        emitter.emit(criteria, json!(null)).unwrap();
        assert_eq!(recorder.labels(), expected);
    }
}

#[test]
fn filters_match_tag_names_regardless_of_flag() {
    let emitter = Emitter::with_events([tagged_event("t")]).unwrap();
    let recorder = Recorder::new();
    emitter
        .on(ListenerOptions::new("t").with_filter("urgent"), recorder.listener("urgent"))
        .unwrap();
    emitter
        .on(ListenerOptions::new("t").with_filter("nightly"), recorder.listener("nightly"))
        .unwrap();

    let tags: std::collections::BTreeMap<String, bool> =
        [("urgent".to_owned(), false)].into_iter().collect();
    emitter
        .emit(EmitCriteria::new("t").with_tags(tags), json!(1))
        .unwrap();

    assert_eq!(recorder.labels(), vec!["urgent"]);
    assert_eq!(recorder.args(0).unwrap(), vec![json!(1), json!({ "urgent": false })]);
}

#[test]
fn channel_restrictions() {
    let emitter = job_emitter().unwrap();
    let recorder = Recorder::new();
    emitter
        .on(ListenerOptions::new("deploy").with_channels(["start"]), recorder.listener("start"))
        .unwrap();
    emitter.on("deploy", recorder.listener("any")).unwrap();

    emitter.emit("deploy", json!(0)).unwrap();
    emitter
        .emit(EmitCriteria::new("deploy").with_channel("start"), json!(1))
        .unwrap();
    emitter
        .emit(EmitCriteria::new("deploy").with_channel("end"), json!(2))
        .unwrap();

    assert_eq!(recorder.labels(), vec!["any", "start", "any", "any"]);

    let err = emitter
        .emit(EmitCriteria::new("deploy").with_channel("rollback"), json!(3))
        .unwrap_err();
    assert!(matches!(err, EventError::UnknownChannel { ref channel, .. } if channel == "rollback"));
}

#[test]
fn per_listener_spread_and_tags_overrides() {
    let emitter = job_emitter().unwrap();
    let recorder = Recorder::new();
    emitter.on("job", recorder.listener("default")).unwrap();
    emitter
        .on(
            ListenerOptions::new("job").with_spread(false).with_tags(false),
            recorder.listener("whole"),
        )
        .unwrap();

    emitter
        .emit(EmitCriteria::new("job").with_tags("nightly"), json!([1, 2]))
        .unwrap();

    assert_eq!(
        recorder.args(0).unwrap(),
        vec![json!(1), json!(2), tag_map(&["nightly"])]
    );
    assert_eq!(recorder.args(1).unwrap(), vec![json!([1, 2])]);
}

#[test]
fn spread_event_rejects_non_array_data() {
    let emitter = job_emitter().unwrap();
    emitter.on("job", herald_test::noop_listener()).unwrap();

    let err = emitter.emit("job", json!({ "not": "an array" })).unwrap_err();
    assert!(matches!(err, EventError::SpreadDataMustBeArray { ref event } if event == "job"));
}

#[test]
fn publishing_without_listeners_is_a_no_op() {
    let emitter = job_emitter().unwrap();

    // Channel and spread checks only apply once someone is listening.
    emitter
        .emit(EmitCriteria::new("deploy").with_channel("rollback"), json!("x"))
        .unwrap();
    emitter.emit("job", json!("not spreadable")).unwrap();
}

#[test]
fn lookup_errors() {
    let emitter = job_emitter().unwrap();

    assert!(matches!(
        emitter.emit("", json!(null)),
        Err(EventError::MissingEventName)
    ));
    assert!(matches!(
        emitter.emit("ghost", json!(null)),
        Err(EventError::UnknownEvent { ref name }) if name == "ghost"
    ));
}

#[test]
fn context_is_bound_to_the_subscription() {
    #[derive(Debug)]
    struct Owner(&'static str);

    let emitter = Emitter::with_events(["a"]).unwrap();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    for name in ["first", "second"] {
        let seen = Arc::clone(&seen);
        emitter
            .on(
                ListenerOptions::new("a").with_context(Owner(name)),
                Listener::new(move |invocation: &Invocation| {
                    let owner = invocation.context::<Owner>().map(|owner| owner.0);
                    seen.lock().unwrap().push(owner);
                }),
            )
            .unwrap();
    }

    emitter.emit("a", json!(null)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Some("first"), Some("second")]);
}

#[tokio::test]
async fn emit_spawns_async_listeners_on_the_runtime() {
    let emitter = Emitter::with_events(["a"]).unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    emitter
        .on(
            "a",
            Listener::from_async(move |invocation: Invocation| {
                let tx = tx.clone();
                async move {
                    tokio::task::yield_now().await;
                    let _ = tx.send(invocation.args().to_values());
                    Ok::<_, anyhow::Error>(Value::Null)
                }
            }),
        )
        .unwrap();

    emitter.emit("a", json!("hello")).unwrap();

    let received = rx.recv().await.unwrap();
    assert_eq!(received, vec![json!("hello")]);
}
