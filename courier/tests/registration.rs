use courier::{
    Categories, Category, Courier, EngineEventSnapshot, ErrorCode, GlobalCallbacks, GlobalEvent,
    GlobalHandler, ListenerHandle, LogLevel, LogRecord, LoggerCallbacks, NodeSnapshot,
    RequestCallbacks, RequestHandler, RequestSnapshot, TransferCallbacks, TransferHandler,
    TreeCallbacks, TreeProcessor, UserSnapshot,
    testing::{EngineList, EnginePayload},
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex},
};

mod common;
use common::{CountingHandler, Recorder, Seen, download, error, init_tracing, request};

// ============================================================================
// Register / unregister
// ============================================================================

#[test]
fn test_register_and_unregister_are_idempotent() {
    let courier = Courier::new();
    let handle = courier.add_request_listener(CountingHandler::new());

    assert!(courier.is_registered(&handle));
    assert!(!courier.register(&handle));
    assert_eq!(courier.listener_count(Categories::REQUEST), 1);

    assert!(courier.unregister(&handle));
    assert!(!courier.unregister(&handle));
    assert!(!courier.is_registered(&handle));

    assert!(courier.register(&handle));
    assert_eq!(courier.listener_count(Categories::REQUEST), 1);
}

#[test]
fn test_unregistered_listener_receives_nothing_from_the_bridge() {
    let courier = Courier::new();
    let counter = CountingHandler::new();
    let handle = courier.add_request_listener(counter.clone());
    let bridge = courier.engine_bridge();
    let req = EnginePayload::new(request(1));

    bridge.on_request_start(&req);
    courier.unregister(&handle);
    bridge.on_request_start(&req);

    assert_eq!(counter.calls(), 1);
}

/// Unregisters itself the first time it runs.
struct OneShot {
    handle: Mutex<Option<ListenerHandle>>,
    calls: Mutex<usize>,
}

impl RequestHandler for OneShot {
    fn on_request_start(&self, api: &Courier, _request: Option<&RequestSnapshot>) {
        *self.calls.lock().unwrap() += 1;
        if let Some(handle) = self.handle.lock().unwrap().take() {
            assert!(api.unregister(&handle));
        }
    }
}

#[test]
fn test_handler_may_unregister_itself_during_a_broadcast() {
    init_tracing();
    let courier = Courier::new();
    let first = Arc::new(OneShot {
        handle: Mutex::new(None),
        calls: Mutex::new(0),
    });
    let handle = courier.add_request_listener(first.clone());
    *first.handle.lock().unwrap() = Some(handle.clone());
    let second = CountingHandler::new();
    courier.add_request_listener(second.clone());

    let bridge = courier.engine_bridge();
    let req = EnginePayload::new(request(1));
    bridge.on_request_start(&req);

    // The rest of the broadcast is unaffected.
    assert_eq!(*first.calls.lock().unwrap(), 1);
    assert_eq!(second.calls(), 1);
    assert!(!courier.is_registered(&handle));

    bridge.on_request_start(&req);
    assert_eq!(*first.calls.lock().unwrap(), 1);
    assert_eq!(second.calls(), 2);
}

/// Registers a new counter every time it runs.
struct Spawner {
    spawned: Mutex<Vec<Arc<CountingHandler>>>,
}

impl RequestHandler for Spawner {
    fn on_request_start(&self, api: &Courier, _request: Option<&RequestSnapshot>) {
        let counter = CountingHandler::new();
        api.add_request_listener(counter.clone());
        self.spawned.lock().unwrap().push(counter);
    }
}

#[test]
fn test_listener_added_during_a_broadcast_starts_with_the_next_one() {
    let courier = Courier::new();
    let spawner = Arc::new(Spawner {
        spawned: Mutex::new(Vec::new()),
    });
    courier.add_request_listener(spawner.clone());
    let bridge = courier.engine_bridge();
    let req = EnginePayload::new(request(1));

    bridge.on_request_start(&req);
    let spawned = spawner.spawned.lock().unwrap().clone();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].calls(), 0);

    bridge.on_request_start(&req);
    assert_eq!(spawned[0].calls(), 1);
    assert_eq!(courier.listener_count(Categories::REQUEST), 3);
}

#[test]
fn test_handles_are_listed_in_registration_order() {
    let courier = Courier::new();
    let a = courier.add_request_listener(CountingHandler::new());
    let b = courier.add_request_listener(CountingHandler::new());
    let c = courier.add_request_listener(CountingHandler::new());

    let ids: Vec<_> = courier
        .handles(Category::Request)
        .iter()
        .map(ListenerHandle::id)
        .collect();
    assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
    assert!(a.id() < b.id() && b.id() < c.id());
    assert_eq!(a.category(), Category::Request);
}

// ============================================================================
// Removal by handler identity
// ============================================================================

#[test]
fn test_remove_by_identity_covers_durable_and_single_use() {
    let courier = Courier::new();
    let shared = Recorder::new();
    let other = Recorder::new();

    courier.add_request_listener(shared.clone());
    courier.add_request_listener(shared.clone());
    let _single = courier.request_listener(Some(shared.clone()));
    let kept = courier.add_request_listener(other.clone());

    assert_eq!(courier.remove_request_listener(&shared), 3);
    assert_eq!(courier.remove_request_listener(&shared), 0);
    assert_eq!(courier.handles(Category::Request), vec![kept]);

    // Only the matching category is touched.
    courier.add_transfer_listener(other.clone());
    assert_eq!(courier.remove_request_listener(&other), 1);
    assert_eq!(courier.listener_count(Categories::TRANSFER), 1);
    assert_eq!(courier.remove_transfer_listener(&other), 1);
}

#[test]
fn test_remove_by_identity_ignores_handlerless_delegates() {
    let courier = Courier::new();
    let recorder = Recorder::new();
    let _empty = courier.transfer_listener(None);

    assert_eq!(courier.remove_transfer_listener(&recorder), 0);
    assert_eq!(courier.listener_count(Categories::TRANSFER), 1);
}

#[test]
fn test_remove_global_and_logger_by_identity() {
    let courier = Courier::new();
    let recorder = Recorder::new();
    courier.add_global_listener(recorder.clone());

    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let logger = Arc::new(move |record: &LogRecord| {
        sink.lock().unwrap().push(record.message.clone());
    });
    courier.add_logger(logger.clone());

    assert_eq!(courier.remove_global_listener(&recorder), 1);
    assert_eq!(courier.remove_logger(&logger), 1);
    assert_eq!(courier.listener_count(Categories::all()), 0);
}

#[test]
fn test_every_delegate_converts_back_into_its_handle() {
    let courier = Courier::new();
    let recorder = Recorder::new();

    let global = courier.add_global_listener(recorder.clone());
    let ListenerHandle::Global(delegate) = global.clone() else {
        panic!("expected a global handle, got {global:?}");
    };
    assert_eq!(ListenerHandle::from(delegate), global);

    let combined = courier.add_listener(recorder.clone());
    let ListenerHandle::Combined(delegate) = combined.clone() else {
        panic!("expected a combined handle, got {combined:?}");
    };
    assert_eq!(ListenerHandle::from(delegate), combined);

    let logger = courier.add_logger(Arc::new(|_: &LogRecord| {}));
    let ListenerHandle::Logger(delegate) = logger.clone() else {
        panic!("expected a logger handle, got {logger:?}");
    };
    let converted = ListenerHandle::from(delegate);
    assert_eq!(converted, logger);
    assert_eq!(converted.category(), Category::Logger);
    assert!(courier.is_registered(&converted));
}

// ============================================================================
// Bulk operations
// ============================================================================

#[test]
fn test_listener_count_and_remove_all() {
    let courier = Courier::new();
    let recorder = Recorder::new();
    courier.add_request_listener(recorder.clone());
    courier.add_transfer_listener(recorder.clone());
    courier.add_global_listener(recorder.clone());
    courier.add_listener(recorder.clone());
    let _tree = courier.tree_processor(None);

    assert_eq!(courier.listener_count(Categories::all()), 5);
    assert_eq!(
        courier.listener_count(Categories::REQUEST | Categories::TRANSFER),
        2
    );

    assert_eq!(
        courier.remove_all(Categories::REQUEST | Categories::COMBINED),
        2
    );
    assert_eq!(courier.listener_count(Categories::all()), 3);
    assert_eq!(courier.remove_all(Categories::all()), 3);
    assert_eq!(courier.listener_count(Categories::all()), 0);
}

#[test]
fn test_couriers_do_not_share_registrations() {
    let first = Courier::new();
    let second = Courier::new();
    let handle = first.add_request_listener(CountingHandler::new());

    assert!(!first.ptr_eq(&second));
    assert!(first.ptr_eq(&first.clone()));
    assert!(!second.register(&handle));
    assert!(!second.is_registered(&handle));
    assert!(!second.unregister(&handle));
    assert!(first.is_registered(&handle));
    assert_eq!(second.listener_count(Categories::all()), 0);
}

// ============================================================================
// Combined, global and logger listeners
// ============================================================================

#[test]
fn test_combined_listener_receives_every_category_and_never_retires() {
    let courier = Courier::new();
    let recorder = Recorder::new();
    let handle = courier.add_listener(recorder.clone());
    let bridge = courier.engine_bridge();

    let req = EnginePayload::new(request(1));
    let transfer = EnginePayload::new(download(2, 10, 10));
    let ok = EnginePayload::new(error(ErrorCode::OK));
    bridge.on_request_finish(&req, &ok);
    bridge.on_transfer_finish(&transfer, &ok);
    bridge.on_account_update();
    bridge.on_request_finish(&req, &ok);

    let seen = recorder.seen();
    assert_eq!(seen.len(), 4);
    assert!(matches!(seen[0], Seen::Request(_)));
    assert!(matches!(seen[1], Seen::Transfer(_)));
    assert_eq!(seen[2], Seen::Global(GlobalEvent::AccountUpdate));
    assert!(matches!(seen[3], Seen::Request(_)));

    assert!(courier.is_registered(&handle));
    assert_eq!(courier.remove_listener(&recorder), 1);
}

#[test]
fn test_durable_listeners_run_before_combined_ones() {
    let courier = Courier::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    struct Tagged(&'static str, Arc<Mutex<Vec<&'static str>>>);
    impl RequestHandler for Tagged {
        fn on_request_start(&self, _api: &Courier, _request: Option<&RequestSnapshot>) {
            self.1.lock().unwrap().push(self.0);
        }
    }
    impl TransferHandler for Tagged {}
    impl GlobalHandler for Tagged {}

    courier.add_listener(Arc::new(Tagged("combined", order.clone())));
    courier.add_request_listener(Arc::new(Tagged("request", order.clone())));

    courier
        .engine_bridge()
        .on_request_start(&EnginePayload::new(request(1)));

    assert_eq!(*order.lock().unwrap(), vec!["request", "combined"]);
}

#[test]
fn test_global_lists_are_copied_and_absent_lists_stay_absent() {
    let courier = Courier::new();
    let recorder = Recorder::new();
    courier.add_global_listener(recorder.clone());
    let bridge = courier.engine_bridge();

    let users = EngineList::new(vec![
        UserSnapshot {
            email: "ana@example.com".into(),
            ..Default::default()
        },
        UserSnapshot {
            email: "bo@example.com".into(),
            ..Default::default()
        },
    ]);
    bridge.on_users_update(Some(&users));
    bridge.on_nodes_update(None);
    bridge.on_event(&EnginePayload::new(EngineEventSnapshot {
        event_type: 4,
        text: Some("storage".into()),
        ..Default::default()
    }));
    bridge.on_reload_needed();
    bridge.on_global_sync_state_changed();

    let seen = recorder.seen();
    assert_eq!(seen.len(), 5);
    match &seen[0] {
        Seen::Global(GlobalEvent::UsersUpdate(Some(users))) => {
            let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
            assert_eq!(emails, vec!["ana@example.com", "bo@example.com"]);
        }
        other => panic!("expected users, got {other:?}"),
    }
    assert_eq!(seen[1], Seen::Global(GlobalEvent::NodesUpdate(None)));
    assert!(matches!(
        &seen[2],
        Seen::Global(GlobalEvent::Event(Some(event))) if event.event_type == 4
    ));
    assert_eq!(seen[3], Seen::Global(GlobalEvent::ReloadNeeded));
    assert_eq!(seen[4], Seen::Global(GlobalEvent::GlobalSyncStateChanged));
}

#[test]
fn test_logger_receives_owned_records() {
    let courier = Courier::new();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    courier.add_logger(Arc::new(move |record: &LogRecord| {
        sink.lock().unwrap().push(record.clone());
    }));

    courier
        .engine_bridge()
        .log("12:00:01", LogLevel::Warning, "net.cpp:10", "retrying");

    assert_eq!(
        *lines.lock().unwrap(),
        vec![LogRecord {
            time: "12:00:01".into(),
            level: LogLevel::Warning,
            source: "net.cpp:10".into(),
            message: "retrying".into(),
        }]
    );
}

// ============================================================================
// Tree processing
// ============================================================================

struct NamedOnly;

impl TreeProcessor for NamedOnly {
    fn process_node(&self, _api: &Courier, node: Option<&NodeSnapshot>) -> bool {
        node.is_some_and(|node| node.name.is_some())
    }
}

struct Exploding;

impl TreeProcessor for Exploding {
    fn process_node(&self, _api: &Courier, _node: Option<&NodeSnapshot>) -> bool {
        panic!("handler bug")
    }
}

fn named(name: &str) -> NodeSnapshot {
    NodeSnapshot {
        name: Some(name.into()),
        ..Default::default()
    }
}

#[test]
fn test_process_tree_registers_only_for_the_traversal() {
    let courier = Courier::new();

    let answers = courier.process_tree(Arc::new(NamedOnly), |delegate| {
        assert_eq!(courier.listener_count(Categories::TREE_PROCESSOR), 1);
        vec![
            delegate.process_node(&EnginePayload::new(named("a.txt"))),
            delegate.process_node(&EnginePayload::new(NodeSnapshot::default())),
            delegate.process_node(&EnginePayload::<NodeSnapshot>::broken()),
        ]
    });

    assert_eq!(answers, vec![true, false, false]);
    assert_eq!(courier.listener_count(Categories::TREE_PROCESSOR), 0);
}

#[test]
fn test_process_tree_unregisters_when_the_traversal_panics() {
    let courier = Courier::new();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        courier.process_tree::<(), _>(Arc::new(NamedOnly), |_delegate| panic!("engine bug"))
    }));

    assert!(outcome.is_err());
    assert_eq!(courier.listener_count(Categories::TREE_PROCESSOR), 0);
}

#[test]
fn test_tree_processor_answers_false_without_handler_or_on_panic() {
    init_tracing();
    let courier = Courier::new();
    let node = EnginePayload::new(named("a.txt"));

    let empty = courier.tree_processor(None);
    assert!(!empty.process_node(&node));

    let exploding = courier.tree_processor(Some(Arc::new(Exploding)));
    assert!(!exploding.process_node(&node));

    // Panicking handlers do not poison the delegate.
    let healthy = courier.tree_processor(Some(Arc::new(NamedOnly)));
    assert!(healthy.process_node(&node));
    assert_eq!(courier.listener_count(Categories::TREE_PROCESSOR), 3);
}

#[test]
fn test_delegates_go_quiet_once_the_courier_is_dropped() {
    let courier = Courier::new();
    let recorder = Recorder::new();
    let listener = courier.transfer_listener(Some(recorder.clone()));
    let tree = courier.tree_processor(Some(Arc::new(NamedOnly)));
    let bridge = courier.engine_bridge();
    courier.add_transfer_listener(recorder.clone());
    drop(courier);

    let transfer = EnginePayload::new(download(1, 0, 10));
    listener.on_transfer_start(&transfer);
    bridge.on_transfer_start(&transfer);
    assert!(!listener.on_transfer_data(&transfer, b"abc"));
    assert!(!tree.process_node(&EnginePayload::new(named("a.txt"))));

    assert_eq!(recorder.count(), 0);
}
