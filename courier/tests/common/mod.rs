#![allow(dead_code)]

use courier::{
    ContactRequestSnapshot, Courier, EngineEventSnapshot, ErrorCode, ErrorSnapshot,
    FolderProgress, GlobalEvent, GlobalHandler, NodeSnapshot, RequestEvent, RequestHandler,
    RequestSnapshot, SetElementSnapshot, SetSnapshot, TransferDirection, TransferEvent,
    TransferHandler, TransferSnapshot, TransferState, UserAlertSnapshot, UserSnapshot,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, ThreadId},
};

// ============================================================================
// Tracing
// ============================================================================

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Recording handler
// ============================================================================

/// One handler invocation, as the handler saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Request(RequestEvent),
    Transfer(TransferEvent),
    Global(GlobalEvent),
    Data(Option<TransferSnapshot>, Vec<u8>),
}

/// Records every callback it receives, and the thread it ran on.
pub struct Recorder {
    seen: Mutex<Vec<Seen>>,
    threads: Mutex<Vec<ThreadId>>,
    keep_streaming: bool,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Self::streaming(false)
    }

    /// A recorder that answers `keep_streaming` to data chunks.
    pub fn streaming(keep_streaming: bool) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            threads: Mutex::new(Vec::new()),
            keep_streaming,
        })
    }

    fn push(&self, seen: Seen) {
        self.seen.lock().unwrap().push(seen);
        self.threads.lock().unwrap().push(thread::current().id());
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().unwrap().clone()
    }

    /// Transfer progress values in the order observed.
    pub fn transfer_progress(&self) -> Vec<f64> {
        self.seen()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Transfer(
                    TransferEvent::Start(Some(t))
                    | TransferEvent::Update(Some(t))
                    | TransferEvent::Finish(Some(t), _),
                ) => Some(t.progress()),
                _ => None,
            })
            .collect()
    }
}

impl RequestHandler for Recorder {
    fn on_request_start(&self, _api: &Courier, request: Option<&RequestSnapshot>) {
        self.push(Seen::Request(RequestEvent::Start(request.cloned())));
    }

    fn on_request_update(&self, _api: &Courier, request: Option<&RequestSnapshot>) {
        self.push(Seen::Request(RequestEvent::Update(request.cloned())));
    }

    fn on_request_finish(
        &self,
        _api: &Courier,
        request: Option<&RequestSnapshot>,
        error: Option<&ErrorSnapshot>,
    ) {
        self.push(Seen::Request(RequestEvent::Finish(
            request.cloned(),
            error.cloned(),
        )));
    }

    fn on_request_temporary_error(
        &self,
        _api: &Courier,
        request: Option<&RequestSnapshot>,
        error: Option<&ErrorSnapshot>,
    ) {
        self.push(Seen::Request(RequestEvent::TemporaryError(
            request.cloned(),
            error.cloned(),
        )));
    }
}

impl TransferHandler for Recorder {
    fn on_transfer_start(&self, _api: &Courier, transfer: Option<&TransferSnapshot>) {
        self.push(Seen::Transfer(TransferEvent::Start(transfer.cloned())));
    }

    fn on_transfer_update(&self, _api: &Courier, transfer: Option<&TransferSnapshot>) {
        self.push(Seen::Transfer(TransferEvent::Update(transfer.cloned())));
    }

    fn on_transfer_finish(
        &self,
        _api: &Courier,
        transfer: Option<&TransferSnapshot>,
        error: Option<&ErrorSnapshot>,
    ) {
        self.push(Seen::Transfer(TransferEvent::Finish(
            transfer.cloned(),
            error.cloned(),
        )));
    }

    fn on_transfer_temporary_error(
        &self,
        _api: &Courier,
        transfer: Option<&TransferSnapshot>,
        error: Option<&ErrorSnapshot>,
    ) {
        self.push(Seen::Transfer(TransferEvent::TemporaryError(
            transfer.cloned(),
            error.cloned(),
        )));
    }

    fn on_folder_transfer_update(
        &self,
        _api: &Courier,
        transfer: Option<&TransferSnapshot>,
        progress: &FolderProgress,
    ) {
        self.push(Seen::Transfer(TransferEvent::FolderUpdate(
            transfer.cloned(),
            progress.clone(),
        )));
    }

    fn on_transfer_data(
        &self,
        _api: &Courier,
        transfer: Option<&TransferSnapshot>,
        buffer: &[u8],
    ) -> bool {
        self.push(Seen::Data(transfer.cloned(), buffer.to_vec()));
        self.keep_streaming
    }
}

impl GlobalHandler for Recorder {
    fn on_users_update(&self, _api: &Courier, users: Option<&[UserSnapshot]>) {
        self.push(Seen::Global(GlobalEvent::UsersUpdate(users.map(<[_]>::to_vec))));
    }

    fn on_user_alerts_update(&self, _api: &Courier, alerts: Option<&[UserAlertSnapshot]>) {
        self.push(Seen::Global(GlobalEvent::UserAlertsUpdate(
            alerts.map(<[_]>::to_vec),
        )));
    }

    fn on_nodes_update(&self, _api: &Courier, nodes: Option<&[NodeSnapshot]>) {
        self.push(Seen::Global(GlobalEvent::NodesUpdate(nodes.map(<[_]>::to_vec))));
    }

    fn on_account_update(&self, _api: &Courier) {
        self.push(Seen::Global(GlobalEvent::AccountUpdate));
    }

    fn on_contact_requests_update(
        &self,
        _api: &Courier,
        requests: Option<&[ContactRequestSnapshot]>,
    ) {
        self.push(Seen::Global(GlobalEvent::ContactRequestsUpdate(
            requests.map(<[_]>::to_vec),
        )));
    }

    fn on_reload_needed(&self, _api: &Courier) {
        self.push(Seen::Global(GlobalEvent::ReloadNeeded));
    }

    fn on_event(&self, _api: &Courier, event: Option<&EngineEventSnapshot>) {
        self.push(Seen::Global(GlobalEvent::Event(event.cloned())));
    }

    fn on_sets_update(&self, _api: &Courier, sets: Option<&[SetSnapshot]>) {
        self.push(Seen::Global(GlobalEvent::SetsUpdate(sets.map(<[_]>::to_vec))));
    }

    fn on_set_elements_update(&self, _api: &Courier, elements: Option<&[SetElementSnapshot]>) {
        self.push(Seen::Global(GlobalEvent::SetElementsUpdate(
            elements.map(<[_]>::to_vec),
        )));
    }

    fn on_global_sync_state_changed(&self, _api: &Courier) {
        self.push(Seen::Global(GlobalEvent::GlobalSyncStateChanged));
    }
}

/// Counts request starts; nothing else.
pub struct CountingHandler {
    pub calls: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RequestHandler for CountingHandler {
    fn on_request_start(&self, _api: &Courier, _request: Option<&RequestSnapshot>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Payload builders
// ============================================================================

pub fn download(tag: i32, transferred_bytes: u64, total_bytes: u64) -> TransferSnapshot {
    TransferSnapshot {
        tag,
        direction: TransferDirection::Download,
        state: TransferState::Active,
        file_name: Some("report.pdf".into()),
        transferred_bytes,
        total_bytes,
        ..Default::default()
    }
}

pub fn request(tag: i32) -> RequestSnapshot {
    RequestSnapshot {
        tag,
        name: Some("fetch".into()),
        ..Default::default()
    }
}

pub fn error(code: ErrorCode) -> ErrorSnapshot {
    ErrorSnapshot::new(code)
}
