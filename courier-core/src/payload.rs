//! Owned snapshot types.
//!
//! These are the values application handlers observe. Each one is a complete,
//! independent copy of an engine payload and never refers back into engine
//! memory.

use crate::message::Message;
use std::fmt;

/// Engine handle of a node, user, set or other account object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub u64);

impl Handle {
    /// The engine's "no handle" sentinel.
    pub const UNDEF: Handle = Handle(u64::MAX);

    /// Returns `None` for [`Handle::UNDEF`].
    pub fn defined(self) -> Option<Handle> {
        (self != Handle::UNDEF).then_some(self)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Result code reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    /// Everything OK.
    pub const OK: ErrorCode = ErrorCode(0);
    /// Internal error.
    pub const EINTERNAL: ErrorCode = ErrorCode(-1);
    /// Bad arguments.
    pub const EARGS: ErrorCode = ErrorCode(-2);
    /// Request failed, retry with exponential back-off.
    pub const EAGAIN: ErrorCode = ErrorCode(-3);
    /// Too many requests, slow down.
    pub const ERATELIMIT: ErrorCode = ErrorCode(-4);
    /// Request failed permanently.
    pub const EFAILED: ErrorCode = ErrorCode(-5);
    /// Too many requests for this resource.
    pub const ETOOMANY: ErrorCode = ErrorCode(-6);
    /// Resource access out of range.
    pub const ERANGE: ErrorCode = ErrorCode(-7);
    /// Resource expired.
    pub const EEXPIRED: ErrorCode = ErrorCode(-8);
    /// Resource does not exist.
    pub const ENOENT: ErrorCode = ErrorCode(-9);
    /// Circular linkage.
    pub const ECIRCULAR: ErrorCode = ErrorCode(-10);
    /// Access denied.
    pub const EACCESS: ErrorCode = ErrorCode(-11);
    /// Resource already exists.
    pub const EEXIST: ErrorCode = ErrorCode(-12);
    /// Request incomplete.
    pub const EINCOMPLETE: ErrorCode = ErrorCode(-13);
    /// Cryptographic error.
    pub const EKEY: ErrorCode = ErrorCode(-14);
    /// Bad session ID.
    pub const ESID: ErrorCode = ErrorCode(-15);
    /// Resource administratively blocked.
    pub const EBLOCKED: ErrorCode = ErrorCode(-16);
    /// Quota exceeded.
    pub const EOVERQUOTA: ErrorCode = ErrorCode(-17);
    /// Resource temporarily not available.
    pub const ETEMPUNAVAIL: ErrorCode = ErrorCode(-18);
    /// Too many connections on this resource.
    pub const ETOOMANYCONNECTIONS: ErrorCode = ErrorCode(-19);
    /// File could not be written to.
    pub const EWRITE: ErrorCode = ErrorCode(-20);
    /// File could not be read from.
    pub const EREAD: ErrorCode = ErrorCode(-21);
    /// Invalid or missing application key.
    pub const EAPPKEY: ErrorCode = ErrorCode(-22);

    /// Symbolic name of a known code, `"UNKNOWN"` otherwise.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "OK",
            -1 => "EINTERNAL",
            -2 => "EARGS",
            -3 => "EAGAIN",
            -4 => "ERATELIMIT",
            -5 => "EFAILED",
            -6 => "ETOOMANY",
            -7 => "ERANGE",
            -8 => "EEXPIRED",
            -9 => "ENOENT",
            -10 => "ECIRCULAR",
            -11 => "EACCESS",
            -12 => "EEXIST",
            -13 => "EINCOMPLETE",
            -14 => "EKEY",
            -15 => "ESID",
            -16 => "EBLOCKED",
            -17 => "EOVERQUOTA",
            -18 => "ETEMPUNAVAIL",
            -19 => "ETOOMANYCONNECTIONS",
            -20 => "EWRITE",
            -21 => "EREAD",
            -22 => "EAPPKEY",
            _ => "UNKNOWN",
        }
    }

    /// `true` for [`ErrorCode::OK`].
    pub fn is_ok(self) -> bool {
        self == ErrorCode::OK
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Error information attached to a finished or retrying operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorSnapshot {
    /// Result code.
    pub code: ErrorCode,
    /// Code-specific extra value (e.g. seconds to wait on over-quota).
    pub value: i64,
}

impl ErrorSnapshot {
    /// An error snapshot with the given code and no extra value.
    pub fn new(code: ErrorCode) -> Self {
        Self { code, value: 0 }
    }

    /// Successful completion.
    pub fn ok() -> Self {
        Self::new(ErrorCode::OK)
    }

    /// `true` if the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

// ============================================================================
// Requests and transfers
// ============================================================================

/// State of one asynchronous request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestSnapshot {
    /// Engine request type code.
    pub request_type: i32,
    /// Tag identifying the request for its lifetime.
    pub tag: i32,
    /// Node the request acts on.
    pub node_handle: Option<Handle>,
    /// Destination or parent node.
    pub parent_handle: Option<Handle>,
    /// Name argument or result.
    pub name: Option<String>,
    /// Email argument or result.
    pub email: Option<String>,
    /// Public link argument or result.
    pub link: Option<String>,
    /// Local path argument.
    pub file: Option<String>,
    /// Free-form text argument or result.
    pub text: Option<String>,
    /// Request-specific numeric value.
    pub number: i64,
    /// Request-specific flag.
    pub flag: bool,
    /// Bytes processed so far.
    pub transferred_bytes: u64,
    /// Bytes to process in total, zero if unknown.
    pub total_bytes: u64,
    /// Tag of the transfer this request relates to, if any.
    pub transfer_tag: i32,
}

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferDirection {
    /// Remote to local.
    #[default]
    Download,
    /// Local to remote.
    Upload,
}

/// Lifecycle state of a transfer as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferState {
    /// Not yet known to the engine.
    #[default]
    None,
    /// Waiting for a slot.
    Queued,
    /// Moving data.
    Active,
    /// Paused by the application.
    Paused,
    /// Waiting to retry after a temporary error.
    Retrying,
    /// Data moved, finishing up.
    Completing,
    /// Finished successfully.
    Completed,
    /// Cancelled by the application.
    Cancelled,
    /// Finished with an error.
    Failed,
}

impl TransferState {
    /// `true` once the engine will emit no further progress for the transfer.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TransferState::Completed | TransferState::Cancelled | TransferState::Failed
        )
    }
}

/// State of one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferSnapshot {
    /// Tag identifying the transfer for its lifetime.
    pub tag: i32,
    /// Upload or download.
    pub direction: TransferDirection,
    /// Engine-reported state.
    pub state: TransferState,
    /// Leaf name of the file.
    pub file_name: Option<String>,
    /// Local path.
    pub path: Option<String>,
    /// Remote node being transferred.
    pub node_handle: Option<Handle>,
    /// Remote parent of an upload.
    pub parent_handle: Option<Handle>,
    /// First byte of the transferred range.
    pub start_pos: u64,
    /// One past the last byte of the transferred range.
    pub end_pos: u64,
    /// Bytes moved so far.
    pub transferred_bytes: u64,
    /// Bytes to move in total, zero if unknown.
    pub total_bytes: u64,
    /// Bytes moved since the previous update.
    pub delta_size: u64,
    /// Bytes per second.
    pub speed: u64,
    /// Data is handed to the application instead of written to disk.
    pub is_streaming: bool,
    /// The transfer covers a folder tree.
    pub is_folder: bool,
    /// The most recent chunk of a streaming download.
    pub last_bytes: Option<Vec<u8>>,
}

impl TransferSnapshot {
    /// Completed fraction in `[0, 1]`; zero when the total is unknown.
    pub fn progress(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.transferred_bytes as f64 / self.total_bytes as f64).clamp(0.0, 1.0)
    }
}

/// Progress of a folder transfer's scanning and creation stages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderProgress {
    /// Engine stage code (scanning, creating folders, transferring files).
    pub stage: i32,
    /// Folders found so far.
    pub folder_count: u64,
    /// Folders created so far.
    pub created_folder_count: u64,
    /// Files found so far.
    pub file_count: u64,
    /// Folder being scanned.
    pub current_folder: Option<String>,
    /// Leaf name of the file being processed.
    pub current_file_leaf_name: Option<String>,
}

// ============================================================================
// Account objects
// ============================================================================

/// Kind of node in the remote tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Not reported by the engine.
    #[default]
    Unknown,
    /// A regular file.
    File,
    /// A folder.
    Folder,
    /// Root of the cloud drive.
    Root,
    /// Root of incoming shares.
    Incoming,
    /// Root of the rubbish bin.
    Rubbish,
}

/// A file or folder in the remote tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeSnapshot {
    /// Handle of this node.
    pub handle: Option<Handle>,
    /// Handle of the parent folder.
    pub parent: Option<Handle>,
    /// Display name.
    pub name: Option<String>,
    /// File, folder or a root.
    pub kind: NodeKind,
    /// Size in bytes; zero for folders.
    pub size: u64,
    /// Creation time, seconds since the epoch.
    pub creation_time: i64,
    /// Modification time, seconds since the epoch.
    pub modification_time: i64,
    /// Bit mask of attributes that changed in this update.
    pub changes: u64,
}

/// A contact or the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserSnapshot {
    /// User handle.
    pub handle: Option<Handle>,
    /// Account email.
    pub email: String,
    /// Contact visibility code.
    pub visibility: i32,
    /// Bit mask of attributes that changed in this update.
    pub changes: u64,
    /// Time of the last change, seconds since the epoch.
    pub timestamp: i64,
}

/// An in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserAlertSnapshot {
    /// Alert id, unique per session.
    pub id: u32,
    /// Engine alert type code.
    pub alert_type: i32,
    /// Display title.
    pub title: Option<String>,
    /// Already marked as seen.
    pub seen: bool,
    /// Creation time, seconds since the epoch.
    pub timestamp: i64,
}

/// An incoming or outgoing contact invitation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactRequestSnapshot {
    /// Request handle.
    pub handle: Option<Handle>,
    /// Email of the inviting user.
    pub source_email: Option<String>,
    /// Email of the invited user.
    pub target_email: Option<String>,
    /// Optional invitation text.
    pub message: Option<String>,
    /// Engine status code (unresolved, accepted, denied...).
    pub status: i32,
    /// Sent by the account owner.
    pub outgoing: bool,
    /// Creation time, seconds since the epoch.
    pub creation_time: i64,
    /// Modification time, seconds since the epoch.
    pub modification_time: i64,
}

/// A named collection of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetSnapshot {
    /// Set id.
    pub id: Option<Handle>,
    /// Display name.
    pub name: Option<String>,
    /// Element used as the cover.
    pub cover: Option<Handle>,
    /// Bit mask of attributes that changed in this update.
    pub changes: u64,
}

/// One member of a [`SetSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetElementSnapshot {
    /// Element id.
    pub id: Option<Handle>,
    /// Set the element belongs to.
    pub set_id: Option<Handle>,
    /// Node the element points at.
    pub node: Option<Handle>,
    /// Position within the set.
    pub order: i64,
    /// Display name override.
    pub name: Option<String>,
    /// Bit mask of attributes that changed in this update.
    pub changes: u64,
}

/// A generic engine event (storage state change, business status...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineEventSnapshot {
    /// Engine event type code.
    pub event_type: i32,
    /// Event-specific text.
    pub text: Option<String>,
    /// Event-specific number.
    pub number: i64,
    /// Event-specific handle.
    pub handle: Option<Handle>,
}

// ============================================================================
// Logging
// ============================================================================

/// Engine log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Unrecoverable.
    Fatal = 0,
    /// Operation failed.
    Error = 1,
    /// Unexpected but handled.
    Warning = 2,
    /// Notable progress.
    Info = 3,
    /// Developer detail.
    Debug = 4,
    /// Everything, including very verbose output.
    Max = 5,
}

impl LogLevel {
    /// Map the engine's integer level; anything above `Debug` is `Max`.
    pub fn from_raw(level: i32) -> Self {
        match level {
            i32::MIN..=0 => LogLevel::Fatal,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Max,
        }
    }
}

/// One engine log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Engine-formatted timestamp.
    pub time: String,
    /// Severity.
    pub level: LogLevel,
    /// Source location inside the engine.
    pub source: String,
    /// The log line.
    pub message: String,
}

impl Message for ErrorSnapshot {}
impl Message for RequestSnapshot {}
impl Message for TransferSnapshot {}
impl Message for FolderProgress {}
impl Message for NodeSnapshot {}
impl Message for UserSnapshot {}
impl Message for UserAlertSnapshot {}
impl Message for ContactRequestSnapshot {}
impl Message for SetSnapshot {}
impl Message for SetElementSnapshot {}
impl Message for EngineEventSnapshot {}
impl Message for LogRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_names() {
        assert_eq!(ErrorCode::ENOENT.name(), "ENOENT");
        assert_eq!(ErrorCode(-9), ErrorCode::ENOENT);
        assert_eq!(ErrorCode(42).name(), "UNKNOWN");
        assert_eq!(ErrorCode::OK.to_string(), "OK (0)");
        assert!(ErrorSnapshot::ok().is_ok());
        assert!(!ErrorSnapshot::new(ErrorCode::EAGAIN).is_ok());
    }

    #[test]
    fn test_transfer_progress_is_clamped() {
        let mut transfer = TransferSnapshot {
            transferred_bytes: 50,
            total_bytes: 100,
            ..Default::default()
        };
        assert_eq!(transfer.progress(), 0.5);

        transfer.transferred_bytes = 150;
        assert_eq!(transfer.progress(), 1.0);

        transfer.total_bytes = 0;
        assert_eq!(transfer.progress(), 0.0);
    }

    #[test]
    fn test_undefined_handle_is_absent() {
        assert_eq!(Handle::UNDEF.defined(), None);
        assert_eq!(Handle(7).defined(), Some(Handle(7)));
    }

    #[test]
    fn test_log_level_from_raw() {
        assert_eq!(LogLevel::from_raw(0), LogLevel::Fatal);
        assert_eq!(LogLevel::from_raw(2), LogLevel::Warning);
        assert_eq!(LogLevel::from_raw(99), LogLevel::Max);
        assert_eq!(LogLevel::from_raw(-3), LogLevel::Fatal);
    }
}
