//! Listener identity and categories.

use bitflags::bitflags;
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one listener registration.
///
/// Identifiers are allocated from a process-wide counter so two handles never
/// compare equal, even across independent facades. Allocation order doubles as
/// creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of listener categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Per-request progress and completion.
    Request,
    /// Per-transfer progress, completion and streaming data.
    Transfer,
    /// Account-wide state changes (users, nodes, sets, alerts...).
    Global,
    /// Union of request, transfer and global.
    Combined,
    /// Engine log lines.
    Logger,
    /// Node tree traversal.
    TreeProcessor,
}

impl Category {
    /// Every category, in registry order.
    pub const ALL: [Category; 6] = [
        Category::Request,
        Category::Transfer,
        Category::Global,
        Category::Combined,
        Category::Logger,
        Category::TreeProcessor,
    ];

    /// A short lowercase name, used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Request => "request",
            Category::Transfer => "transfer",
            Category::Global => "global",
            Category::Combined => "combined",
            Category::Logger => "logger",
            Category::TreeProcessor => "tree_processor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of [`Category`] values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Categories: u8 {
        /// [`Category::Request`]
        const REQUEST = 1 << 0;
        /// [`Category::Transfer`]
        const TRANSFER = 1 << 1;
        /// [`Category::Global`]
        const GLOBAL = 1 << 2;
        /// [`Category::Combined`]
        const COMBINED = 1 << 3;
        /// [`Category::Logger`]
        const LOGGER = 1 << 4;
        /// [`Category::TreeProcessor`]
        const TREE_PROCESSOR = 1 << 5;
    }
}

impl Categories {
    /// Iterate the individual categories contained in this set.
    pub fn categories(self) -> impl Iterator<Item = Category> {
        Category::ALL
            .into_iter()
            .filter(move |category| self.contains(Categories::from(*category)))
    }
}

impl From<Category> for Categories {
    fn from(category: Category) -> Self {
        match category {
            Category::Request => Categories::REQUEST,
            Category::Transfer => Categories::TRANSFER,
            Category::Global => Categories::GLOBAL,
            Category::Combined => Categories::COMBINED,
            Category::Logger => Categories::LOGGER,
            Category::TreeProcessor => Categories::TREE_PROCESSOR,
        }
    }
}
