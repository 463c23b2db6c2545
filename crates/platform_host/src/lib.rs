//! Typed host contracts consumed by the PromptForge desktop core.
//!
//! The desktop grid never talks to a backend directly. It depends on the filesystem orchestrator,
//! the system event bus, and a preference store through the traits in this crate, so browser,
//! desktop, and test hosts can provide their own adapters.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod events;
pub mod fs;
pub mod storage;
pub mod time;

pub use events::{
    EventBus, EventHandler, LocalEventBus, Subscription, SystemEvent, FS_CHANGE_EVENTS,
    FS_CREATED, FS_DELETED, FS_MOVED, FS_RENAMED,
};
pub use fs::service::{
    FilesystemService, FsFuture, MemoryFilesystemService, NoopFilesystemService,
};
pub use fs::types::{FsMoveRequest, FsNode, FsNodeKind};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsFuture, PrefsStore,
};
pub use time::unix_time_ms_now;
