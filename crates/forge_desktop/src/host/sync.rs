//! Filesystem change tracking and icon reconciliation.

use std::{cell::Cell, rc::Rc};

use leptos::logging;
use platform_host::{EventBus, FsNodeKind, Subscription, SystemEvent, FS_CHANGE_EVENTS};

use crate::{host::DesktopHostContext, store::DesktopStore};

#[derive(Debug, Clone, Default)]
/// Raised by filesystem change notifications; the runtime refreshes icons when it sees it.
pub struct ResyncFlag(Rc<Cell<bool>>);

impl ResyncFlag {
    pub fn raise(&self) {
        self.0.set(true);
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Clears the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Raises `flag` on every filesystem change event. Handlers stay registered while the returned
/// subscriptions are alive.
pub fn watch_filesystem_events(bus: &dyn EventBus, flag: &ResyncFlag) -> Vec<Subscription> {
    FS_CHANGE_EVENTS
        .iter()
        .map(|event| {
            let flag = flag.clone();
            bus.on(event, Rc::new(move |_: &SystemEvent| flag.raise()))
        })
        .collect()
}

/// Reloads root-level folders and prompts and reconciles desktop icons against them.
///
/// Returns `false` when the listing failed; the desktop then keeps its last known icons.
pub async fn refresh_desktop(host: &DesktopHostContext, store: &mut DesktopStore) -> bool {
    let fs = host.fs_service();
    let nodes = match fs.load_children(None).await {
        Ok(nodes) => nodes,
        Err(err) => {
            logging::warn!("desktop icon refresh failed: {err}");
            return false;
        }
    };
    let (folders, prompts): (Vec<_>, Vec<_>) = nodes
        .into_iter()
        .partition(|node| node.kind == FsNodeKind::Folder);
    store.sync_db_folders(folders);
    store.sync_db_prompts(prompts);
    true
}
