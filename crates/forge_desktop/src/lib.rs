//! Desktop icon grid for PromptForge: icon placement, selection, marquee, grid and payload drag,
//! context menus, and the recycle bin.

pub mod actions;
pub mod config;
pub mod drag_payload;
pub mod grid;
pub mod host;
pub mod input;
pub mod marquee;
pub mod model;
pub mod persistence;
pub mod reducer;
pub mod runtime;
pub mod store;

#[cfg(test)]
mod test_support;

pub use actions::ContextAction;
pub use config::{ConfigError, DesktopConfig, DesktopConfigOverrides, GridMetrics};
pub use drag_payload::{DragPayload, DRAG_PAYLOAD_MIME};
pub use grid::GridBounds;
pub use host::DesktopHostContext;
pub use input::{DesktopInput, InputQueue, InputRouter, Modifiers, PointerButton};
pub use model::*;
pub use persistence::{load_layout_snapshot, persist_layout_snapshot};
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
pub use runtime::DesktopRuntime;
pub use store::{DesktopStore, ListenerId};
