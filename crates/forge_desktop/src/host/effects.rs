//! Runtime-effect dispatch for the desktop host boundary.

use leptos::logging;

use crate::{host::DesktopHostContext, model::DesktopState, persistence, reducer::RuntimeEffect};

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the runtime should do after an effect ran.
pub enum EffectOutcome {
    /// Nothing further.
    Handled,
    /// Filesystem icons are stale; reload them.
    Resync,
    /// The effect belongs to the surrounding app shell (open views, rename records, trash
    /// bookkeeping, user notices).
    Forward(RuntimeEffect),
}

/// Executes one effect against the host services.
///
/// Service failures are logged and swallowed; the desktop keeps its current state.
pub async fn run_runtime_effect(
    host: &DesktopHostContext,
    state: &DesktopState,
    effect: RuntimeEffect,
) -> EffectOutcome {
    match effect {
        RuntimeEffect::PersistLayout => {
            let prefs = host.prefs_store();
            if let Err(err) = persistence::persist_layout_snapshot(prefs.as_ref(), state).await {
                logging::warn!("desktop layout persist failed: {err}");
            }
            EffectOutcome::Handled
        }
        RuntimeEffect::MoveNode {
            kind,
            id,
            target_folder_id,
        } => {
            let fs = host.fs_service();
            match fs
                .move_node(kind, &id, target_folder_id.as_deref())
                .await
            {
                Ok(()) => EffectOutcome::Resync,
                Err(err) => {
                    logging::warn!("moving {kind} `{id}` failed: {err}");
                    EffectOutcome::Handled
                }
            }
        }
        RuntimeEffect::RequestResync => EffectOutcome::Resync,
        RuntimeEffect::UnhandledAction(action_id) => {
            logging::debug_warn!("ignoring unhandled desktop action `{action_id}`");
            EffectOutcome::Handled
        }
        other => EffectOutcome::Forward(other),
    }
}
