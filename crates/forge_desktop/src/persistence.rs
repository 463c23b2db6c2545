//! Layout and configuration persistence through the host preference store.

use leptos::logging;
use platform_host::{load_pref_with, save_pref_with, PrefsStore};

use crate::{
    config::DesktopConfigOverrides,
    model::{DesktopLayoutSnapshot, DesktopState, DESKTOP_LAYOUT_SCHEMA_VERSION},
};

/// Preference key holding the [`DesktopLayoutSnapshot`].
pub const LAYOUT_PREFS_KEY: &str = "promptforge.desktop.layout.v1";
/// Preference key holding [`DesktopConfigOverrides`].
pub const CONFIG_PREFS_KEY: &str = "promptforge.desktop.config.v1";

fn migrate_layout_snapshot(snapshot: DesktopLayoutSnapshot) -> Option<DesktopLayoutSnapshot> {
    match snapshot.schema_version {
        DESKTOP_LAYOUT_SCHEMA_VERSION => Some(snapshot),
        _ => None,
    }
}

/// Loads the persisted layout, if any.
///
/// Store failures are logged and treated as "no layout". A stored layout that no longer parses or
/// carries an unknown schema version is logged and removed so the desktop boots with default
/// positions and later saves start clean.
pub async fn load_layout_snapshot(prefs: &dyn PrefsStore) -> Option<DesktopLayoutSnapshot> {
    let raw = match prefs.load_pref(LAYOUT_PREFS_KEY).await {
        Ok(raw) => raw?,
        Err(err) => {
            logging::warn!("desktop layout load failed: {err}");
            return None;
        }
    };
    let migrated = match serde_json::from_str::<DesktopLayoutSnapshot>(&raw) {
        Ok(snapshot) => {
            let version = snapshot.schema_version;
            let migrated = migrate_layout_snapshot(snapshot);
            if migrated.is_none() {
                logging::warn!("discarding desktop layout with unsupported schema {version}");
            }
            migrated
        }
        Err(err) => {
            logging::warn!("discarding malformed desktop layout: {err}");
            None
        }
    };
    if migrated.is_none() {
        if let Err(err) = prefs.delete_pref(LAYOUT_PREFS_KEY).await {
            logging::warn!("desktop layout cleanup failed: {err}");
        }
    }
    migrated
}

/// Persists icon positions and the recycle bin.
///
/// # Errors
///
/// Returns the preference store error.
pub async fn persist_layout_snapshot(
    prefs: &dyn PrefsStore,
    state: &DesktopState,
) -> Result<(), String> {
    save_pref_with(prefs, LAYOUT_PREFS_KEY, &state.snapshot()).await
}

/// Loads user configuration overrides; malformed entries are logged and ignored.
pub async fn load_config_overrides(prefs: &dyn PrefsStore) -> Option<DesktopConfigOverrides> {
    match load_pref_with::<_, DesktopConfigOverrides>(prefs, CONFIG_PREFS_KEY).await {
        Ok(overrides) => overrides,
        Err(err) => {
            logging::warn!("desktop config overrides ignored: {err}");
            None
        }
    }
}

/// Saves user configuration overrides.
///
/// # Errors
///
/// Returns the preference store error.
pub async fn save_config_overrides(
    prefs: &dyn PrefsStore,
    overrides: &DesktopConfigOverrides,
) -> Result<(), String> {
    save_pref_with(prefs, CONFIG_PREFS_KEY, overrides).await
}
