//! Filesystem event handler for the options watcher (hot-reload).

use std::path::Path;
use std::sync::Weak;

use notify::event::ModifyKind;
use notify::{Event, EventKind};
use tracing::{debug, warn};

use super::options::{MonitorState, OptionsMonitor};

/// Handle a single filesystem event from the notify watcher.
///
/// Only events touching `target` are considered. A dropped monitor makes the
/// handler a no-op.
pub(super) fn handle_fs_event(event: &Event, target: &Path, state: &Weak<MonitorState>) {
    let touches_target = event
        .paths
        .iter()
        .any(|path| path.file_name().is_some() && path.file_name() == target.file_name());
    if !touches_target {
        return;
    }

    match &event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Name(_))
        | EventKind::Modify(ModifyKind::Any) => {
            let Some(state) = state.upgrade() else {
                return;
            };
            // Failures are logged by reload; the previous options stay active.
            let _ = OptionsMonitor { state }.reload();
        }
        EventKind::Remove(_) => {
            warn!(path = %target.display(), "tagger options file removed, keeping previous version");
        }
        other => {
            debug!(path = %target.display(), kind = ?other, "ignoring filesystem event");
        }
    }
}
