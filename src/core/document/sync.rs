//! Cross-namespace synchronization
//!
//! Several namespaces carry the same fact (a title in Dublin Core and in the
//! PDF info dictionary, an artist in EXIF and in `dc:creator`). Two passes
//! reconcile them:
//!
//! - inbound: every model pulls values it derives from its siblings
//! - outbound: every model pushes its values toward the shared base
//!   namespaces (`dc`, `xmp`, `xmpRights`)
//!
//! Hooks only fill fields that are empty, so the passes converge regardless
//! of model order. A failing hook is reported and skipped; changes other
//! hooks already made are kept.

use super::ModelSet;
use crate::core::error::XmpError;
use crate::core::model::Model;
use log::{debug, warn};

/// Errors raised by synchronization hooks
#[derive(Debug, Default)]
pub struct SyncReport {
    errors: Vec<XmpError>,
}

impl SyncReport {
    /// Whether every hook succeeded
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Hook errors, each wrapped with its namespace
    pub fn errors(&self) -> &[XmpError] {
        &self.errors
    }

    /// Consume into the errors
    pub fn into_errors(self) -> Vec<XmpError> {
        self.errors
    }

    fn merge(&mut self, other: SyncReport) {
        self.errors.extend(other.errors);
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Inbound,
    Outbound,
}

fn run(models: &mut ModelSet, direction: Direction) -> SyncReport {
    let mut report = SyncReport::default();
    for prefix in models.prefixes() {
        let Some((index, mut model)) = models.take(prefix) else {
            continue;
        };
        debug!("{:?} sync of '{}'", direction, prefix);
        let result = match direction {
            Direction::Inbound => model.sync_models(models),
            Direction::Outbound => Model::sync_to_xmp(model.as_ref(), models),
        };
        models.restore(index, model);
        if let Err(err) = result {
            let err = err.in_namespace(prefix);
            warn!("{:?} sync failed: {}", direction, err);
            report.errors.push(err);
        }
    }
    report
}

/// Pull derived values into every model
pub(crate) fn sync_models(models: &mut ModelSet) -> SyncReport {
    run(models, Direction::Inbound)
}

/// Push every model's values toward the base namespaces
pub(crate) fn sync_to_xmp(models: &mut ModelSet) -> SyncReport {
    run(models, Direction::Outbound)
}

/// Inbound then outbound
pub(crate) fn sync_all(models: &mut ModelSet, inbound: bool) -> SyncReport {
    let mut report = if inbound {
        sync_models(models)
    } else {
        SyncReport::default()
    };
    report.merge(sync_to_xmp(models));
    report
}
