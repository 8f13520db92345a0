//! Document merge
//!
//! Models the host lacks are copied whole (when the mode creates values).
//! Models present on both sides are merged value by value through the path
//! engine, so the same create/replace rules apply as for single writes.

use super::path::{set_value, PathValue, SetFlags};
use super::ModelSet;
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::Navigable;
use crate::core::namespace::Registry;
use log::{debug, trace};

/// Merge `source` into `host`
///
/// `flags` is `MERGE` (create or overwrite), `CREATE` (only add missing
/// values) or `REPLACE` (only overwrite existing values). Conflicts raised by
/// the restricted modes are skipped; any other error aborts the merge.
pub(crate) fn merge_models(
    host: &mut ModelSet,
    registry: &Registry,
    source: &ModelSet,
    flags: SetFlags,
) -> XmpResult<()> {
    let flags = flags.effective();
    if flags.intersects(SetFlags::APPEND | SetFlags::DELETE) {
        return Err(XmpError::BadParam(format!(
            "unsupported merge mode {:?}",
            flags
        )));
    }

    for model in source.iter() {
        let prefix = model.namespace();
        if host.find(prefix).is_none() {
            if flags.contains(SetFlags::CREATE) {
                debug!("merge: copying model '{}'", prefix);
                host.add(model.clone_model());
            }
            continue;
        }

        let mut entries = Vec::new();
        Navigable::list(model, "", &mut entries).map_err(|e| e.in_namespace(prefix))?;
        for (path, value) in entries {
            let value = PathValue::new(path, value)
                .with_namespace(prefix)
                .with_flags(flags);
            match set_value(host, registry, &value) {
                Ok(()) => {}
                Err(err) if err.is_conflict() && flags != SetFlags::MERGE => {
                    trace!("merge: skipping {}: {}", value.path, err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    if flags.contains(SetFlags::CREATE) {
        for node in source.unknown() {
            if !host.unknown().contains(node) {
                host.unknown_mut().push(node.clone());
            }
        }
    }
    Ok(())
}
