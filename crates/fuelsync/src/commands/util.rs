//! Shared helpers for command handlers.

use std::sync::Arc;

use fuelsync_core::{
    CollectionSnapshot, DataSource, EntityId, EntityKind, EntityManager, FilterValue,
    MutationOutcome, NotificationLevel,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, StderrSink};

/// Stderr notice writer configured from the global flags.
pub fn notices(global: &GlobalOpts) -> StderrSink {
    StderrSink::new(output::should_color(&global.color), global.quiet)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Turn optional filter flags into filter changes. Absent flags leave the
/// key at `ALL`; `ALL` in any case clears it explicitly.
pub fn filter_changes<'a>(flags: &[(&'a str, Option<&String>)]) -> Vec<(&'a str, FilterValue)> {
    flags
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, FilterValue::parse(v))))
        .collect()
}

/// Apply `changes` and fetch. A remote failure that fell back to local
/// data becomes a warning; serving offline data is announced once.
pub async fn load_collection<T: EntityKind>(
    manager: &EntityManager<T>,
    changes: Vec<(&str, FilterValue)>,
    global: &GlobalOpts,
) -> Result<Arc<CollectionSnapshot<T>>, CliError> {
    let filters = T::default_filters().merged(changes);
    manager.store().set_filters(&filters);
    tracing::debug!(resource = T::RESOURCE, filters = %filters, "loading collection");

    let outcome = manager.refresh().await;
    let notices = notices(global);

    match (&outcome.error, outcome.source()) {
        (Some(err), DataSource::Fallback) => {
            notices.emit(
                NotificationLevel::Warning,
                "Showing offline data",
                err.user_message(),
            );
        }
        (Some(err), _) => return Err(CliError::from_api(err.clone(), T::RESOURCE)),
        (None, DataSource::Fallback) => {
            notices.emit(
                NotificationLevel::Info,
                "Offline",
                "backend unreachable, showing built-in data",
            );
        }
        (None, _) => {}
    }

    Ok(outcome.snapshot)
}

/// Find one record by id in the unfiltered collection.
pub async fn find<T: EntityKind>(
    manager: &EntityManager<T>,
    id: &str,
    global: &GlobalOpts,
) -> Result<T, CliError> {
    let snapshot = load_collection(manager, Vec::new(), global).await?;
    snapshot
        .get(&EntityId::from(id))
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: T::LABEL.to_lowercase(),
            identifier: id.into(),
            list_command: format!("{} list", T::RESOURCE),
        })
}

/// Translate a mutation outcome into the affected record, if any.
pub fn applied<T: EntityKind>(outcome: MutationOutcome<T>) -> Result<Option<T>, CliError> {
    match outcome {
        MutationOutcome::Applied { source, entity } => {
            tracing::debug!(resource = T::RESOURCE, %source, "mutation applied");
            Ok(entity)
        }
        MutationOutcome::Busy => Err(CliError::Busy),
        MutationOutcome::Failed(err) => Err(CliError::from_api(err, T::RESOURCE)),
    }
}

/// Render the record a mutation returned, when it returned one.
pub fn print_entity<T: EntityKind>(
    entity: Option<&T>,
    global: &GlobalOpts,
    detail_fn: impl Fn(&T) -> String,
) -> Result<(), CliError> {
    if let Some(entity) = entity {
        let out = output::render_single(&global.output, entity, detail_fn, |e| e.id().to_string())?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

/// Join optional display text, using `-` when absent.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => "-".into(),
    }
}
