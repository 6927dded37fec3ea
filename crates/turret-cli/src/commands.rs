//! Subcommand implementations
//!
//! Every command opens its own session against the backend file, does its
//! work and writes a report to `out`.

use crate::backend::JsonFileBackend;
use crate::edits::{form_state, Edit};
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use turret_core::{
    Collaborators, EditorConfig, EditorError, LoggingObserver, SettingsSession, Subject,
    SubjectOptions, UlidGenerator,
};
use turret_form::RenderedForm;
use turret_model::{OwnerId, SettingCategory, SettingDiff};
use turret_schema::{SchemaLoader, SchemaStore, ViewMode};

/// What every session-based command needs
#[derive(Debug, Clone)]
pub struct SessionArgs {
    /// Editor configuration
    pub config: EditorConfig,
    /// Backend file
    pub data: PathBuf,
    /// Subject profile
    pub subject: OwnerId,
    /// Subject category
    pub category: SettingCategory,
    /// Group to select; the first visible one otherwise
    pub group: Option<String>,
    /// View mode
    pub view: ViewMode,
    /// Subject options
    pub options: SubjectOptions,
}

/// Open a session for `args`
pub fn open_session(args: &SessionArgs) -> anyhow::Result<SettingsSession> {
    let backend = Arc::new(JsonFileBackend::open(&args.data)?);
    let schemas = SchemaStore::new(&args.config.schema_dir)
        .with_cache_capacity(args.config.schema_cache_capacity);
    let collaborators = Collaborators {
        schemas: Arc::new(schemas),
        ids: Arc::new(UlidGenerator::starting_after(backend.max_version())),
        persistence: backend.clone(),
        ownership: backend,
    };

    let subject = Subject::new(args.subject.clone(), args.category).with_options(args.options);
    let mut session = SettingsSession::open(args.config.clone(), subject, collaborators)
        .with_context(|| format!("opening {} settings of {}", args.category, args.subject))?
        .with_observer(Arc::new(LoggingObserver));
    session.set_view(args.view);
    if let Some(group) = &args.group {
        session.select_group(group, None)?;
    }
    Ok(session)
}

/// List the groups offered to the subject
pub fn groups(args: &SessionArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let session = open_session(args)?;
    for group in session.groups()? {
        writeln!(out, "{:<24} {:>3} settings", group.name, group.setting_count)?;
    }
    Ok(())
}

/// Render the selected group
pub fn render(args: &SessionArgs, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let session = open_session(args)?;
    let form = session.render()?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &form)?;
        writeln!(out)?;
    } else {
        write_form(&form, out)?;
    }
    Ok(())
}

/// Reconcile edits without saving and report the changes
pub fn apply(args: &SessionArgs, edits: &[Edit], out: &mut impl Write) -> anyhow::Result<SettingDiff> {
    let mut session = open_session(args)?;
    let state = form_state(&mut session, edits)?;
    session.apply(&state, &turret_core::ReconcileTrigger::Save)?;
    let pending = session.values()?.pending_diff();
    write_diff(&pending, out)?;
    Ok(pending)
}

/// Validate, reconcile and commit edits
pub fn save(args: &SessionArgs, edits: &[Edit], out: &mut impl Write) -> anyhow::Result<()> {
    let mut session = open_session(args)?;
    let state = form_state(&mut session, edits)?;
    match session.save(&state) {
        Ok(outcome) => {
            write_diff(&outcome.diff, out)?;
            writeln!(out, "saved {} at {}", args.subject, outcome.version)?;
            Ok(())
        }
        Err(err @ EditorError::ValidationFailed { .. }) => {
            for violation in err.violations() {
                writeln!(out, "invalid {}", violation)?;
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Parse a schema file and summarize it
pub fn check_schema(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no file name", path.display()))?;

    let schema = SchemaStore::new(dir)
        .load_schema(name)
        .with_context(|| format!("checking {}", path.display()))?;
    writeln!(
        out,
        "{}: {} categories, {} settings",
        schema.document,
        schema.categories.len(),
        schema.setting_count()
    )?;
    for category in &schema.categories {
        for group in &category.groups {
            writeln!(
                out,
                "  {}/{}: {} settings",
                category.name,
                group.name,
                group.settings.len()
            )?;
        }
    }
    Ok(())
}

fn write_form(form: &RenderedForm, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "{} / {} ({:?}){}",
        form.category,
        form.group,
        form.view,
        if form.read_only { " read-only" } else { "" }
    )?;
    for setting in &form.settings {
        let mark = if setting.available { "[x]" } else { "[ ]" };
        writeln!(
            out,
            "{} {:<24} {:<20} {}",
            mark,
            setting.schema.key,
            setting.control.value().unwrap_or("-"),
            setting.schema.friendly_name
        )?;
        if let Some(result) = &setting.inherited {
            for entry in &result.entries {
                writeln!(out, "      inherited from {}: {}", entry.source_label, entry.value)?;
            }
            if result.conflict {
                writeln!(out, "      ! conflicting sources")?;
            }
        }
    }
    Ok(())
}

fn write_diff(diff: &SettingDiff, out: &mut impl Write) -> std::io::Result<()> {
    if diff.is_empty() {
        return writeln!(out, "no changes");
    }
    for (operation, value) in diff.operations() {
        writeln!(
            out,
            "{:<6} {} = {}",
            operation.to_string(),
            value.key(),
            value.value()
        )?;
    }
    Ok(())
}
