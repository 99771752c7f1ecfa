//! `tb action`: practical work carried out by the board.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use talkboard_core::engine::access::affordances;
use talkboard_core::engine::{Affordances, Capability, StatusFilter};
use talkboard_core::model::{Action, ActionStatus, Lifecycle, NewAction};
use talkboard_core::store::Collection;
use talkboard_core::{BoardError, Result as BoardResult};

use crate::cmd::{board_failure, confirm_delete, needs_confirmation, reported, truncate};
use crate::output::{OutputMode, pretty_kv, pretty_section, render, render_success};
use crate::project::Project;
use crate::validate::validate_record_id;

#[derive(Subcommand, Debug)]
pub enum ActionCommand {
    #[command(
        about = "Plan a new action",
        after_help = "EXAMPLES:\n    # Starts today in Planning\n    tb action add --name \"Gate rally\" --owner \"Press office\" --description \"Leaflets at gate 3\"\n\n    # Explicit start date, already running\n    tb action add --name Survey --owner Board --description \"Shift survey\" --start-date 2026-03-01 --status in-progress"
    )]
    Add(AddArgs),

    #[command(
        about = "List actions, newest first",
        after_help = "EXAMPLES:\n    tb action list --status planning"
    )]
    List(ListArgs),

    #[command(about = "Show one action")]
    Show(IdArgs),

    #[command(
        about = "Move an action one step forward",
        after_help = "EXAMPLES:\n    # Planning -> In Progress\n    tb action advance ac-0a1b2c3d4e in-progress"
    )]
    Advance(AdvanceArgs),

    #[command(about = "Permanently delete a finished action")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub description: String,

    /// YYYY-MM-DD; defaults to today.
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Starting status: planning or in-progress.
    #[arg(long, default_value = "planning")]
    pub status: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// `all` or one status (planning, in-progress, done).
    #[arg(long, default_value = "all")]
    pub status: String,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct AdvanceArgs {
    pub id: String,

    /// Target status; must be the immediate successor.
    pub to: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionRow {
    #[serde(flatten)]
    action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    affordances: Option<Affordances<ActionStatus>>,
}

impl ActionRow {
    fn new(action: Action, capability: Capability) -> Self {
        let affordances = capability
            .can_mutate()
            .then(|| affordances(&action, capability));
        Self {
            action,
            affordances,
        }
    }

    fn hint(&self) -> Option<String> {
        let aff = self.affordances.as_ref()?;
        let mut parts = Vec::new();
        if let Some(next) = aff.next_status {
            parts.push(format!("next={}", next.slug()));
        }
        if aff.can_delete {
            parts.push("delete".to_string());
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn draft(args: &AddArgs) -> BoardResult<NewAction> {
    let mut draft = NewAction::new(&args.name, &args.owner, &args.description)
        .with_status(args.status.parse::<ActionStatus>()?);
    if let Some(start) = args.start_date {
        draft = draft.with_start_date(start);
    }
    Ok(draft)
}

/// Dispatch an `action` subcommand.
///
/// # Errors
///
/// Returns an error after rendering it when the operation fails.
pub fn run_action(
    command: &ActionCommand,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let ActionCommand::Show(IdArgs { id })
    | ActionCommand::Advance(AdvanceArgs { id, .. })
    | ActionCommand::Delete(DeleteArgs { id, .. }) = command
    {
        validate_record_id(Collection::Actions, id)
            .map_err(|e| reported(output, e.to_cli_error()))?;
    }

    let project = Project::open(project_root, output)?;
    let caller = project.caller();
    let capability = caller.capability();
    let mut board = project.into_board();

    match command {
        ActionCommand::Add(args) => {
            let action = draft(args)
                .and_then(|d| board.create_action(&caller, d))
                .map_err(|e| board_failure(output, &e))?;
            render(output, &ActionRow::new(action, capability), |row, w| {
                if quiet && !output.is_pretty() {
                    return writeln!(w, "{}", row.action.id);
                }
                write_detail(w, output, row)
            })
        }
        ActionCommand::List(args) => {
            let filter = args
                .status
                .parse::<StatusFilter<ActionStatus>>()
                .map_err(|e| board_failure(output, &BoardError::from(e)))?;
            let rows: Vec<ActionRow> = board
                .list_actions_or_empty(&filter)
                .into_iter()
                .map(|action| ActionRow::new(action, capability))
                .collect();
            render(output, &rows, |rows, w| write_list(w, output, &filter, rows))
        }
        ActionCommand::Show(IdArgs { id }) => {
            let action = board.action(id).map_err(|e| board_failure(output, &e))?;
            render(output, &ActionRow::new(action, capability), |row, w| {
                write_detail(w, output, row)
            })
        }
        ActionCommand::Advance(args) => {
            let action = args
                .to
                .parse::<ActionStatus>()
                .map_err(BoardError::from)
                .and_then(|target| board.advance_action(&caller, &args.id, target))
                .map_err(|e| board_failure(output, &e))?;
            render(output, &ActionRow::new(action, capability), |row, w| {
                if quiet {
                    return Ok(());
                }
                writeln!(w, "✓ {} is now {}", row.action.id, row.action.status)
            })
        }
        ActionCommand::Delete(args) => {
            let action = board
                .action(&args.id)
                .map_err(|e| board_failure(output, &e))?;
            // Policy is checked by the board; only prompt when delete is offered.
            let offered = action.status == ActionStatus::Done;
            if needs_confirmation(capability, offered, args.force)
                && !confirm_delete("action", &action.id, &action.name)?
            {
                anyhow::bail!("deletion of '{}' cancelled", action.id);
            }
            board
                .delete_action(&caller, &args.id)
                .map_err(|e| board_failure(output, &e))?;
            render_success(output, quiet, &format!("deleted {}", args.id))
        }
    }
}

fn write_list(
    w: &mut dyn Write,
    output: OutputMode,
    filter: &StatusFilter<ActionStatus>,
    rows: &[ActionRow],
) -> io::Result<()> {
    if output.is_pretty() {
        pretty_section(w, &format!("Actions ({}, filter: {filter})", rows.len()))?;
        if rows.is_empty() {
            return writeln!(w, "No actions.");
        }
        for row in rows {
            let action = &row.action;
            writeln!(
                w,
                "{}  [{}]  {}  from {}",
                action.id, action.status, action.name, action.start_date
            )?;
            writeln!(w, "  {}: {}", action.owner, truncate(&action.description, 60))?;
            if let Some(hint) = row.hint() {
                writeln!(w, "  {hint}")?;
            }
        }
        return Ok(());
    }

    for row in rows {
        let action = &row.action;
        write!(
            w,
            "{}  {}  {}  {}  {}",
            action.id,
            action.status.slug(),
            action.start_date,
            action.owner,
            action.name
        )?;
        if let Some(hint) = row.hint() {
            write!(w, "  {hint}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_detail(w: &mut dyn Write, output: OutputMode, row: &ActionRow) -> io::Result<()> {
    let action = &row.action;
    if output.is_pretty() {
        pretty_section(w, &format!("Action {}", action.id))?;
    } else {
        pretty_kv(w, "id", &action.id)?;
    }
    pretty_kv(w, "name", &action.name)?;
    pretty_kv(w, "status", action.status.label())?;
    pretty_kv(w, "owner", &action.owner)?;
    pretty_kv(w, "start", action.start_date.to_string())?;
    pretty_kv(w, "created", action.created_at.to_rfc3339())?;
    pretty_kv(w, "updated", action.updated_at.to_rfc3339())?;
    if let Some(hint) = row.hint() {
        pretty_kv(w, "actions", hint)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", action.description)
}
