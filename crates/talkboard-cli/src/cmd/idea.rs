//! `tb idea`: suggestions raised by the membership.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use talkboard_core::engine::access::affordances;
use talkboard_core::engine::{Affordances, Capability, StatusFilter};
use talkboard_core::model::{Idea, IdeaStatus, Lifecycle, NewIdea, Priority, Theme};
use talkboard_core::store::Collection;
use talkboard_core::{BoardError, Result as BoardResult};

use crate::cmd::{board_failure, confirm_delete, needs_confirmation, reported, truncate};
use crate::output::{OutputMode, pretty_kv, pretty_section, render, render_success};
use crate::project::Project;
use crate::validate::validate_record_id;

#[derive(Subcommand, Debug)]
pub enum IdeaCommand {
    #[command(
        about = "Record a new idea",
        after_help = "EXAMPLES:\n    # Record an idea with defaults (Boarding, Medium, New)\n    tb idea add --author Ana --description \"More lockers on deck 2\"\n\n    # Pick theme, priority and starting status\n    tb idea add --author Ana --description \"Night bus\" --theme benefits --priority high --status under-review"
    )]
    Add(AddArgs),

    #[command(
        about = "List ideas, newest first",
        after_help = "EXAMPLES:\n    # Every idea\n    tb idea list\n\n    # Only ideas in progress\n    tb idea list --status in-progress --json"
    )]
    List(ListArgs),

    #[command(about = "Show one idea")]
    Show(IdArgs),

    #[command(
        about = "Move an idea one step forward",
        after_help = "EXAMPLES:\n    # New -> Under Review\n    tb idea advance id-0a1b2c3d4e under-review"
    )]
    Advance(AdvanceArgs),

    #[command(about = "Permanently delete an idea")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub description: String,

    /// boarding, safety, benefits, training, communication, other.
    #[arg(long, default_value = "boarding")]
    pub theme: String,

    /// high, medium, low.
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Starting status: new or under-review.
    #[arg(long, default_value = "new")]
    pub status: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// `all` or one status (new, under-review, in-progress, done).
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
struct IdeaRow {
    #[serde(flatten)]
    idea: Idea,
    #[serde(skip_serializing_if = "Option::is_none")]
    affordances: Option<Affordances<IdeaStatus>>,
}

impl IdeaRow {
    fn new(idea: Idea, capability: Capability) -> Self {
        let affordances = capability
            .can_mutate()
            .then(|| affordances(&idea, capability));
        Self { idea, affordances }
    }
}

fn draft(args: &AddArgs) -> BoardResult<NewIdea> {
    Ok(NewIdea::new(&args.author, &args.description)
        .with_theme(args.theme.parse::<Theme>()?)
        .with_priority(args.priority.parse::<Priority>()?)
        .with_status(args.status.parse::<IdeaStatus>()?))
}

/// Dispatch an `idea` subcommand.
///
/// # Errors
///
/// Returns an error after rendering it when the operation fails.
pub fn run_idea(
    command: &IdeaCommand,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let IdeaCommand::Show(IdArgs { id })
    | IdeaCommand::Advance(AdvanceArgs { id, .. })
    | IdeaCommand::Delete(DeleteArgs { id, .. }) = command
    {
        validate_record_id(Collection::Ideas, id)
            .map_err(|e| reported(output, e.to_cli_error()))?;
    }

    let project = Project::open(project_root, output)?;
    let caller = project.caller();
    let capability = caller.capability();
    let mut board = project.into_board();

    match command {
        IdeaCommand::Add(args) => {
            let idea = draft(args)
                .and_then(|d| board.create_idea(&caller, d))
                .map_err(|e| board_failure(output, &e))?;
            render(output, &IdeaRow::new(idea, capability), |row, w| {
                if quiet && !output.is_pretty() {
                    return writeln!(w, "{}", row.idea.id);
                }
                write_detail(w, output, row)
            })
        }
        IdeaCommand::List(args) => {
            let filter = args
                .status
                .parse::<StatusFilter<IdeaStatus>>()
                .map_err(|e| board_failure(output, &BoardError::from(e)))?;
            let rows: Vec<IdeaRow> = board
                .list_ideas_or_empty(&filter)
                .into_iter()
                .map(|idea| IdeaRow::new(idea, capability))
                .collect();
            render(output, &rows, |rows, w| write_list(w, output, &filter, rows))
        }
        IdeaCommand::Show(IdArgs { id }) => {
            let idea = board.idea(id).map_err(|e| board_failure(output, &e))?;
            render(output, &IdeaRow::new(idea, capability), |row, w| {
                write_detail(w, output, row)
            })
        }
        IdeaCommand::Advance(args) => {
            let idea = args
                .to
                .parse::<IdeaStatus>()
                .map_err(BoardError::from)
                .and_then(|target| board.advance_idea(&caller, &args.id, target))
                .map_err(|e| board_failure(output, &e))?;
            render(output, &IdeaRow::new(idea, capability), |row, w| {
                if quiet {
                    return Ok(());
                }
                writeln!(w, "✓ {} is now {}", row.idea.id, row.idea.status)
            })
        }
        IdeaCommand::Delete(args) => {
            let idea = board.idea(&args.id).map_err(|e| board_failure(output, &e))?;
            if needs_confirmation(capability, true, args.force)
                && !confirm_delete("idea", &idea.id, &truncate(&idea.description, 40))?
            {
                anyhow::bail!("deletion of '{}' cancelled", idea.id);
            }
            board
                .delete_idea(&caller, &args.id)
                .map_err(|e| board_failure(output, &e))?;
            render_success(output, quiet, &format!("deleted {}", args.id))
        }
    }
}

fn affordance_hint(aff: &Affordances<IdeaStatus>) -> String {
    let mut parts = Vec::new();
    if let Some(next) = aff.next_status {
        parts.push(format!("next={}", next.slug()));
    }
    if aff.can_delete {
        parts.push("delete".to_string());
    }
    parts.join(" ")
}

fn write_list(
    w: &mut dyn Write,
    output: OutputMode,
    filter: &StatusFilter<IdeaStatus>,
    rows: &[IdeaRow],
) -> io::Result<()> {
    if output.is_pretty() {
        pretty_section(w, &format!("Ideas ({}, filter: {filter})", rows.len()))?;
        if rows.is_empty() {
            return writeln!(w, "No ideas.");
        }
        for row in rows {
            let idea = &row.idea;
            writeln!(
                w,
                "{}  [{}]  {} · {}",
                idea.id, idea.status, idea.priority, idea.theme
            )?;
            writeln!(w, "  {}: {}", idea.author, truncate(&idea.description, 60))?;
            if let Some(aff) = &row.affordances {
                let hint = affordance_hint(aff);
                if !hint.is_empty() {
                    writeln!(w, "  {hint}")?;
                }
            }
        }
        return Ok(());
    }

    for row in rows {
        let idea = &row.idea;
        write!(
            w,
            "{}  {}  {}  {}  {}  {}",
            idea.id,
            idea.status.slug(),
            idea.priority,
            idea.theme,
            idea.author,
            truncate(&idea.description, 60)
        )?;
        if let Some(aff) = &row.affordances {
            let hint = affordance_hint(aff);
            if !hint.is_empty() {
                write!(w, "  {hint}")?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_detail(w: &mut dyn Write, output: OutputMode, row: &IdeaRow) -> io::Result<()> {
    let idea = &row.idea;
    if output.is_pretty() {
        pretty_section(w, &format!("Idea {}", idea.id))?;
    } else {
        pretty_kv(w, "id", &idea.id)?;
    }
    pretty_kv(w, "status", idea.status.label())?;
    pretty_kv(w, "author", &idea.author)?;
    pretty_kv(w, "theme", idea.theme.label())?;
    pretty_kv(w, "priority", idea.priority.label())?;
    pretty_kv(w, "created", idea.created_at.to_rfc3339())?;
    pretty_kv(w, "updated", idea.updated_at.to_rfc3339())?;
    if let Some(aff) = &row.affordances {
        let hint = affordance_hint(aff);
        if !hint.is_empty() {
            pretty_kv(w, "actions", hint)?;
        }
    }
    writeln!(w)?;
    writeln!(w, "{}", idea.description)
}
