//! `tb voice`: the open "voice of the base" inbox.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use talkboard_core::engine::VoiceAffordances;
use talkboard_core::engine::access::voice_affordances;
use talkboard_core::model::{NewVoiceMessage, VoiceMessage};
use talkboard_core::store::Collection;

use crate::cmd::{board_failure, confirm_delete, reported, truncate};
use crate::output::{OutputMode, pretty_section, render, render_success};
use crate::project::Project;
use crate::validate::validate_record_id;

#[derive(Subcommand, Debug)]
pub enum VoiceCommand {
    #[command(
        about = "Send a message to the board (no sign-in needed)",
        after_help = "EXAMPLES:\n    # Anonymous\n    tb voice send \"The night shift needs a rest room\"\n\n    # Signed with a name\n    tb voice send --name Rita \"Thanks for the lockers\""
    )]
    Send(SendArgs),

    #[command(
        about = "Review received messages, newest first",
        after_help = "EXAMPLES:\n    tb voice list --unread"
    )]
    List(ListArgs),

    #[command(about = "Flip a message between read and unread")]
    Toggle(IdArgs),

    #[command(about = "Permanently delete a message")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message text.
    pub body: String,

    /// Sender name; left out, the message is anonymous.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only messages not yet marked read.
    #[arg(long)]
    pub unread: bool,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct MessageRow {
    #[serde(flatten)]
    message: VoiceMessage,
    affordances: VoiceAffordances,
}

/// Dispatch a `voice` subcommand.
///
/// # Errors
///
/// Returns an error after rendering it when the operation fails.
pub fn run_voice(
    command: &VoiceCommand,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let VoiceCommand::Toggle(IdArgs { id }) | VoiceCommand::Delete(DeleteArgs { id, .. }) =
        command
    {
        validate_record_id(Collection::VoiceMessages, id)
            .map_err(|e| reported(output, e.to_cli_error()))?;
    }

    let project = Project::open(project_root, output)?;
    let caller = project.caller();
    let controls = voice_affordances(caller.capability());
    let mut board = project.into_board();

    match command {
        VoiceCommand::Send(args) => {
            let message = board
                .submit_voice(NewVoiceMessage::new(args.name.as_deref(), &args.body))
                .map_err(|e| board_failure(output, &e))?;
            render(output, &message, |m, w| {
                if quiet {
                    return Ok(());
                }
                if output.is_pretty() {
                    writeln!(w, "✓ Message sent. Thank you, {}.", m.sender_name)
                } else {
                    writeln!(w, "{}", m.id)
                }
            })
        }
        VoiceCommand::List(args) => {
            let rows: Vec<MessageRow> = board
                .list_voice_or_empty(&caller)
                .map_err(|e| board_failure(output, &e))?
                .into_iter()
                .filter(|m| !args.unread || !m.read)
                .map(|message| MessageRow {
                    message,
                    affordances: controls,
                })
                .collect();
            render(output, &rows, |rows, w| write_list(w, output, rows))
        }
        VoiceCommand::Toggle(IdArgs { id }) => {
            let message = board
                .toggle_read(&caller, id)
                .map_err(|e| board_failure(output, &e))?;
            let state = if message.read { "read" } else { "unread" };
            render(output, &message, |m, w| {
                if quiet {
                    return Ok(());
                }
                writeln!(w, "✓ {} marked {state}", m.id)
            })
        }
        VoiceCommand::Delete(args) => {
            if caller.capability().can_review_voice()
                && !args.force
                && !confirm_delete("message", &args.id, "voice message")?
            {
                anyhow::bail!("deletion of '{}' cancelled", args.id);
            }
            board
                .delete_voice(&caller, &args.id)
                .map_err(|e| board_failure(output, &e))?;
            render_success(output, quiet, &format!("deleted {}", args.id))
        }
    }
}

fn write_list(w: &mut dyn Write, output: OutputMode, rows: &[MessageRow]) -> io::Result<()> {
    if output.is_pretty() {
        let unread = rows.iter().filter(|r| !r.message.read).count();
        pretty_section(
            w,
            &format!("Voice of the base ({} messages, {unread} unread)", rows.len()),
        )?;
        if rows.is_empty() {
            return writeln!(w, "No messages.");
        }
        for row in rows {
            let m = &row.message;
            let marker = if m.read { " " } else { "●" };
            writeln!(
                w,
                "{marker} {}  {}  {}",
                m.id,
                m.sender_name,
                m.created_at.format("%Y-%m-%d %H:%M")
            )?;
            writeln!(w, "  {}", truncate(&m.body, 72))?;
        }
        return Ok(());
    }

    for row in rows {
        let m = &row.message;
        writeln!(
            w,
            "{}  {}  {}  {}",
            m.id,
            if m.read { "read" } else { "unread" },
            m.sender_name,
            truncate(&m.body, 60)
        )?;
    }
    Ok(())
}
