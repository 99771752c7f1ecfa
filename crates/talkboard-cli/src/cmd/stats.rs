//! `tb stats`: dashboard counts, or the public landing summary.

use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use talkboard_core::engine::{DashboardSummary, PublicSummary, StatusCounts};
use talkboard_core::model::Lifecycle;

use crate::cmd::board_failure;
use crate::output::{OutputMode, pretty_kv, pretty_section, render};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Show the landing summary even when signed in.
    #[arg(long)]
    pub public: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
enum StatsView {
    Dashboard(DashboardSummary),
    Public(PublicSummary),
}

/// Execute `tb stats`.
///
/// # Errors
///
/// Returns an error if the board is missing or output fails.
pub fn run_stats(args: &StatsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let caller = project.caller();
    let board = project.into_board();

    let view = if args.public || !caller.capability().is_authenticated() {
        StatsView::Public(board.public_summary())
    } else {
        StatsView::Dashboard(board.summary(&caller).map_err(|e| board_failure(output, &e))?)
    };

    render(output, &view, |view, w| match view {
        StatsView::Public(summary) => write_public(w, output, summary),
        StatsView::Dashboard(summary) => write_dashboard(w, output, summary),
    })
}

fn write_public(w: &mut dyn Write, output: OutputMode, summary: &PublicSummary) -> io::Result<()> {
    if output.is_pretty() {
        pretty_section(w, "Ideas")?;
    }
    pretty_kv(w, "total", summary.total_ideas.to_string())?;
    pretty_kv(w, "in progress", summary.in_progress.to_string())?;
    pretty_kv(w, "done", summary.done.to_string())
}

fn write_counts<S: Lifecycle>(
    w: &mut dyn Write,
    output: OutputMode,
    heading: &str,
    counts: &StatusCounts<S>,
) -> io::Result<()> {
    if output.is_pretty() {
        pretty_section(w, &format!("{heading} ({})", counts.total))?;
    } else {
        pretty_kv(w, &format!("{} total", heading.to_lowercase()), counts.total.to_string())?;
    }
    for entry in &counts.by_status {
        pretty_kv(w, entry.status.label(), entry.count.to_string())?;
    }
    Ok(())
}

fn write_dashboard(
    w: &mut dyn Write,
    output: OutputMode,
    summary: &DashboardSummary,
) -> io::Result<()> {
    write_counts(w, output, "Ideas", &summary.ideas)?;
    write_counts(w, output, "Actions", &summary.actions)?;
    if output.is_pretty() {
        pretty_section(w, &format!("Voice messages ({})", summary.voice.total))?;
    } else {
        pretty_kv(w, "voice total", summary.voice.total.to_string())?;
    }
    pretty_kv(w, "read", summary.voice.read.to_string())?;
    pretty_kv(w, "unread", summary.voice.unread.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use talkboard_core::engine::stats::summarize;

    #[test]
    fn public_view_is_tagged() {
        let view = StatsView::Public(PublicSummary::from_ideas(&[]));
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["view"], "public");
        assert_eq!(json["totalIdeas"], 0);
    }

    #[test]
    fn dashboard_text_lists_every_status() {
        let summary = summarize(&[], &[], &[]);
        let mut buf = Vec::new();
        write_dashboard(&mut buf, OutputMode::Text, &summary).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        for label in ["New", "Under Review", "Planning", "In Progress", "Done", "unread"] {
            assert!(text.contains(label), "missing {label}: {text}");
        }
    }
}
