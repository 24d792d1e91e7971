use clap::Subcommand;

use crate::api::tracks::{self, Track, TrackItem, TrackListing, TrackResponse, WriteupResponse};
use crate::cli::catalog::writeup_lines;
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, yes_no};
use crate::query::Paging;
use crate::resolve::{EntityKind, Target};

#[derive(Subcommand)]
pub enum TracksAction {
    /// List tracks
    List(Paging),
    /// Show a track
    Info {
        /// Track ID or name
        track: Target,
    },
    /// Machines and challenges of a track, with your progress
    Items {
        /// Track ID or name
        track: Target,
    },
    /// Track writeup
    Writeup { id: u64 },
}

fn track_panel(track: &Track, id: u64) -> Vec<String> {
    build_panel(
        track.name.as_deref().unwrap_or("Track"),
        &[
            ("ID", id.to_string()),
            ("Difficulty", cell(track.difficulty.as_deref())),
            ("Creator", cell(track.creator_name())),
            ("Official", yes_no(track.official)),
            ("Items", track.items.len().to_string()),
            ("Likes", cell(track.likes.as_deref())),
            ("Enrolled", yes_no(track.enrolled)),
            ("Completed", yes_no(track.completed)),
            ("Description", cell(track.description.as_deref())),
        ],
    )
}

fn done_mark(item: &TrackItem) -> String {
    let mark = if item.complete == Some(true) { "done" } else { "-" };
    mark.to_string()
}

fn items_lines(track: &Track, id: u64) -> Vec<String> {
    let machines: Vec<Vec<String>> = track
        .items_of("machine")
        .iter()
        .map(|m| {
            vec![
                cell(m.id),
                cell(m.name.as_deref()),
                cell(m.difficulty.as_deref()),
                cell(m.os.as_deref()),
                done_mark(m),
            ]
        })
        .collect();
    let challenges: Vec<Vec<String>> = track
        .items_of("challenge")
        .iter()
        .map(|c| {
            vec![
                cell(c.id),
                cell(c.name.as_deref()),
                cell(c.difficulty.as_deref()),
                cell(c.category.as_deref()),
                done_mark(c),
            ]
        })
        .collect();

    let mut lines = build_panel(
        &format!("Track {id}: {}", cell(track.name.as_deref())),
        &[
            ("Difficulty", cell(track.difficulty.as_deref())),
            ("Machines", machines.len().to_string()),
            ("Challenges", challenges.len().to_string()),
        ],
    );
    lines.push(String::new());
    lines.extend(build_table(
        "Machines",
        &["ID", "Name", "Difficulty", "OS", "Status"],
        &machines,
    ));
    lines.push(String::new());
    lines.extend(build_table(
        "Challenges",
        &["ID", "Name", "Difficulty", "Category", "Status"],
        &challenges,
    ));
    lines
}

pub fn execute(ctx: &Context, action: TracksAction) -> Result<()> {
    match action {
        TracksAction::List(paging) => {
            let resp = tracks::list(&ctx.client, &paging)?;
            ctx.emit(resp, |listing: TrackListing| {
                let rows: Vec<Vec<String>> = listing
                    .into_items()
                    .iter()
                    .map(|t| {
                        vec![
                            cell(t.id),
                            cell(t.name.as_deref()),
                            cell(t.difficulty.as_deref()),
                            cell(t.creator_name()),
                            yes_no(t.official),
                            cell(t.likes.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Tracks (page {})", paging.page),
                    &["ID", "Name", "Difficulty", "Creator", "Official", "Likes"],
                    &rows,
                )
            })
        }
        TracksAction::Info { track } => {
            let id = ctx.resolve(&track, EntityKind::Track)?;
            let resp = tracks::info(&ctx.client, id)?;
            ctx.emit(resp, |track: TrackResponse| track_panel(&track.into_track(), id))
        }
        TracksAction::Items { track } => {
            let id = ctx.resolve(&track, EntityKind::Track)?;
            let resp = tracks::info(&ctx.client, id)?;
            ctx.emit(resp, |track: TrackResponse| items_lines(&track.into_track(), id))
        }
        TracksAction::Writeup { id } => {
            let resp = tracks::writeup(&ctx.client, id)?;
            ctx.emit(resp, |writeup: WriteupResponse| {
                writeup_lines(&format!("Writeup for track {id}"), &writeup.data)
            })
        }
    }
}
