use clap::Subcommand;

use crate::api::home::{Notice, NoticeResponse};
use crate::api::platform::{self, Feed, LabListing, NoticeListing, SearchResults, StatsResponse};
use crate::cli::home::notice_lines;
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell};

#[derive(Subcommand)]
pub enum PlatformAction {
    /// Platform announcements
    Announcements,
    /// Platform changelogs
    Changelogs,
    /// Platform notices
    Notices,
    /// Content counters
    ContentStats,
    /// Available labs
    LabList,
    /// Main navigation
    Navigation,
    /// Search machines, challenges, users and teams
    Search {
        query: String,

        /// Restrict to these result kinds
        #[arg(long)]
        tags: Option<String>,
    },
    /// Sidebar announcement
    SidebarAnnouncement,
    /// Sidebar changelog
    SidebarChangelog,
}

fn notices_table(title: &str, notices: &[Notice]) -> Vec<String> {
    let rows: Vec<Vec<String>> = notices
        .iter()
        .map(|n| {
            vec![
                cell(n.id),
                cell(n.title.as_deref()),
                date_cell(n.when()),
                cell(n.kind.as_deref()),
            ]
        })
        .collect();
    build_table(title, &["ID", "Title", "Date", "Type"], &rows)
}

fn search_lines(query: &str, results: &SearchResults) -> Vec<String> {
    let rows: Vec<Vec<String>> = results
        .hits()
        .into_iter()
        .map(|(kind, hit)| vec![kind.to_string(), cell(hit.id), cell(hit.value.as_deref())])
        .collect();
    build_table(&format!("Search results for '{query}'"), &["Kind", "ID", "Name"], &rows)
}

fn list_feed(ctx: &Context, feed: Feed, title: &str) -> Result<()> {
    let resp = platform::feed(&ctx.client, feed)?;
    ctx.emit(resp, |listing: NoticeListing| {
        notices_table(title, &listing.data.into_items())
    })
}

fn single_feed(ctx: &Context, feed: Feed, title: &str) -> Result<()> {
    let resp = platform::feed(&ctx.client, feed)?;
    ctx.emit(resp, |notice: NoticeResponse| notice_lines(title, notice.data))
}

pub fn execute(ctx: &Context, action: PlatformAction) -> Result<()> {
    match action {
        PlatformAction::Announcements => list_feed(ctx, Feed::Announcements, "Announcements"),
        PlatformAction::Changelogs => list_feed(ctx, Feed::Changelogs, "Changelogs"),
        PlatformAction::Notices => list_feed(ctx, Feed::Notices, "Notices"),
        PlatformAction::SidebarAnnouncement => {
            single_feed(ctx, Feed::SidebarAnnouncement, "Sidebar announcement")
        }
        PlatformAction::SidebarChangelog => {
            single_feed(ctx, Feed::SidebarChangelog, "Sidebar changelog")
        }
        PlatformAction::ContentStats => {
            let resp = platform::feed(&ctx.client, Feed::ContentStats)?;
            ctx.emit(resp, |stats: StatsResponse| {
                let s = stats.into_stats();
                build_panel(
                    "Content stats",
                    &[
                        ("Machines", cell(s.machines.as_deref())),
                        ("Challenges", cell(s.challenges.as_deref())),
                        ("Users", cell(s.users.as_deref())),
                        ("Teams", cell(s.teams.as_deref())),
                    ],
                )
            })
        }
        PlatformAction::LabList => {
            let resp = platform::feed(&ctx.client, Feed::Labs)?;
            ctx.emit(resp, |labs: LabListing| {
                let rows: Vec<Vec<String>> = labs
                    .data
                    .into_items()
                    .iter()
                    .map(|lab| {
                        vec![
                            cell(lab.id),
                            cell(lab.name.as_deref()),
                            cell(lab.location.as_deref()),
                            cell(lab.status.as_deref()),
                        ]
                    })
                    .collect();
                build_table("Labs", &["ID", "Name", "Location", "Status"], &rows)
            })
        }
        PlatformAction::Navigation => {
            let resp = platform::feed(&ctx.client, Feed::Navigation)?;
            ctx.emit_document(resp, "Navigation")
        }
        PlatformAction::Search { query, tags } => {
            let resp = platform::search(&ctx.client, &query, tags.as_deref())?;
            ctx.emit(resp, |results: SearchResults| search_lines(&query, &results))
        }
    }
}
