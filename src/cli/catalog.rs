use clap::Subcommand;

use crate::api::catalog::{
    self, ActivityResponse, Catalog, CatalogEntry, CatalogListing, ChangelogResponse, Column,
    InfoResponse, WriteupResponse,
};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell};
use crate::query::Paging;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List entries
    List(Paging),
    /// Show one entry
    Info {
        /// Slug or name
        slug: String,
    },
    /// Entries suggested for you
    Recommended,
    /// Recent activity
    Activity { id: u64 },
    /// Change history
    Changelog { id: u64 },
    /// Community writeup
    Writeup { id: u64 },
    /// Official writeup
    WriteupOfficial { id: u64 },
}

/// Fortresses have no changelog or official writeup.
#[derive(Subcommand)]
pub enum FortressAction {
    /// List fortresses
    List(Paging),
    /// Show one fortress
    Info { slug: String },
    /// Fortresses suggested for you
    Recommended,
    /// Recent activity
    Activity { id: u64 },
    /// Fortress writeup
    Writeup { id: u64 },
}

impl From<FortressAction> for CatalogAction {
    fn from(action: FortressAction) -> Self {
        match action {
            FortressAction::List(paging) => CatalogAction::List(paging),
            FortressAction::Info { slug } => CatalogAction::Info { slug },
            FortressAction::Recommended => CatalogAction::Recommended,
            FortressAction::Activity { id } => CatalogAction::Activity { id },
            FortressAction::Writeup { id } => CatalogAction::Writeup { id },
        }
    }
}

#[derive(Subcommand)]
pub enum StartingPointAction {
    /// List Starting Point machines
    List(Paging),
    /// Show one Starting Point machine
    Info { slug: String },
    /// Recent activity
    Activity { id: u64 },
    /// Machine writeup
    Writeup { id: u64 },
}

impl From<StartingPointAction> for CatalogAction {
    fn from(action: StartingPointAction) -> Self {
        match action {
            StartingPointAction::List(paging) => CatalogAction::List(paging),
            StartingPointAction::Info { slug } => CatalogAction::Info { slug },
            StartingPointAction::Activity { id } => CatalogAction::Activity { id },
            StartingPointAction::Writeup { id } => CatalogAction::Writeup { id },
        }
    }
}

fn entries_table(title: &str, catalog: Catalog, entries: &[CatalogEntry]) -> Vec<String> {
    let columns = catalog.columns();
    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            columns
                .iter()
                .map(|&column| match column {
                    Column::StartDate => date_cell(entry.field(column).as_deref()),
                    _ => cell(entry.field(column)),
                })
                .collect()
        })
        .collect();
    build_table(title, &headers, &rows)
}

pub fn execute(ctx: &Context, catalog: Catalog, action: CatalogAction) -> Result<()> {
    let label = catalog.label();
    match action {
        CatalogAction::List(paging) => {
            let resp = catalog::list(&ctx.client, catalog, &paging)?;
            ctx.emit(resp, |listing: CatalogListing| {
                entries_table(
                    &format!("{label} list (page {})", paging.page),
                    catalog,
                    &listing.data.into_items(),
                )
            })
        }
        CatalogAction::Info { slug } => {
            let resp = catalog::info(&ctx.client, catalog, &slug)?;
            ctx.emit(resp, |info: InfoResponse| {
                let entry = info.data;
                let mut fields: Vec<(&str, String)> = catalog
                    .columns()
                    .iter()
                    .filter(|&&c| c != Column::Name)
                    .map(|&c| (c.header(), cell(entry.field(c))))
                    .collect();
                fields.push(("Description", cell(entry.description.as_deref())));
                build_panel(
                    &format!("{label}: {}", entry.name.as_deref().unwrap_or(&slug)),
                    &fields,
                )
            })
        }
        CatalogAction::Recommended => {
            let resp = catalog::recommended(&ctx.client, catalog)?;
            ctx.emit(resp, |listing: CatalogListing| {
                entries_table(
                    &format!("Recommended {label} entries"),
                    catalog,
                    &listing.data.into_items(),
                )
            })
        }
        CatalogAction::Activity { id } => {
            let resp = catalog::activity(&ctx.client, catalog, id)?;
            ctx.emit(resp, |activity: ActivityResponse| {
                let rows: Vec<Vec<String>> = activity
                    .data
                    .iter()
                    .map(|a| {
                        vec![
                            cell(a.user.as_deref()),
                            cell(a.kind.as_deref()),
                            date_cell(a.date.as_deref()),
                            cell(a.points.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("{label} activity ({id})"),
                    &["User", "Type", "Date", "Points"],
                    &rows,
                )
            })
        }
        CatalogAction::Changelog { id } => {
            let resp = catalog::changelog(&ctx.client, catalog, id)?;
            ctx.emit(resp, |changes: ChangelogResponse| {
                let rows: Vec<Vec<String>> = changes
                    .data
                    .iter()
                    .map(|c| vec![date_cell(c.when()), cell(c.kind.as_deref()), cell(c.text())])
                    .collect();
                build_table(
                    &format!("{label} changelog ({id})"),
                    &["Date", "Type", "Description"],
                    &rows,
                )
            })
        }
        CatalogAction::Writeup { id } => show_writeup(ctx, catalog, id, false),
        CatalogAction::WriteupOfficial { id } => show_writeup(ctx, catalog, id, true),
    }
}

fn show_writeup(ctx: &Context, catalog: Catalog, id: u64, official: bool) -> Result<()> {
    let resp = catalog::writeup(&ctx.client, catalog, id, official)?;
    let kind = if official { "Official writeup" } else { "Writeup" };
    ctx.emit(resp, |writeup: WriteupResponse| {
        writeup_lines(&format!("{kind} for {} {id}", catalog.label()), &writeup.data)
    })
}

/// Title and author as a panel, then the body text as-is.
pub fn writeup_lines(title: &str, writeup: &catalog::Writeup) -> Vec<String> {
    let mut lines = build_panel(
        title,
        &[
            ("Title", cell(writeup.title.as_deref())),
            ("Author", cell(writeup.author.as_deref())),
        ],
    );
    if let Some(content) = writeup.content.as_deref().filter(|c| !c.trim().is_empty()) {
        lines.push(String::new());
        lines.extend(content.lines().map(str::to_owned));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> CatalogEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn table_follows_catalog_columns() {
        let entries = vec![entry(
            r#"{"id":3,"name":"Zephyr","difficulty":"Intermediate","points":50,"machines_count":8}"#,
        )];
        let lines = entries_table("ProLabs", Catalog::Prolab, &entries);
        assert_eq!(
            lines[1],
            "ID  Name    Difficulty    Points  Status  Machines"
        );
        assert_eq!(lines[3], "3   Zephyr  Intermediate  50      N/A     8");
    }

    #[test]
    fn ranking_start_date_is_shortened() {
        let entries = vec![entry(
            r#"{"id":1,"name":"Q1","type":"season","start_date":"2024-01-05T00:00:00Z"}"#,
        )];
        let lines = entries_table("Rankings", Catalog::Ranking, &entries);
        assert!(lines[3].ends_with("2024-01-05"));
    }

    #[test]
    fn writeup_body_follows_panel() {
        let writeup: catalog::Writeup =
            serde_json::from_str(r#"{"title":"Walk","content":"step 1\nstep 2"}"#).unwrap();
        let lines = writeup_lines("Writeup", &writeup);
        assert_eq!(lines[1], "  Title   Walk");
        assert_eq!(lines[2], "  Author  N/A");
        assert_eq!(&lines[4..], &["step 1", "step 2"]);
    }
}
