use clap::Subcommand;

use crate::api::pwnbox::{self, InfoResponse, PwnboxEntry, PwnboxListing};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell};

#[derive(Subcommand)]
pub enum PwnboxAction {
    /// Your Pwnbox instance
    Info,
    /// Pwnbox instances
    List,
    /// Active terminals
    Terminals,
    /// All terminals
    TerminalsList,
}

fn instances_table(entries: &[PwnboxEntry]) -> Vec<String> {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|p| {
            vec![
                cell(p.id),
                cell(p.name.as_deref()),
                cell(p.status.as_deref()),
                cell(p.region.as_deref()),
                cell(p.ip.as_deref()),
            ]
        })
        .collect();
    build_table("Pwnbox instances", &["ID", "Name", "Status", "Region", "IP"], &rows)
}

fn terminals_table(title: &str, entries: &[PwnboxEntry]) -> Vec<String> {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|t| {
            vec![
                cell(t.id),
                cell(t.name.as_deref()),
                cell(t.status.as_deref()),
                cell(t.kind.as_deref()),
                cell(t.region.as_deref()),
                date_cell(t.created_at.as_deref()),
            ]
        })
        .collect();
    build_table(
        title,
        &["ID", "Name", "Status", "Type", "Region", "Created"],
        &rows,
    )
}

pub fn execute(ctx: &Context, action: PwnboxAction) -> Result<()> {
    match action {
        PwnboxAction::Info => {
            let resp = pwnbox::info(&ctx.client)?;
            ctx.emit(resp, |info: InfoResponse| match info.data {
                None => vec!["Pwnbox".to_string(), "No results.".to_string()],
                Some(p) => build_panel(
                    "Pwnbox",
                    &[
                        ("Status", cell(p.status.as_deref())),
                        ("Version", cell(p.version.as_deref())),
                        ("Region", cell(p.region.as_deref())),
                        ("IP", cell(p.ip.as_deref())),
                    ],
                ),
            })
        }
        PwnboxAction::List => {
            let resp = pwnbox::list(&ctx.client)?;
            ctx.emit(resp, |listing: PwnboxListing| {
                instances_table(&listing.data.into_items())
            })
        }
        PwnboxAction::Terminals => {
            let resp = pwnbox::terminals(&ctx.client)?;
            ctx.emit(resp, |listing: PwnboxListing| {
                terminals_table("Terminals", &listing.data.into_items())
            })
        }
        PwnboxAction::TerminalsList => {
            let resp = pwnbox::terminals_list(&ctx.client)?;
            ctx.emit(resp, |listing: PwnboxListing| {
                terminals_table("All terminals", &listing.data.into_items())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_rows_shorten_created_at() {
        let entry = PwnboxEntry {
            id: Some(1),
            created_at: Some("2024-02-03T04:05:06Z".into()),
            ..Default::default()
        };
        let lines = terminals_table("Terminals", &[entry]);
        assert!(lines[3].ends_with("2024-02-03"));
    }
}
