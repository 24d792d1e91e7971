use clap::Subcommand;

use crate::api::badges::{self, BadgeListing};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_table, cell, truncate};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List all badges
    List,
}

pub fn execute(ctx: &Context, action: BadgesAction) -> Result<()> {
    match action {
        BadgesAction::List => {
            let resp = badges::list(&ctx.client)?;
            ctx.emit(resp, |listing: BadgeListing| {
                let rows: Vec<Vec<String>> = listing
                    .data
                    .into_items()
                    .iter()
                    .map(|b| {
                        vec![
                            cell(b.id),
                            cell(b.name.as_deref()),
                            cell(b.description.as_deref().map(|d| truncate(d, 60))),
                            cell(b.icon.as_deref()),
                        ]
                    })
                    .collect();
                build_table("Badges", &["ID", "Name", "Description", "Icon"], &rows)
            })
        }
    }
}
