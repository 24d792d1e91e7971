use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::api::sherlocks::{
    self, CategoriesResponse, InfoResponse, SherlockListing, TasksResponse,
};
use crate::cli::{output_path, Context};
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell, truncate, yes_no};
use crate::query::SherlockFilters;
use crate::resolve::{EntityKind, Target};
use crate::submit::FlagTarget;

#[derive(Subcommand)]
pub enum SherlocksAction {
    /// List sherlocks
    List(SherlockFilters),
    /// Show sherlock details and scenario
    Info {
        /// Sherlock name or slug
        slug: String,
    },
    /// List sherlock categories
    Categories,
    /// List the tasks of a sherlock
    Tasks {
        /// Sherlock ID or name
        target: Target,
    },
    /// Download the sherlock archive
    Download {
        /// Sherlock ID or name
        target: Target,

        /// Where to write the archive
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Submit the answer to one task
    Submit(SubmitArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Answer text; read from stdin when omitted
    pub flag: Option<String>,

    /// Sherlock ID or name
    #[arg(long)]
    pub target: Target,

    /// Task ID (see `sherlocks tasks`)
    #[arg(long)]
    pub task: u64,
}

pub fn execute(ctx: &Context, action: SherlocksAction) -> Result<()> {
    match action {
        SherlocksAction::List(filters) => {
            let resp = sherlocks::list(&ctx.client, &filters)?;
            ctx.emit(resp, |listing: SherlockListing| {
                let rows: Vec<Vec<String>> = listing
                    .data
                    .into_items()
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            cell(s.name.as_deref()),
                            cell(s.category_name.as_deref()),
                            cell(s.difficulty.as_deref()),
                            cell(s.rating.map(|r| format!("{r:.1}"))),
                            cell(s.solves),
                            cell(s.state.as_deref()),
                            date_cell(s.release_date.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    "Sherlocks",
                    &["ID", "Name", "Category", "Difficulty", "Rating", "Solves", "State", "Release"],
                    &rows,
                )
            })
        }
        SherlocksAction::Info { slug } => {
            let resp = sherlocks::info(&ctx.client, &slug)?;
            ctx.emit(resp, |info: InfoResponse| {
                let s = info.data;
                build_panel(
                    s.name.as_deref().unwrap_or(&slug),
                    &[
                        ("ID", s.id.to_string()),
                        ("Category", cell(s.category_name.as_deref())),
                        ("Difficulty", cell(s.difficulty.as_deref())),
                        ("State", cell(s.state.as_deref())),
                        ("Release", date_cell(s.release_date.as_deref())),
                        ("Description", cell(s.description.as_deref())),
                        ("Scenario", cell(s.scenario.as_deref())),
                    ],
                )
            })
        }
        SherlocksAction::Categories => {
            let resp = sherlocks::categories(&ctx.client)?;
            ctx.emit(resp, |categories: CategoriesResponse| {
                let rows: Vec<Vec<String>> = categories
                    .data
                    .iter()
                    .map(|c| vec![c.id.to_string(), cell(c.name.as_deref())])
                    .collect();
                build_table("Sherlock categories", &["ID", "Name"], &rows)
            })
        }
        SherlocksAction::Tasks { target } => {
            let id = ctx.resolve(&target, EntityKind::Sherlock)?;
            let resp = sherlocks::tasks(&ctx.client, id)?;
            ctx.emit(resp, |tasks: TasksResponse| {
                let rows: Vec<Vec<String>> = tasks
                    .data
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            cell(t.title.as_deref()),
                            cell(t.description.as_deref().map(|d| truncate(d, 50))),
                            yes_no(t.completed),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Tasks for sherlock {id}"),
                    &["ID", "Title", "Description", "Done"],
                    &rows,
                )
            })
        }
        SherlocksAction::Download { target, output } => {
            let id = ctx.resolve(&target, EntityKind::Sherlock)?;
            let path = output_path(output, &format!("sherlock_{id}.zip"));
            ctx.download(&format!("Downloading sherlock {id}"), &path, |client| {
                sherlocks::download(client, id)
            })
        }
        SherlocksAction::Submit(args) => ctx.submit(
            FlagTarget::Sherlock {
                target: args.target,
                task: args.task,
            },
            args.flag.as_deref(),
        ),
    }
}
