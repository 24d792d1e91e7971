use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::api::challenges::{
    self, ActivityResponse, CategoriesResponse, ChallengeInfoResponse, ChallengeListing,
    ChallengeSummary, Recommended,
};
use crate::cli::{output_path, Context};
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell, yes_no};
use crate::query::ChallengeFilters;
use crate::resolve::{EntityKind, Target};
use crate::submit::{FlagTarget, DEFAULT_CHALLENGE_DIFFICULTY};

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// List challenges
    List(ChallengeFilters),
    /// Show challenge details
    Info {
        /// Challenge name or slug
        slug: String,
    },
    /// List challenge categories
    Categories,
    /// Challenges suggested for you
    Recommended,
    /// Recent activity on a challenge
    Activity {
        /// Challenge ID or name
        target: Target,
    },
    /// Start the challenge's docker instance
    Start {
        /// Challenge ID or name
        target: Target,
    },
    /// Stop the challenge's docker instance
    Stop {
        /// Challenge ID or name
        target: Target,
    },
    /// Download the challenge files
    Download {
        /// Challenge ID or name
        target: Target,

        /// Where to write the archive
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Submit a challenge flag
    Submit(SubmitArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Flag text; read from stdin when omitted
    pub flag: Option<String>,

    /// Challenge ID or name
    #[arg(long)]
    pub target: Target,

    /// Your difficulty rating
    #[arg(
        long,
        default_value_t = DEFAULT_CHALLENGE_DIFFICULTY,
        value_parser = clap::value_parser!(u8).range(10..=100)
    )]
    pub difficulty: u8,
}

fn summary_rows(items: &[ChallengeSummary]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                cell(c.name.as_deref()),
                cell(c.category_name.as_deref()),
                cell(c.difficulty.as_deref()),
                cell(c.rating.map(|r| format!("{r:.1}"))),
                cell(c.solves),
                date_cell(c.release_date.as_deref()),
                yes_no(c.is_owned),
            ]
        })
        .collect()
}

const SUMMARY_HEADERS: [&str; 8] = [
    "ID", "Name", "Category", "Difficulty", "Rating", "Solves", "Release", "Owned",
];

pub fn execute(ctx: &Context, action: ChallengesAction) -> Result<()> {
    match action {
        ChallengesAction::List(filters) => {
            let resp = challenges::list(&ctx.client, &filters)?;
            ctx.emit(resp, |listing: ChallengeListing| {
                build_table(
                    "Challenges",
                    &SUMMARY_HEADERS,
                    &summary_rows(&listing.data.into_items()),
                )
            })
        }
        ChallengesAction::Info { slug } => {
            let resp = challenges::info(&ctx.client, &slug)?;
            ctx.emit(resp, |info: ChallengeInfoResponse| {
                let c = info.challenge;
                build_panel(
                    c.name.as_deref().unwrap_or(&slug),
                    &[
                        ("ID", c.id.to_string()),
                        ("Category", cell(c.category_name.as_deref())),
                        ("Difficulty", cell(c.difficulty.as_deref())),
                        ("Points", cell(c.points.as_deref())),
                        ("Solves", cell(c.solves)),
                        ("Retired", yes_no(c.retired)),
                        ("Files", yes_no(c.download)),
                        ("Docker", yes_no(c.docker)),
                        ("Description", cell(c.description.as_deref())),
                    ],
                )
            })
        }
        ChallengesAction::Categories => {
            let resp = challenges::categories(&ctx.client)?;
            ctx.emit(resp, |categories: CategoriesResponse| {
                let rows: Vec<Vec<String>> = categories
                    .data
                    .iter()
                    .map(|c| vec![c.id.to_string(), cell(c.name.as_deref())])
                    .collect();
                build_table("Challenge categories", &["ID", "Name"], &rows)
            })
        }
        ChallengesAction::Recommended => {
            let resp = challenges::recommended(&ctx.client)?;
            ctx.emit(resp, |cards: Recommended| {
                build_table(
                    "Recommended challenges",
                    &SUMMARY_HEADERS,
                    &summary_rows(&cards.into_cards()),
                )
            })
        }
        ChallengesAction::Activity { target } => {
            let id = ctx.resolve(&target, EntityKind::Challenge)?;
            let resp = challenges::activity(&ctx.client, id)?;
            ctx.emit(resp, |activity: ActivityResponse| {
                let rows: Vec<Vec<String>> = activity
                    .info
                    .activity
                    .iter()
                    .map(|a| {
                        vec![
                            cell(a.subject()),
                            cell(a.kind.as_deref()),
                            date_cell(a.when()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Activity for challenge {id}"),
                    &["User", "Type", "Date"],
                    &rows,
                )
            })
        }
        ChallengesAction::Start { target } => {
            let id = ctx.resolve(&target, EntityKind::Challenge)?;
            let resp = challenges::start(&ctx.client, id)?;
            ctx.emit_message(resp, &format!("Started challenge {id}"))
        }
        ChallengesAction::Stop { target } => {
            let id = ctx.resolve(&target, EntityKind::Challenge)?;
            let resp = challenges::stop(&ctx.client, id)?;
            ctx.emit_message(resp, &format!("Stopped challenge {id}"))
        }
        ChallengesAction::Download { target, output } => {
            let id = ctx.resolve(&target, EntityKind::Challenge)?;
            let path = output_path(output, &format!("challenge_{id}.zip"));
            ctx.download(&format!("Downloading challenge {id}"), &path, |client| {
                challenges::download(client, id)
            })
        }
        ChallengesAction::Submit(args) => ctx.submit(
            FlagTarget::Challenge {
                target: args.target,
                difficulty: args.difficulty,
            },
            args.flag.as_deref(),
        ),
    }
}
