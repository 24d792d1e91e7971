use clap::Subcommand;

use crate::api::universities::{
    self, ActivityResponse, Board, MembersResponse, OwnStatsResponse, ProfileResponse,
    University, UniversityListing,
};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell};
use crate::query::Paging;

#[derive(Subcommand)]
pub enum UniversitiesAction {
    /// List all universities
    List(Paging),
    /// University ranking
    Rankings(Paging),
    /// Recently created universities
    New(Paging),
    /// Show a university
    Profile { university_id: u64 },
    /// Members of a university
    Members { university_id: u64 },
    /// Activity statistics of a university
    Stats { university_id: u64 },
    /// University owns of one user
    UserStats { user_id: u64 },
}

fn listing_lines(board: Board, page: u32, universities: &[University]) -> Vec<String> {
    match board {
        Board::Top => {
            let rows: Vec<Vec<String>> = universities
                .iter()
                .map(|u| {
                    vec![
                        cell(u.rank.as_deref()),
                        cell(u.name.as_deref()),
                        cell(u.country.as_deref()),
                        cell(u.points.as_deref()),
                        cell(u.users_count.as_deref()),
                    ]
                })
                .collect();
            build_table(
                &format!("University rankings (page {page})"),
                &["Rank", "Name", "Country", "Points", "Users"],
                &rows,
            )
        }
        Board::All | Board::New => {
            let rows: Vec<Vec<String>> = universities
                .iter()
                .map(|u| {
                    vec![
                        cell(u.id),
                        cell(u.name.as_deref()),
                        cell(u.country.as_deref()),
                        cell(u.users_count.as_deref()),
                        cell(u.respected_by_count.as_deref()),
                        date_cell(u.created_at.as_deref()),
                    ]
                })
                .collect();
            let title = match board {
                Board::New => format!("New universities (page {page})"),
                _ => format!("Universities (page {page})"),
            };
            build_table(
                &title,
                &["ID", "Name", "Country", "Users", "Respected", "Created"],
                &rows,
            )
        }
    }
}

fn show_board(ctx: &Context, board: Board, paging: &Paging) -> Result<()> {
    let resp = universities::list(&ctx.client, board, paging)?;
    ctx.emit(resp, |listing: UniversityListing| {
        listing_lines(board, paging.page, &listing.data.into_items())
    })
}

pub fn execute(ctx: &Context, action: UniversitiesAction) -> Result<()> {
    match action {
        UniversitiesAction::List(paging) => show_board(ctx, Board::All, &paging),
        UniversitiesAction::Rankings(paging) => show_board(ctx, Board::Top, &paging),
        UniversitiesAction::New(paging) => show_board(ctx, Board::New, &paging),
        UniversitiesAction::Profile { university_id } => {
            let resp = universities::profile(&ctx.client, university_id)?;
            ctx.emit(resp, |profile: ProfileResponse| {
                let u = profile.data;
                build_panel(
                    u.name.as_deref().unwrap_or("University"),
                    &[
                        ("ID", university_id.to_string()),
                        ("Country", cell(u.country.as_deref())),
                        ("Users", cell(u.users_count.as_deref())),
                        ("Respected", cell(u.respected_by_count.as_deref())),
                        ("Created", date_cell(u.created_at.as_deref())),
                    ],
                )
            })
        }
        UniversitiesAction::Members { university_id } => {
            let resp = universities::members(&ctx.client, university_id)?;
            ctx.emit(resp, |members: MembersResponse| {
                let rows: Vec<Vec<String>> = members
                    .data
                    .iter()
                    .map(|m| {
                        vec![
                            cell(m.id),
                            cell(m.name.as_deref()),
                            cell(m.rank.as_deref()),
                            cell(m.points.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Members of university {university_id}"),
                    &["ID", "Name", "Rank", "Points"],
                    &rows,
                )
            })
        }
        UniversitiesAction::Stats { university_id } => {
            let resp = universities::activity(&ctx.client, university_id)?;
            ctx.emit(resp, |stats: ActivityResponse| {
                build_panel(
                    &format!("University {university_id}"),
                    &[
                        ("Activity", cell(stats.data.activity_count.as_deref())),
                        ("Last activity", date_cell(stats.data.last_activity.as_deref())),
                    ],
                )
            })
        }
        UniversitiesAction::UserStats { user_id } => {
            let resp = universities::user_owns(&ctx.client, user_id)?;
            ctx.emit(resp, |stats: OwnStatsResponse| {
                build_panel(
                    &format!("University owns of user {user_id}"),
                    &[
                        ("Total owns", cell(stats.data.total_owns.as_deref())),
                        ("Machine owns", cell(stats.data.machine_owns.as_deref())),
                        ("Challenge owns", cell(stats.data.challenge_owns.as_deref())),
                    ],
                )
            })
        }
    }
}
