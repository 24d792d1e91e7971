use clap::Subcommand;

use crate::api::season::{
    self, ActiveMachineResponse, Leaderboard, LeaderboardResponse, MachinesResponse, RankResponse,
    SeasonListing,
};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell, yes_no};

#[derive(Subcommand)]
pub enum SeasonAction {
    /// List seasons
    List,
    /// Machines of the current season
    Machines,
    /// The season machine currently live
    ActiveMachine,
    /// Your rank in a season
    Rank {
        /// Season ID (see `season list`)
        season_id: u64,
    },
    /// Season leaderboard
    Leaderboard {
        #[arg(value_enum)]
        board: Leaderboard,

        /// Season ID; the current season when omitted
        #[arg(long)]
        season: Option<u64>,
    },
}

pub fn execute(ctx: &Context, action: SeasonAction) -> Result<()> {
    match action {
        SeasonAction::List => {
            let resp = season::list(&ctx.client)?;
            ctx.emit(resp, |seasons: SeasonListing| {
                let rows: Vec<Vec<String>> = seasons
                    .data
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            cell(s.name.as_deref()),
                            cell(s.state.as_deref()),
                            date_cell(s.start_date.as_deref()),
                            date_cell(s.end_date.as_deref()),
                            yes_no(s.active),
                        ]
                    })
                    .collect();
                build_table(
                    "Seasons",
                    &["ID", "Name", "State", "Start", "End", "Active"],
                    &rows,
                )
            })
        }
        SeasonAction::Machines => {
            let resp = season::machines(&ctx.client)?;
            ctx.emit(resp, |machines: MachinesResponse| {
                let rows: Vec<Vec<String>> = machines
                    .data
                    .iter()
                    .map(|m| {
                        vec![
                            m.id.to_string(),
                            cell(m.name.as_deref()),
                            cell(m.os.as_deref()),
                            cell(m.difficulty_text.as_deref()),
                            date_cell(m.release_time.as_deref()),
                            yes_no(m.active),
                        ]
                    })
                    .collect();
                build_table(
                    "Season machines",
                    &["ID", "Name", "OS", "Difficulty", "Release", "Active"],
                    &rows,
                )
            })
        }
        SeasonAction::ActiveMachine => {
            let resp = season::active_machine(&ctx.client)?;
            ctx.emit(resp, |active: ActiveMachineResponse| match active.data {
                None => vec!["No season machine is live.".to_string()],
                Some(m) => build_panel(
                    m.name.as_deref().unwrap_or("Season machine"),
                    &[
                        ("ID", m.id.to_string()),
                        ("OS", cell(m.os.as_deref())),
                        ("Difficulty", cell(m.difficulty_text.as_deref())),
                        ("Release", date_cell(m.release_time.as_deref())),
                    ],
                ),
            })
        }
        SeasonAction::Rank { season_id } => {
            let resp = season::rank(&ctx.client, season_id)?;
            ctx.emit(resp, |rank: RankResponse| {
                let r = rank.data;
                build_panel(
                    &format!("Season {season_id} rank"),
                    &[
                        ("Rank", cell(r.rank.as_deref())),
                        ("League", cell(r.league.as_deref())),
                        ("Points", cell(r.total_season_points.as_deref())),
                        ("Players", cell(r.total_ranks.as_deref())),
                    ],
                )
            })
        }
        SeasonAction::Leaderboard { board, season } => {
            let resp = season::leaderboard(&ctx.client, board, season)?;
            ctx.emit(resp, |leaderboard: LeaderboardResponse| {
                let rows: Vec<Vec<String>> = leaderboard
                    .data
                    .into_items()
                    .iter()
                    .map(|e| {
                        vec![
                            cell(e.rank.as_deref()),
                            cell(e.name.as_deref()),
                            cell(e.points.as_deref()),
                            cell(e.flags.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    "Season leaderboard",
                    &["Rank", "Name", "Points", "Flags"],
                    &rows,
                )
            })
        }
    }
}
