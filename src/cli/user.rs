use clap::Subcommand;

use crate::api::user::{
    self, ActivityResponse, BadgesInfo, Blood, BloodsResponse, FollowersResponse, InfoResponse,
    ProfileResponse, Progress, Social, UserProfile,
};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell, yes_no};

#[derive(Subcommand)]
pub enum UserAction {
    /// Your account
    Info,
    /// Your profile summary
    Summary,
    /// Public profile of any user
    Profile { user_id: u64 },
    /// Recent activity of any user
    Activity { user_id: u64 },
    /// Badges earned by a user
    Badges { user_id: u64 },
    /// First bloods of a user
    Bloods { user_id: u64 },
    /// Completion breakdown of a user
    Progress {
        #[arg(value_enum)]
        kind: Progress,
        user_id: u64,
    },
    /// Users following you
    Followers,
    /// Your track enrolments
    Tracks,
    /// Follow a user
    Follow { user_id: u64 },
    /// Stop following a user
    Unfollow { user_id: u64 },
    /// Give respect to a user
    Respect { user_id: u64 },
    /// Take back respect from a user
    Disrespect { user_id: u64 },
}

fn profile_panel(title: &str, p: &UserProfile) -> Vec<String> {
    build_panel(
        p.name.as_deref().unwrap_or(title),
        &[
            ("ID", cell(p.id)),
            ("Rank", cell(p.rank.as_deref())),
            ("Ranking", cell(p.ranking.as_deref())),
            ("Points", cell(p.points.as_deref())),
            ("User owns", cell(p.user_owns.as_deref())),
            ("System owns", cell(p.system_owns.as_deref())),
            ("Respect", cell(p.respects.as_deref())),
            ("Country", cell(p.country_name.as_deref())),
            ("Team", cell(p.team.as_ref().and_then(|t| t.name.as_deref()))),
        ],
    )
}

fn bloods_lines(user_id: u64, bloods: &[(&str, &Vec<Blood>)]) -> Vec<String> {
    let rows: Vec<Vec<String>> = bloods
        .iter()
        .flat_map(|&(kind, entries)| {
            entries.iter().map(move |b| {
                vec![
                    kind.to_string(),
                    cell(b.id),
                    cell(b.name.as_deref()),
                    cell(b.kind.as_deref()),
                    date_cell(b.date.as_deref()),
                ]
            })
        })
        .collect();
    build_table(
        &format!("Bloods of user {user_id}"),
        &["Kind", "ID", "Name", "Blood", "Date"],
        &rows,
    )
}

fn social(ctx: &Context, action: Social, user_id: u64) -> Result<()> {
    let resp = user::social(&ctx.client, action, user_id)?;
    ctx.emit_message(resp, &format!("Sent {} for user {user_id}", action.verb()))
}

pub fn execute(ctx: &Context, action: UserAction) -> Result<()> {
    match action {
        UserAction::Info => {
            let resp = user::info(&ctx.client)?;
            ctx.emit(resp, |info: InfoResponse| {
                let u = info.info;
                build_panel(
                    u.name.as_deref().unwrap_or("Account"),
                    &[
                        ("ID", u.id.to_string()),
                        ("VIP", yes_no(u.vip)),
                        ("Subscription", cell(u.subscription.as_deref())),
                        ("Timezone", cell(u.timezone.as_deref())),
                        ("Team", cell(u.team.as_ref().and_then(|t| t.name.as_deref()))),
                    ],
                )
            })
        }
        UserAction::Summary => {
            let resp = user::summary(&ctx.client)?;
            ctx.emit(resp, |summary: ProfileResponse| {
                profile_panel("Profile summary", &summary.profile)
            })
        }
        UserAction::Profile { user_id } => {
            let resp = user::profile(&ctx.client, user_id)?;
            ctx.emit(resp, |profile: ProfileResponse| {
                profile_panel(&format!("User {user_id}"), &profile.profile)
            })
        }
        UserAction::Activity { user_id } => {
            let resp = user::activity(&ctx.client, user_id)?;
            ctx.emit(resp, |activity: ActivityResponse| {
                let rows: Vec<Vec<String>> = activity
                    .profile
                    .activity
                    .iter()
                    .map(|a| {
                        vec![
                            date_cell(a.when()),
                            cell(a.kind.as_deref()),
                            cell(a.subject()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Activity of user {user_id}"),
                    &["Date", "Type", "Target"],
                    &rows,
                )
            })
        }
        UserAction::Badges { user_id } => {
            let resp = user::badges(&ctx.client, user_id)?;
            ctx.emit(resp, |info: BadgesInfo| {
                let rows: Vec<Vec<String>> = info
                    .badges
                    .iter()
                    .map(|b| {
                        vec![
                            cell(b.id),
                            cell(b.name.as_deref()),
                            cell(b.description.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Badges of user {user_id}"),
                    &["ID", "Name", "Description"],
                    &rows,
                )
            })
        }
        UserAction::Bloods { user_id } => {
            let resp = user::bloods(&ctx.client, user_id)?;
            ctx.emit(resp, |bloods: BloodsResponse| {
                let b = bloods.profile;
                bloods_lines(user_id, &[("machine", &b.machines), ("challenge", &b.challenges)])
            })
        }
        UserAction::Progress { kind, user_id } => {
            let resp = user::progress(&ctx.client, kind, user_id)?;
            ctx.emit_document(resp, &format!("Progress of user {user_id}"))
        }
        UserAction::Followers => {
            let resp = user::followers(&ctx.client)?;
            ctx.emit(resp, |followers: FollowersResponse| {
                let rows: Vec<Vec<String>> = followers
                    .data
                    .into_items()
                    .iter()
                    .map(|f| vec![cell(f.id), cell(f.name.as_deref()), cell(f.points.as_deref())])
                    .collect();
                build_table("Followers", &["ID", "Name", "Points"], &rows)
            })
        }
        UserAction::Tracks => {
            let resp = user::tracks(&ctx.client)?;
            ctx.emit_document(resp, "Your tracks")
        }
        UserAction::Follow { user_id } => social(ctx, Social::Follow, user_id),
        UserAction::Unfollow { user_id } => social(ctx, Social::Unfollow, user_id),
        UserAction::Respect { user_id } => social(ctx, Social::Respect, user_id),
        UserAction::Disrespect { user_id } => social(ctx, Social::Disrespect, user_id),
    }
}
