use clap::{Args, Subcommand};

use crate::api::catalog::ChangelogResponse;
use crate::api::machines::{
    self, ActiveMachineResponse, ActivityResponse, CreatorsResponse, Detail, MachineListing,
    MachineSummary, OwnReviewResponse, Person, ProfileResponse, Recommended, Review,
    ReviewsResponse, Tag, TagsResponse, TasksResponse, TopOwner, WalkthroughsResponse,
};
use crate::api::InfoOrData;
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell, truncate, yes_no};
use crate::query::{MachineFilters, Paging};
use crate::resolve::{EntityKind, Target};
use crate::submit::FlagTarget;

#[derive(Subcommand)]
pub enum MachinesAction {
    /// List machines
    List(MachineFilters),
    /// Show the machine currently spawned for you
    Active,
    /// Show a machine profile
    Info {
        /// Machine name or slug
        slug: String,
    },
    /// Recent activity on a machine
    Activity {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Top owners of a machine
    OwnsTop {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Machines suggested for you
    Recommended,
    /// Machines on your to-do list
    Todo(Paging),
    /// Retired machines
    RetiredList(Paging),
    /// Retired machines suggested for you
    RecommendedRetired,
    /// Machines announced but not yet released
    Unreleased,
    /// All machine tags
    Tags,
    /// Tags of one machine
    MachineTags {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Change history of a machine
    Changelog {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Creators of a machine
    Creators {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Reviews of a machine
    Reviews {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Your own review of a machine
    ReviewsUser {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Community walkthroughs of a machine
    Walkthroughs {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Official writeup of a retired machine
    Writeup {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Guided-mode tasks of a machine
    Tasks {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Owns over time
    GraphActivity {
        /// Machine ID, name, or "active"
        target: Target,

        /// Time window, e.g. 1W, 1M, 1Y
        #[arg(long, default_value = "1M")]
        period: String,
    },
    /// Owns matrix graph
    GraphMatrix {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Owns by perceived difficulty
    GraphDifficulty {
        /// Machine ID, name, or "active"
        target: Target,
    },
    /// Submit a user or root flag
    Submit(SubmitArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Flag text; read from stdin when omitted
    pub flag: Option<String>,

    /// Machine ID, name, or "active"
    #[arg(long, default_value = "active")]
    pub target: Target,
}

fn summary_rows(machines: &[MachineSummary]) -> Vec<Vec<String>> {
    machines
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                cell(m.name.as_deref()),
                cell(m.os.as_deref()),
                cell(m.difficulty.as_deref()),
                cell(m.points),
                cell(m.star.map(|s| format!("{s:.1}"))),
                date_cell(m.release.as_deref()),
                format!("{}/{}", cell(m.user_owns_count), cell(m.root_owns_count)),
            ]
        })
        .collect()
}

const SUMMARY_HEADERS: [&str; 8] = [
    "ID", "Name", "OS", "Difficulty", "Points", "Rating", "Release", "Owns (user/root)",
];

fn tags_table(title: &str, tags: &[Tag]) -> Vec<String> {
    let rows: Vec<Vec<String>> = tags
        .iter()
        .map(|t| vec![cell(t.id), cell(t.name.as_deref()), cell(t.kind.as_deref())])
        .collect();
    build_table(title, &["ID", "Name", "Type"], &rows)
}

fn review_row(r: &Review) -> Vec<String> {
    vec![
        cell(r.id),
        cell(r.user.as_ref().and_then(Person::name)),
        cell(r.rating.as_deref()),
        cell(r.comment.as_deref().map(|c| truncate(c, 60))),
        date_cell(r.date.as_deref()),
    ]
}

const REVIEW_HEADERS: [&str; 5] = ["ID", "User", "Rating", "Comment", "Date"];

/// Commands that only need the resolved machine ID.
fn execute_detail(ctx: &Context, detail: Detail, target: &Target) -> Result<()> {
    let id = ctx.resolve(target, EntityKind::Machine)?;
    let resp = machines::detail(&ctx.client, detail, id)?;
    match detail {
        Detail::Changelog => ctx.emit(resp, |changes: ChangelogResponse| {
            let rows: Vec<Vec<String>> = changes
                .data
                .iter()
                .map(|c| vec![date_cell(c.when()), cell(c.kind.as_deref()), cell(c.text())])
                .collect();
            build_table(
                &format!("Changelog of machine {id}"),
                &["Date", "Type", "Description"],
                &rows,
            )
        }),
        Detail::Creators => ctx.emit(resp, |creators: CreatorsResponse| {
            let rows: Vec<Vec<String>> = creators
                .data
                .iter()
                .map(|c| vec![cell(c.id), cell(c.username.as_deref()), cell(c.role.as_deref())])
                .collect();
            build_table(
                &format!("Creators of machine {id}"),
                &["ID", "Username", "Role"],
                &rows,
            )
        }),
        Detail::Tags => ctx.emit(resp, |tags: TagsResponse| {
            tags_table(&format!("Tags of machine {id}"), &tags.data)
        }),
        Detail::Reviews => ctx.emit(resp, |reviews: ReviewsResponse| {
            let rows: Vec<Vec<String>> = reviews.data.iter().map(review_row).collect();
            build_table(&format!("Reviews of machine {id}"), &REVIEW_HEADERS, &rows)
        }),
        Detail::OwnReview => ctx.emit(resp, |review: OwnReviewResponse| {
            let rows: Vec<Vec<String>> = review.data.iter().map(review_row).collect();
            build_table(&format!("Your review of machine {id}"), &REVIEW_HEADERS, &rows)
        }),
        Detail::Walkthroughs => ctx.emit(resp, |walkthroughs: WalkthroughsResponse| {
            let rows: Vec<Vec<String>> = walkthroughs
                .data
                .iter()
                .map(|w| {
                    vec![
                        cell(w.id),
                        cell(w.title.as_deref()),
                        cell(w.language.as_deref()),
                        cell(w.author.as_ref().and_then(Person::name)),
                    ]
                })
                .collect();
            build_table(
                &format!("Walkthroughs of machine {id}"),
                &["ID", "Title", "Language", "Author"],
                &rows,
            )
        }),
        Detail::Tasks => ctx.emit(resp, |tasks: TasksResponse| {
            let rows: Vec<Vec<String>> = tasks
                .data
                .iter()
                .map(|t| {
                    vec![
                        cell(t.id),
                        cell(t.title.as_deref()),
                        cell(t.description.as_deref().map(|d| truncate(d, 60))),
                        cell(t.points.as_deref()),
                    ]
                })
                .collect();
            build_table(
                &format!("Tasks of machine {id}"),
                &["ID", "Title", "Description", "Points"],
                &rows,
            )
        }),
        Detail::Writeup => ctx.emit_document(resp, &format!("Writeup of machine {id}")),
        Detail::GraphMatrix => ctx.emit_document(resp, &format!("Owns matrix of machine {id}")),
        Detail::GraphDifficulty => {
            ctx.emit_document(resp, &format!("Owns by difficulty of machine {id}"))
        }
    }
}

pub fn execute(ctx: &Context, action: MachinesAction) -> Result<()> {
    match action {
        MachinesAction::List(filters) => {
            let resp = machines::list(&ctx.client, &filters)?;
            ctx.emit(resp, |listing: MachineListing| {
                build_table(
                    "Machines",
                    &SUMMARY_HEADERS,
                    &summary_rows(&listing.data.into_items()),
                )
            })
        }
        MachinesAction::Active => {
            let resp = machines::active(&ctx.client)?;
            ctx.emit(resp, |active: ActiveMachineResponse| match active.info {
                None => vec!["No active machine.".to_string()],
                Some(m) => build_panel(
                    m.name.as_deref().unwrap_or("Active machine"),
                    &[
                        ("ID", m.id.to_string()),
                        ("Type", cell(m.kind.as_deref())),
                        ("IP", cell(m.ip.as_deref())),
                        ("Expires", cell(m.expires_at.as_deref())),
                    ],
                ),
            })
        }
        MachinesAction::Info { slug } => {
            let resp = machines::profile(&ctx.client, &slug)?;
            ctx.emit(resp, |profile: ProfileResponse| {
                let m = profile.info;
                build_panel(
                    m.name.as_deref().unwrap_or(&slug),
                    &[
                        ("ID", m.id.to_string()),
                        ("OS", cell(m.os.as_deref())),
                        ("Difficulty", cell(m.difficulty.as_deref())),
                        ("Points", cell(m.points)),
                        ("Rating", cell(m.stars.map(|s| format!("{s:.1}")))),
                        ("Status", m.status_label().to_string()),
                        ("IP", cell(m.ip.as_deref())),
                        ("Maker", cell(m.maker.as_ref().and_then(|mk| mk.name.as_deref()))),
                        ("Release", date_cell(m.release.as_deref())),
                        ("User owns", cell(m.user_owns_count)),
                        ("Root owns", cell(m.root_owns_count)),
                        ("User owned", yes_no(m.owned_user)),
                        ("Root owned", yes_no(m.owned_root)),
                    ],
                )
            })
        }
        MachinesAction::Activity { target } => {
            let id = ctx.resolve(&target, EntityKind::Machine)?;
            let resp = machines::activity(&ctx.client, id)?;
            ctx.emit(resp, |activity: ActivityResponse| {
                let rows: Vec<Vec<String>> = activity
                    .info
                    .activity
                    .iter()
                    .map(|a| {
                        vec![
                            cell(a.subject()),
                            cell(a.kind.as_deref()),
                            cell(a.blood_type.as_deref()),
                            date_cell(a.when()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Activity for machine {id}"),
                    &["User", "Type", "Blood", "Date"],
                    &rows,
                )
            })
        }
        MachinesAction::OwnsTop { target } => {
            let id = ctx.resolve(&target, EntityKind::Machine)?;
            let resp = machines::owns_top(&ctx.client, id)?;
            ctx.emit(resp, |owners: InfoOrData<Vec<TopOwner>>| {
                let rows: Vec<Vec<String>> = owners
                    .data
                    .iter()
                    .map(|o| {
                        vec![
                            cell(o.position),
                            cell(o.name.as_deref()),
                            cell(o.rank_text.as_deref()),
                            date_cell(o.own_date.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("Top owners of machine {id}"),
                    &["#", "User", "Rank", "Owned"],
                    &rows,
                )
            })
        }
        MachinesAction::Recommended => {
            let resp = machines::recommended(&ctx.client)?;
            ctx.emit(resp, |cards: Recommended| {
                build_table(
                    "Recommended machines",
                    &SUMMARY_HEADERS,
                    &summary_rows(&cards.into_cards()),
                )
            })
        }
        MachinesAction::Todo(paging) => {
            let resp = machines::todo(&ctx.client, &paging)?;
            ctx.emit(resp, |listing: MachineListing| {
                build_table(
                    "Machine to-do list",
                    &SUMMARY_HEADERS,
                    &summary_rows(&listing.data.into_items()),
                )
            })
        }
        MachinesAction::RetiredList(paging) => {
            let resp = machines::retired(&ctx.client, &paging)?;
            ctx.emit(resp, |listing: MachineListing| {
                build_table(
                    &format!("Retired machines (page {})", paging.page),
                    &SUMMARY_HEADERS,
                    &summary_rows(&listing.data.into_items()),
                )
            })
        }
        MachinesAction::RecommendedRetired => {
            let resp = machines::recommended_retired(&ctx.client)?;
            ctx.emit(resp, |cards: Recommended| {
                build_table(
                    "Recommended retired machines",
                    &SUMMARY_HEADERS,
                    &summary_rows(&cards.into_cards()),
                )
            })
        }
        MachinesAction::Unreleased => {
            let resp = machines::unreleased(&ctx.client)?;
            ctx.emit(resp, |listing: MachineListing| {
                build_table(
                    "Unreleased machines",
                    &SUMMARY_HEADERS,
                    &summary_rows(&listing.data.into_items()),
                )
            })
        }
        MachinesAction::Tags => {
            let resp = machines::tags(&ctx.client)?;
            ctx.emit(resp, |tags: TagsResponse| tags_table("Machine tags", &tags.data))
        }
        MachinesAction::MachineTags { target } => execute_detail(ctx, Detail::Tags, &target),
        MachinesAction::Changelog { target } => execute_detail(ctx, Detail::Changelog, &target),
        MachinesAction::Creators { target } => execute_detail(ctx, Detail::Creators, &target),
        MachinesAction::Reviews { target } => execute_detail(ctx, Detail::Reviews, &target),
        MachinesAction::ReviewsUser { target } => {
            execute_detail(ctx, Detail::OwnReview, &target)
        }
        MachinesAction::Walkthroughs { target } => {
            execute_detail(ctx, Detail::Walkthroughs, &target)
        }
        MachinesAction::Writeup { target } => execute_detail(ctx, Detail::Writeup, &target),
        MachinesAction::Tasks { target } => execute_detail(ctx, Detail::Tasks, &target),
        MachinesAction::GraphMatrix { target } => {
            execute_detail(ctx, Detail::GraphMatrix, &target)
        }
        MachinesAction::GraphDifficulty { target } => {
            execute_detail(ctx, Detail::GraphDifficulty, &target)
        }
        MachinesAction::GraphActivity { target, period } => {
            let id = ctx.resolve(&target, EntityKind::Machine)?;
            let resp = machines::graph_activity(&ctx.client, id, &period)?;
            ctx.emit_document(resp, &format!("Owns of machine {id} over {period}"))
        }
        MachinesAction::Submit(args) => {
            ctx.submit(FlagTarget::Machine(args.target), args.flag.as_deref())
        }
    }
}
