use clap::Subcommand;

use crate::api::review;
use crate::cli::Context;
use crate::error::Result;

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Mark a machine review as helpful
    Helpful { review_id: u64 },
    /// Mark a machine review as unhelpful
    Unhelpful { review_id: u64 },
}

pub fn execute(ctx: &Context, action: ReviewAction) -> Result<()> {
    let (review_id, helpful) = match action {
        ReviewAction::Helpful { review_id } => (review_id, true),
        ReviewAction::Unhelpful { review_id } => (review_id, false),
    };
    let resp = review::mark(&ctx.client, review_id, helpful)?;
    let verdict = if helpful { "helpful" } else { "unhelpful" };
    ctx.emit_message(resp, &format!("Marked review {review_id} as {verdict}"))
}
