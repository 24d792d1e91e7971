use clap::Subcommand;

use crate::api::machines::{self, ActiveMachineResponse};
use crate::api::vm::{self, VmAction};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, cell};
use crate::resolve::{EntityKind, Target};

#[derive(Subcommand)]
pub enum VmCommand {
    /// Show the running machine instance
    Status,
    /// Spawn a machine instance
    Spawn {
        /// Machine ID or name
        target: Target,
    },
    /// Reset a machine instance
    Reset {
        /// Machine ID, name, or "active"
        #[arg(default_value = "active")]
        target: Target,
    },
    /// Terminate a machine instance
    Terminate {
        #[arg(default_value = "active")]
        target: Target,
    },
    /// Extend the lifetime of a machine instance
    Extend {
        #[arg(default_value = "active")]
        target: Target,
    },
}

fn perform(ctx: &Context, action: VmAction, target: &Target) -> Result<()> {
    let id = ctx.resolve(target, EntityKind::Machine)?;
    let resp = vm::perform(&ctx.client, action, id)?;
    ctx.emit_message(resp, &format!("Requested {} of machine {id}", action.verb()))
}

pub fn execute(ctx: &Context, command: VmCommand) -> Result<()> {
    match command {
        VmCommand::Status => {
            let resp = machines::active(&ctx.client)?;
            ctx.emit(resp, |active: ActiveMachineResponse| match active.info {
                None => vec!["No machine instance is running.".to_string()],
                Some(m) => build_panel(
                    m.name.as_deref().unwrap_or("Machine instance"),
                    &[
                        ("ID", m.id.to_string()),
                        ("Type", cell(m.kind.as_deref())),
                        ("IP", cell(m.ip.as_deref())),
                        ("Expires", cell(m.expires_at.as_deref())),
                    ],
                ),
            })
        }
        VmCommand::Spawn { target } => perform(ctx, VmAction::Spawn, &target),
        VmCommand::Reset { target } => perform(ctx, VmAction::Reset, &target),
        VmCommand::Terminate { target } => perform(ctx, VmAction::Terminate, &target),
        VmCommand::Extend { target } => perform(ctx, VmAction::Extend, &target),
    }
}
