use std::path::PathBuf;

use clap::Subcommand;

use crate::api::vpn::{
    self, AssignmentsResponse, ConnectionStatus, ProlabServersResponse, Product, Protocol,
    ServersResponse, StatusResponse, ASSIGNMENT_PRODUCTS,
};
use crate::cli::Context;
use crate::config::config_path;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, yes_no};

#[derive(Subcommand)]
pub enum VpnAction {
    /// List VPN servers for a product
    Servers {
        #[arg(long, value_enum, default_value_t = Product::Labs)]
        product: Product,
    },
    /// Show your VPN connection status
    Status,
    /// Servers currently assigned to you, per product
    List,
    /// Connection status for one product
    ProductStatus { product: String },
    /// Connection status for a ProLab
    ProlabStatus { prolab_id: u64 },
    /// VPN servers of a ProLab
    ProlabServers { prolab_id: u64 },
    /// Switch your assigned VPN server
    Switch { server_id: u64 },
    /// Download an OpenVPN config
    Download {
        server_id: u64,

        /// TCP instead of UDP
        #[arg(long)]
        tcp: bool,

        /// Where to write the .ovpn file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// `<config dir>/vpn/<name>`, next to the stored config.
fn default_output(name: &str) -> PathBuf {
    let config = config_path();
    config
        .parent()
        .map(|dir| dir.join("vpn"))
        .unwrap_or_else(|| PathBuf::from("vpn"))
        .join(name)
}

fn status_panel(title: &str, s: ConnectionStatus) -> Vec<String> {
    build_panel(
        title,
        &[
            ("Connected", yes_no(s.connected)),
            ("Server", cell(s.server.as_deref())),
            ("Location", cell(s.location.as_deref())),
            ("IP", cell(s.ip.as_deref())),
        ],
    )
}

fn assignment_lines(resp: AssignmentsResponse) -> Vec<String> {
    let mut assignments = resp.data;
    let rows: Vec<Vec<String>> = ASSIGNMENT_PRODUCTS
        .iter()
        .map(|(key, label)| {
            let assignment = assignments.remove(*key).flatten();
            let server = assignment.as_ref().and_then(|a| a.assigned_server.as_ref());
            vec![
                label.to_string(),
                cell(server.map(|s| s.id)),
                cell(server.and_then(|s| s.friendly_name.as_deref())),
                cell(server.and_then(|s| s.location.as_deref())),
                yes_no(assignment.as_ref().and_then(|a| a.can_access)),
            ]
        })
        .collect();
    build_table(
        "VPN server assignments",
        &["Product", "ID", "Server", "Location", "Access"],
        &rows,
    )
}

pub fn execute(ctx: &Context, action: VpnAction) -> Result<()> {
    match action {
        VpnAction::Servers { product } => {
            let resp = vpn::servers(&ctx.client, product)?;
            ctx.emit(resp, |servers: ServersResponse| {
                let rows: Vec<Vec<String>> = servers
                    .data
                    .flatten()
                    .into_iter()
                    .map(|row| {
                        vec![
                            row.server.id.to_string(),
                            cell(row.server.friendly_name.as_deref()),
                            cell(row.server.location.as_deref()),
                            cell(row.group.as_deref()),
                            cell(row.server.current_clients),
                            yes_no(row.server.full),
                        ]
                    })
                    .collect();
                build_table(
                    "VPN servers",
                    &["ID", "Name", "Location", "Tier", "Clients", "Full"],
                    &rows,
                )
            })
        }
        VpnAction::Status => {
            let resp = vpn::status(&ctx.client)?;
            ctx.emit(resp, |status: StatusResponse| {
                status_panel("VPN connection", status.data)
            })
        }
        VpnAction::List => {
            let resp = vpn::assignments(&ctx.client)?;
            ctx.emit(resp, assignment_lines)
        }
        VpnAction::ProductStatus { product } => {
            let resp = vpn::product_status(&ctx.client, &product)?;
            ctx.emit(resp, |status: StatusResponse| {
                status_panel(&format!("VPN connection ({product})"), status.data)
            })
        }
        VpnAction::ProlabStatus { prolab_id } => {
            let resp = vpn::prolab_status(&ctx.client, prolab_id)?;
            ctx.emit(resp, |status: StatusResponse| {
                status_panel(&format!("ProLab {prolab_id} connection"), status.data)
            })
        }
        VpnAction::ProlabServers { prolab_id } => {
            let resp = vpn::prolab_servers(&ctx.client, prolab_id)?;
            ctx.emit(resp, |servers: ProlabServersResponse| {
                let rows: Vec<Vec<String>> = servers
                    .data
                    .iter()
                    .map(|s| {
                        vec![
                            cell(s.id),
                            cell(s.name.as_deref()),
                            cell(s.location.as_deref()),
                            cell(s.status.as_deref()),
                            cell(s.load.as_deref()),
                        ]
                    })
                    .collect();
                build_table(
                    &format!("ProLab {prolab_id} VPN servers"),
                    &["ID", "Name", "Location", "Status", "Load"],
                    &rows,
                )
            })
        }
        VpnAction::Switch { server_id } => {
            let resp = vpn::switch(&ctx.client, server_id)?;
            ctx.emit_message(resp, &format!("Switched to VPN server {server_id}"))
        }
        VpnAction::Download {
            server_id,
            tcp,
            output,
        } => {
            let protocol = if tcp { Protocol::Tcp } else { Protocol::Udp };
            let path = output
                .unwrap_or_else(|| default_output(&vpn::default_file_name(server_id, protocol)));
            ctx.download(
                &format!("Downloading VPN config for server {server_id}"),
                &path,
                |client| vpn::download(client, server_id, protocol),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_list_every_product() {
        let resp: AssignmentsResponse = serde_json::from_str(
            r#"{"data":{"lab":{"can_access":1,"assigned_server":{"id":5,"friendly_name":"EU VIP 5"}}}}"#,
        )
        .unwrap();
        let lines = assignment_lines(resp);
        assert_eq!(lines.len(), 3 + ASSIGNMENT_PRODUCTS.len());
        assert!(lines[3].starts_with("Labs"));
        assert!(lines[3].contains("EU VIP 5"));
        assert!(lines[4].starts_with("Starting Point"));
        assert!(lines[4].ends_with("N/A"));
    }
}
