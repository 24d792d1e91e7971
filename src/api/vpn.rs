use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::Deserialize;

use crate::api::{lenient_bool, lenient_string, DataEnvelope};
use crate::client::{ApiRequest, ApiResponse, Download, HtbClient};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Product {
    #[default]
    Labs,
    StartingPoint,
    Fortresses,
    Endgames,
    Prolabs,
}

impl Product {
    fn as_param(self) -> &'static str {
        match self {
            Product::Labs => "labs",
            Product::StartingPoint => "starting_point",
            Product::Fortresses => "fortresses",
            Product::Endgames => "endgames",
            Product::Prolabs => "prolabs",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Udp,
    Tcp,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VpnServer {
    pub id: u64,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub current_clients: Option<u64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub full: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerGroup {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub servers: BTreeMap<String, VpnServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerOptions {
    /// location → tier → group
    #[serde(default)]
    pub options: BTreeMap<String, BTreeMap<String, ServerGroup>>,
}

#[derive(Debug, Clone)]
pub struct ServerRow {
    pub group: Option<String>,
    pub server: VpnServer,
}

impl ServerOptions {
    pub fn flatten(self) -> Vec<ServerRow> {
        self.options
            .into_values()
            .flat_map(BTreeMap::into_values)
            .flat_map(|group| {
                let name = group.name;
                group.servers.into_values().map(move |server| ServerRow {
                    group: name.clone(),
                    server,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub connected: Option<bool>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Server assigned for one product in `/connections`.
#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub assigned_server: Option<VpnServer>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub can_access: Option<bool>,
}

/// `/connections` keys, in display order.
pub const ASSIGNMENT_PRODUCTS: [(&str, &str); 5] = [
    ("lab", "Labs"),
    ("starting_point", "Starting Point"),
    ("fortresses", "Fortresses"),
    ("pro_labs", "ProLabs"),
    ("competitive", "Competitive"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ProlabServer {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub load: Option<String>,
}

pub type ServersResponse = DataEnvelope<ServerOptions>;
pub type StatusResponse = DataEnvelope<ConnectionStatus>;
pub type AssignmentsResponse = DataEnvelope<BTreeMap<String, Option<Assignment>>>;
pub type ProlabServersResponse = DataEnvelope<Vec<ProlabServer>>;

pub fn servers(client: &HtbClient, product: Product) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/connections/servers").param("product", product.as_param()))
}

pub fn status(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/connection/status"))
}

pub fn product_status(client: &HtbClient, product: &str) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/connection/status").segment(product))
}

pub fn prolab_status(client: &HtbClient, prolab_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/connection/status/prolab/{prolab_id}")))
}

pub fn assignments(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/connections"))
}

pub fn prolab_servers(client: &HtbClient, prolab_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/connections/servers/prolab/{prolab_id}")))
}

pub fn switch(client: &HtbClient, server_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::post(format!("/connections/servers/switch/{server_id}")))
}

pub fn ovpn_path(server_id: u64, protocol: Protocol) -> String {
    match protocol {
        Protocol::Udp => format!("/access/ovpnfile/{server_id}/0"),
        Protocol::Tcp => format!("/access/ovpnfile/{server_id}/0/1"),
    }
}

pub fn download(client: &HtbClient, server_id: u64, protocol: Protocol) -> Result<Download> {
    client.download(&ApiRequest::get(ovpn_path(server_id, protocol)))
}

pub fn default_file_name(server_id: u64, protocol: Protocol) -> String {
    format!("htb_{server_id}_{}.ovpn", protocol.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn servers_flatten_nested_options() {
        let body = r#"{"status":true,"data":{"options":{
            "EU":{"EU - Free":{"name":"EU - Free","servers":{
                "1":{"id":1,"friendly_name":"EU Free 1","location":"EU","current_clients":40,"full":false},
                "2":{"id":2,"friendly_name":"EU Free 2","location":"EU","current_clients":99,"full":1}}}},
            "US":{"US - VIP":{"name":"US - VIP","servers":{
                "9":{"id":9,"friendly_name":"US VIP 9","location":"US"}}}}}}}"#;
        let resp: ServersResponse = serde_json::from_str(body).unwrap();
        let rows = resp.data.flatten();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].group.as_deref(), Some("EU - Free"));
        assert_eq!(rows[1].server.full, Some(true));
        assert_eq!(rows[2].server.id, 9);
    }

    #[test]
    fn product_param_uses_underscores() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/connections/servers")
            .match_query(Matcher::UrlEncoded(
                "product".into(),
                "starting_point".into(),
            ))
            .with_body(r#"{"data":{"options":{}}}"#)
            .create();

        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        servers(&client, Product::StartingPoint).unwrap();
        mock.assert();
    }

    #[test]
    fn assignments_allow_missing_products() {
        let body = r#"{"data":{"lab":{"can_access":true,"assigned_server":
            {"id":5,"friendly_name":"EU VIP 5","location":"EU"}},"competitive":null}}"#;
        let resp: AssignmentsResponse = serde_json::from_str(body).unwrap();
        let lab = resp.data["lab"].as_ref().unwrap();
        assert_eq!(lab.assigned_server.as_ref().map(|s| s.id), Some(5));
        assert!(resp.data["competitive"].is_none());
    }

    #[test]
    fn product_status_name_is_one_segment() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/connection/status/release%20arena")
            .with_body(r#"{"data":{"connected":false}}"#)
            .create();
        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        product_status(&client, "release arena").unwrap();
        mock.assert();
    }

    #[test]
    fn ovpn_paths_by_protocol() {
        assert_eq!(ovpn_path(5, Protocol::Udp), "/access/ovpnfile/5/0");
        assert_eq!(ovpn_path(5, Protocol::Tcp), "/access/ovpnfile/5/0/1");
        assert_eq!(default_file_name(5, Protocol::Tcp), "htb_5_tcp.ovpn");
    }
}
