use serde::Deserialize;

use crate::api::{InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

/// Pwnbox instances and their terminals share one row shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PwnboxEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "location")]
    pub region: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

pub type InfoResponse = InfoOrData<Option<PwnboxEntry>>;
pub type PwnboxListing = InfoOrData<Listing<PwnboxEntry>>;

pub fn info(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/pwnbox/info"))
}

pub fn list(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/pwnbox/list"))
}

pub fn terminals(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/pwnbox/terminals"))
}

pub fn terminals_list(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/pwnbox/terminals/list"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_read_as_region() {
        let body = r#"{"data":[{"id":4,"name":"pwnbox-eu","status":"running","location":"EU"}]}"#;
        let resp: PwnboxListing = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.into_items()[0].region.as_deref(), Some("EU"));
    }

    #[test]
    fn terminals_path() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/pwnbox/terminals/list")
            .with_body(r#"{"data":[]}"#)
            .create();
        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        terminals_list(&client).unwrap();
        mock.assert();
    }
}
