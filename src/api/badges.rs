use serde::Deserialize;

use crate::api::{InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Badge {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "description_en")]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

pub type BadgeListing = InfoOrData<Listing<Badge>>;

pub fn list(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/badges"))
}
