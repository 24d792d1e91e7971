use serde::Deserialize;

use crate::api::{lenient_bool, Category, DataEnvelope, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, Download, HtbClient};
use crate::error::Result;
use crate::query::SherlockFilters;

#[derive(Debug, Clone, Deserialize)]
pub struct SherlockSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub solves: Option<u64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SherlockDetail {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SherlockTask {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadLink {
    pub url: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

pub type SherlockListing = InfoOrData<Listing<SherlockSummary>>;
pub type InfoResponse = InfoOrData<SherlockDetail>;
pub type CategoriesResponse = InfoOrData<Vec<Category>>;
pub type TasksResponse = DataEnvelope<Vec<SherlockTask>>;

pub fn list(client: &HtbClient, filters: &SherlockFilters) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/sherlocks").query(filters.to_query()))
}

pub fn info(client: &HtbClient, slug: &str) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/sherlocks/info").segment(slug))
}

pub fn categories(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/sherlocks/categories/list"))
}

pub fn tasks(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/sherlocks/{id}/tasks")))
}

pub fn download_link(client: &HtbClient, id: u64) -> Result<DownloadLink> {
    client
        .execute(&ApiRequest::get(format!("/sherlocks/{id}/download_link")))?
        .decode()
}

/// Two calls: a short-lived signed link, then the archive behind it.
pub fn download(client: &HtbClient, id: u64) -> Result<Download> {
    let link = download_link(client, id)?;
    log::debug!(
        "sherlock {id} download link expires in {}s",
        link.expires_in.unwrap_or_default()
    );
    client.download(&ApiRequest::get(link.url).anonymous())
}
