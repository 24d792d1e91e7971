use serde::Deserialize;
use serde_json::json;

use crate::api::{
    lenient_bool, lenient_string, ActivityInfo, Category, InfoEnvelope, InfoOrData, Listing,
};
use crate::client::{ApiRequest, ApiResponse, Download, HtbClient};
use crate::error::Result;
use crate::query::ChallengeFilters;

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeSummary {
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
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_owned: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeDetail {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
    #[serde(default)]
    pub solves: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub retired: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub download: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub docker: Option<bool>,
}

/// `/challenge/info` answers under `challenge`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeInfoResponse {
    #[serde(alias = "info")]
    pub challenge: ChallengeDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recommended {
    #[serde(default)]
    pub card1: Option<ChallengeSummary>,
    #[serde(default)]
    pub card2: Option<ChallengeSummary>,
}

impl Recommended {
    pub fn into_cards(self) -> Vec<ChallengeSummary> {
        self.card1.into_iter().chain(self.card2).collect()
    }
}

pub type ChallengeListing = InfoOrData<Listing<ChallengeSummary>>;
pub type CategoriesResponse = InfoOrData<Vec<Category>>;
pub type ActivityResponse = InfoEnvelope<ActivityInfo>;

pub fn list(client: &HtbClient, filters: &ChallengeFilters) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/challenges").query(filters.to_query()))
}

pub fn info(client: &HtbClient, slug: &str) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/challenge/info").segment(slug))
}

pub fn categories(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/challenge/categories/list"))
}

pub fn recommended(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/challenge/recommended"))
}

pub fn activity(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/challenge/activity/{id}")))
}

pub fn start(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::post("/challenge/start").json(json!({ "challenge_id": id })))
}

pub fn stop(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::post("/challenge/stop").json(json!({ "challenge_id": id })))
}

pub fn download(client: &HtbClient, id: u64) -> Result<Download> {
    client.download(&ApiRequest::get(format!("/challenge/download/{id}")))
}
