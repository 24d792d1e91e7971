use serde::Deserialize;

use crate::api::{lenient_bool, lenient_string, ActivityInfo, InfoEnvelope, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;
use crate::query::{MachineFilters, Paging, Status};

#[derive(Debug, Clone, Deserialize)]
pub struct MachineSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default, rename = "difficultyText")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub star: Option<f64>,
    #[serde(default, alias = "release_date")]
    pub release: Option<String>,
    #[serde(default)]
    pub user_owns_count: Option<u64>,
    #[serde(default)]
    pub root_owns_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Maker {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MachineProfile {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default, rename = "difficultyText")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub stars: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub retired: Option<bool>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_owns_count: Option<u64>,
    #[serde(default)]
    pub root_owns_count: Option<u64>,
    #[serde(default)]
    pub maker: Option<Maker>,
    #[serde(default, rename = "authUserInUserOwns", deserialize_with = "lenient_bool")]
    pub owned_user: Option<bool>,
    #[serde(default, rename = "authUserInRootOwns", deserialize_with = "lenient_bool")]
    pub owned_root: Option<bool>,
    #[serde(default)]
    pub release: Option<String>,
}

impl MachineProfile {
    pub fn status_label(&self) -> &'static str {
        match (self.active, self.retired) {
            (Some(true), _) => "Active",
            (_, Some(true)) => "Retired",
            _ => "N/A",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveMachine {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopOwner {
    #[serde(default)]
    pub position: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rank_text: Option<String>,
    #[serde(default)]
    pub own_date: Option<String>,
}

/// Two suggestion cards, either of which may be empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recommended {
    #[serde(default)]
    pub card1: Option<MachineSummary>,
    #[serde(default)]
    pub card2: Option<MachineSummary>,
}

impl Recommended {
    pub fn into_cards(self) -> Vec<MachineSummary> {
        self.card1.into_iter().chain(self.card2).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MachineCreator {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, alias = "name")]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
}

/// Authors arrive as a bare name or as a user object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Name(String),
    User {
        #[serde(default)]
        name: Option<String>,
    },
}

impl Person {
    pub fn name(&self) -> Option<&str> {
        match self {
            Person::Name(name) => Some(name),
            Person::User { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub user: Option<Person>,
    #[serde(default, alias = "stars", deserialize_with = "lenient_string")]
    pub rating: Option<String>,
    #[serde(default, alias = "message")]
    pub comment: Option<String>,
    #[serde(default, alias = "created_at")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Walkthrough {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub author: Option<Person>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MachineTask {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
}

pub type MachineListing = InfoOrData<Listing<MachineSummary>>;
pub type CreatorsResponse = InfoOrData<Vec<MachineCreator>>;
pub type TagsResponse = InfoOrData<Vec<Tag>>;
pub type ReviewsResponse = InfoOrData<Vec<Review>>;
pub type OwnReviewResponse = InfoOrData<Option<Review>>;
pub type WalkthroughsResponse = InfoOrData<Vec<Walkthrough>>;
pub type TasksResponse = InfoOrData<Vec<MachineTask>>;
pub type ActiveMachineResponse = InfoEnvelope<Option<ActiveMachine>>;
pub type ProfileResponse = InfoEnvelope<MachineProfile>;
pub type ActivityResponse = InfoEnvelope<ActivityInfo>;

pub fn list(client: &HtbClient, filters: &MachineFilters) -> Result<ApiResponse> {
    let path = match filters.status {
        Some(Status::Retired) => "/machine/list/retired/paginated",
        _ => "/machine/paginated",
    };
    client.execute(&ApiRequest::get(path).query(filters.to_query()))
}

pub fn active(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/machine/active"))
}

pub fn profile(client: &HtbClient, slug: &str) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/machine/profile").segment(slug))
}

pub fn activity(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/machine/activity/{id}")))
}

pub fn owns_top(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/machine/owns/top/{id}")))
}

pub fn recommended(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/machine/recommended"))
}

pub fn todo(client: &HtbClient, paging: &Paging) -> Result<ApiResponse> {
    let request = ApiRequest::get("/machine/todo/paginated")
        .param("page", paging.page)
        .param("per_page", paging.per_page);
    client.execute(&request)
}

pub fn retired(client: &HtbClient, paging: &Paging) -> Result<ApiResponse> {
    let request = ApiRequest::get("/machine/list/retired/paginated")
        .param("page", paging.page)
        .param("per_page", paging.per_page);
    client.execute(&request)
}

pub fn recommended_retired(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/machine/recommended/retired"))
}

pub fn unreleased(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/machine/unreleased"))
}

pub fn tags(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/machine/tags/list"))
}

/// Per-machine detail endpoints that take only the numeric ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    Changelog,
    Creators,
    Tags,
    Reviews,
    OwnReview,
    Walkthroughs,
    Writeup,
    Tasks,
    GraphMatrix,
    GraphDifficulty,
}

impl Detail {
    pub fn path(self, id: u64) -> String {
        match self {
            Detail::Changelog => format!("/machine/changelog/{id}"),
            Detail::Creators => format!("/machine/creators/{id}"),
            Detail::Tags => format!("/machine/tags/{id}"),
            Detail::Reviews => format!("/machine/reviews/{id}"),
            Detail::OwnReview => format!("/machine/reviews/user/{id}"),
            Detail::Walkthroughs => format!("/machine/walkthroughs/{id}"),
            Detail::Writeup => format!("/machine/writeup/{id}"),
            Detail::Tasks => format!("/machines/{id}/tasks"),
            Detail::GraphMatrix => format!("/machine/graph/matrix/{id}"),
            Detail::GraphDifficulty => format!("/machine/graph/owns/difficulty/{id}"),
        }
    }
}

pub fn detail(client: &HtbClient, detail: Detail, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(detail.path(id)))
}

/// `period` is passed through as typed (`1W`, `1M`, `3M`, `6M`, `1Y`).
pub fn graph_activity(client: &HtbClient, id: u64, period: &str) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/machine/graph/activity/{id}")).segment(period))
}
