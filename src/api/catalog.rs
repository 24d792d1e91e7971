//! Product families that share one endpoint layout: `<prefix>/list`,
//! `<prefix>/info/{slug}`, `<prefix>/recommended`, `<prefix>/activity/{id}`,
//! `<prefix>/changelog/{id}` and `<prefix>/{id}/writeup[/official]`.

use serde::Deserialize;

use crate::api::{lenient_string, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;
use crate::query::Paging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Prolab,
    Fortress,
    StartingPoint,
    Career,
    Ranking,
    Team,
}

/// One table column of a catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Kind,
    Category,
    Difficulty,
    Points,
    Status,
    Machines,
    Members,
    Participants,
    StartDate,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Name => "Name",
            Column::Kind => "Type",
            Column::Category => "Category",
            Column::Difficulty => "Difficulty",
            Column::Points => "Points",
            Column::Status => "Status",
            Column::Machines => "Machines",
            Column::Members => "Members",
            Column::Participants => "Participants",
            Column::StartDate => "Start Date",
        }
    }
}

impl Catalog {
    fn prefix(self) -> &'static str {
        match self {
            Catalog::Prolab => "/prolab",
            Catalog::Fortress => "/fortress",
            Catalog::StartingPoint => "/starting-point",
            Catalog::Career => "/career",
            Catalog::Ranking => "/ranking",
            Catalog::Team => "/team",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Catalog::Prolab => "ProLab",
            Catalog::Fortress => "Fortress",
            Catalog::StartingPoint => "Starting Point",
            Catalog::Career => "Career",
            Catalog::Ranking => "Ranking",
            Catalog::Team => "Team",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        use Column::*;
        match self {
            Catalog::Prolab | Catalog::Fortress => {
                &[Id, Name, Difficulty, Points, Status, Machines]
            }
            Catalog::StartingPoint => &[Id, Name, Difficulty, Points, Status, Category],
            Catalog::Career => &[Id, Name, Category, Difficulty, Points, Status],
            Catalog::Ranking => &[Id, Name, Kind, Status, Participants, StartDate],
            Catalog::Team => &[Id, Name, Kind, Status, Members, Points],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "difficultyText")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub machines_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub members_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub participants: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CatalogEntry {
    /// Raw field behind `column`; formatting is the caller's business.
    pub fn field(&self, column: Column) -> Option<String> {
        match column {
            Column::Id => self.id.map(|id| id.to_string()),
            Column::Name => self.name.clone(),
            Column::Kind => self.kind.clone(),
            Column::Category => self.category.clone(),
            Column::Difficulty => self.difficulty.clone(),
            Column::Points => self.points.clone(),
            Column::Status => self.status.clone(),
            Column::Machines => self.machines_count.clone(),
            Column::Members => self.members_count.clone(),
            Column::Participants => self.participants.clone(),
            Column::StartDate => self.start_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogActivity {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
}

impl ChangeEntry {
    pub fn when(&self) -> Option<&str> {
        self.date.as_deref().or(self.created_at.as_deref())
    }

    pub fn text(&self) -> Option<&str> {
        self.description.as_deref().or(self.title.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Writeup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

pub type CatalogListing = InfoOrData<Listing<CatalogEntry>>;
pub type InfoResponse = InfoOrData<CatalogEntry>;
pub type ActivityResponse = InfoOrData<Vec<CatalogActivity>>;
pub type ChangelogResponse = InfoOrData<Vec<ChangeEntry>>;
pub type WriteupResponse = InfoOrData<Writeup>;

pub fn list(client: &HtbClient, catalog: Catalog, paging: &Paging) -> Result<ApiResponse> {
    let request = ApiRequest::get(format!("{}/list", catalog.prefix()))
        .param("page", paging.page)
        .param("per_page", paging.per_page);
    client.execute(&request)
}

pub fn info(client: &HtbClient, catalog: Catalog, slug: &str) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("{}/info", catalog.prefix())).segment(slug))
}

pub fn recommended(client: &HtbClient, catalog: Catalog) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("{}/recommended", catalog.prefix())))
}

pub fn activity(client: &HtbClient, catalog: Catalog, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("{}/activity/{id}", catalog.prefix())))
}

pub fn changelog(client: &HtbClient, catalog: Catalog, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("{}/changelog/{id}", catalog.prefix())))
}

pub fn writeup(client: &HtbClient, catalog: Catalog, id: u64, official: bool) -> Result<ApiResponse> {
    let suffix = if official { "/official" } else { "" };
    client.execute(&ApiRequest::get(format!(
        "{}/{id}/writeup{suffix}",
        catalog.prefix()
    )))
}
