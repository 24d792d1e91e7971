use serde::Deserialize;

use crate::api::home::Notice;
use crate::api::{lenient_string, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct ContentStats {
    #[serde(default, deserialize_with = "lenient_string")]
    pub machines: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub challenges: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub users: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub teams: Option<String>,
}

/// `/content/stats` has been seen both wrapped and bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Wrapped { data: ContentStats },
    Bare(ContentStats),
}

impl StatsResponse {
    pub fn into_stats(self) -> ContentStats {
        match self {
            StatsResponse::Wrapped { data } | StatsResponse::Bare(data) => data,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lab {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One search hit; the display name is in `value`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub machines: Vec<SearchHit>,
    #[serde(default)]
    pub challenges: Vec<SearchHit>,
    #[serde(default)]
    pub users: Vec<SearchHit>,
    #[serde(default)]
    pub teams: Vec<SearchHit>,
}

impl SearchResults {
    /// `(kind, hit)` pairs in a fixed kind order.
    pub fn hits(&self) -> Vec<(&'static str, &SearchHit)> {
        let groups: [(&'static str, &Vec<SearchHit>); 4] = [
            ("machine", &self.machines),
            ("challenge", &self.challenges),
            ("user", &self.users),
            ("team", &self.teams),
        ];
        groups
            .into_iter()
            .flat_map(|(kind, hits)| hits.iter().map(move |hit| (kind, hit)))
            .collect()
    }
}

pub type NoticeListing = InfoOrData<Listing<Notice>>;
pub type LabListing = InfoOrData<Listing<Lab>>;

/// Read-only platform feeds without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Announcements,
    Changelogs,
    Notices,
    ContentStats,
    Labs,
    Navigation,
    SidebarAnnouncement,
    SidebarChangelog,
}

impl Feed {
    fn path(self) -> &'static str {
        match self {
            Feed::Announcements => "/announcements",
            Feed::Changelogs => "/changelogs",
            Feed::Notices => "/notices",
            Feed::ContentStats => "/content/stats",
            Feed::Labs => "/lab/list",
            Feed::Navigation => "/navigation/main",
            Feed::SidebarAnnouncement => "/sidebar/announcement",
            Feed::SidebarChangelog => "/sidebar/changelog",
        }
    }
}

pub fn feed(client: &HtbClient, feed: Feed) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(feed.path()))
}

pub fn search(client: &HtbClient, query: &str, tags: Option<&str>) -> Result<ApiResponse> {
    let mut request = ApiRequest::get("/search/fetch").param("query", query);
    if let Some(tags) = tags {
        request = request.param("tags", tags);
    }
    client.execute(&request)
}
