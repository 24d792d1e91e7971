use serde::Deserialize;

use crate::api::{lenient_string, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;
use crate::query::Paging;

#[derive(Debug, Clone, Deserialize)]
pub struct University {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub users_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub respected_by_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityStats {
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity_count: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnStats {
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_owns: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub machine_owns: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub challenge_owns: Option<String>,
}

pub type UniversityListing = InfoOrData<Listing<University>>;
pub type ProfileResponse = InfoOrData<University>;
pub type MembersResponse = InfoOrData<Vec<Member>>;
pub type ActivityResponse = InfoOrData<ActivityStats>;
pub type OwnStatsResponse = InfoOrData<OwnStats>;

/// The three paginated university listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    All,
    Top,
    New,
}

impl Board {
    fn path(self) -> &'static str {
        match self {
            Board::All => "/university/all/list",
            Board::Top => "/university/top/list",
            Board::New => "/university/new/list",
        }
    }
}

pub fn list(client: &HtbClient, board: Board, paging: &Paging) -> Result<ApiResponse> {
    let request = ApiRequest::get(board.path())
        .param("page", paging.page)
        .param("per_page", paging.per_page);
    client.execute(&request)
}

pub fn profile(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/university/profile/{id}")))
}

pub fn members(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/university/members/{id}")))
}

pub fn activity(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/university/activity/{id}")))
}

pub fn user_owns(client: &HtbClient, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/university/stats/owns/{user_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_board_has_its_own_endpoint() {
        let mut server = mockito::Server::new();
        let mocks: Vec<_> = ["all", "top", "new"]
            .iter()
            .map(|board| {
                server
                    .mock("GET", format!("/university/{board}/list").as_str())
                    .match_query(mockito::Matcher::Any)
                    .with_body(r#"{"data":{"data":[]}}"#)
                    .create()
            })
            .collect();

        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        for board in [Board::All, Board::Top, Board::New] {
            list(&client, board, &Paging::default()).unwrap();
        }
        for mock in mocks {
            mock.assert();
        }
    }

    #[test]
    fn university_counts_accept_numbers() {
        let body = r#"{"data":{"id":5,"name":"MIT","country":"US","users_count":120,"respected_by_count":"8"}}"#;
        let resp: ProfileResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.users_count.as_deref(), Some("120"));
        assert_eq!(resp.data.respected_by_count.as_deref(), Some("8"));
    }
}
