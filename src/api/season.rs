use clap::ValueEnum;
use serde::Deserialize;

use crate::api::{lenient_bool, lenient_string, DataEnvelope, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Leaderboard {
    Players,
    Teams,
    Countries,
    Universities,
}

impl Leaderboard {
    fn path_segment(self) -> &'static str {
        match self {
            Leaderboard::Players => "players",
            Leaderboard::Teams => "teams",
            Leaderboard::Countries => "countries",
            Leaderboard::Universities => "universities",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Season {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonMachine {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub difficulty_text: Option<String>,
    #[serde(default)]
    pub release_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonRank {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rank: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_season_points: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_ranks: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rank: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub flags: Option<String>,
}

pub type SeasonListing = DataEnvelope<Vec<Season>>;
pub type MachinesResponse = DataEnvelope<Vec<SeasonMachine>>;
pub type ActiveMachineResponse = DataEnvelope<Option<SeasonMachine>>;
pub type RankResponse = DataEnvelope<SeasonRank>;
pub type LeaderboardResponse = InfoOrData<Listing<LeaderboardEntry>>;

pub fn list(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/season/list"))
}

pub fn machines(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/season/machines"))
}

pub fn active_machine(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/season/machine/active"))
}

pub fn rank(client: &HtbClient, season_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/season/user/rank/{season_id}")))
}

pub fn leaderboard(
    client: &HtbClient,
    board: Leaderboard,
    season_id: Option<u64>,
) -> Result<ApiResponse> {
    let mut request = ApiRequest::get(format!("/season/{}/leaderboard", board.path_segment()));
    if let Some(id) = season_id {
        request = request.param("season", id);
    }
    client.execute(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn leaderboard_passes_season() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/season/teams/leaderboard")
            .match_query(Matcher::UrlEncoded("season".into(), "7".into()))
            .with_body(r#"{"data":[{"rank":1,"name":"pwners","points":"1200"}]}"#)
            .create();

        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        let resp: LeaderboardResponse = leaderboard(&client, Leaderboard::Teams, Some(7))
            .unwrap()
            .decode()
            .unwrap();
        let rows = resp.data.into_items();
        assert_eq!(rows[0].rank.as_deref(), Some("1"));
        assert_eq!(rows[0].points.as_deref(), Some("1200"));
        mock.assert();
    }

    #[test]
    fn active_season_machine_may_be_null() {
        let resp: ActiveMachineResponse = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(resp.data.is_none());
    }
}
