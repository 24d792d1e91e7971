use clap::ValueEnum;
use serde::Deserialize;

use crate::api::badges::Badge;
use crate::api::{lenient_bool, lenient_string, ActivityInfo, InfoEnvelope, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, rename = "isVip", deserialize_with = "lenient_bool")]
    pub vip: Option<bool>,
    #[serde(default, rename = "subscriptionType")]
    pub subscription: Option<String>,
    #[serde(default)]
    pub team: Option<Team>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ranking: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_owns: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub system_owns: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub respects: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub team: Option<Team>,
}

/// Profile endpoints wrap their payload in `profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEnvelope<T> {
    #[serde(alias = "data")]
    pub profile: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Blood {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "created_at")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bloods {
    #[serde(default)]
    pub machines: Vec<Blood>,
    #[serde(default)]
    pub challenges: Vec<Blood>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BadgesInfo {
    #[serde(default)]
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Follower {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: Option<String>,
}

/// The five progress breakdowns on a public profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Progress {
    Challenges,
    Fortress,
    MachinesOs,
    Prolab,
    Sherlocks,
}

impl Progress {
    pub fn path(self, user_id: u64) -> String {
        let kind = match self {
            Progress::Challenges => "challenges",
            Progress::Fortress => "fortress",
            Progress::MachinesOs => "machines/os",
            Progress::Prolab => "prolab",
            Progress::Sherlocks => "sherlocks",
        };
        format!("/user/profile/progress/{kind}/{user_id}")
    }
}

/// Social actions on another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Social {
    Follow,
    Unfollow,
    Respect,
    Disrespect,
}

impl Social {
    pub fn verb(self) -> &'static str {
        match self {
            Social::Follow => "follow",
            Social::Unfollow => "unfollow",
            Social::Respect => "respect",
            Social::Disrespect => "disrespect",
        }
    }
}

pub type InfoResponse = InfoEnvelope<UserInfo>;
pub type ProfileResponse = ProfileEnvelope<UserProfile>;
pub type ActivityResponse = ProfileEnvelope<ActivityInfo>;
pub type BloodsResponse = ProfileEnvelope<Bloods>;
pub type FollowersResponse = InfoOrData<Listing<Follower>>;

pub fn info(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/user/info"))
}

pub fn summary(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/user/profile/summary"))
}

pub fn profile(client: &HtbClient, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/user/profile/basic/{user_id}")))
}

pub fn activity(client: &HtbClient, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/user/profile/activity/{user_id}")))
}

pub fn badges(client: &HtbClient, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/user/profile/badges/{user_id}")))
}

pub fn bloods(client: &HtbClient, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/user/profile/bloods/{user_id}")))
}

pub fn progress(client: &HtbClient, kind: Progress, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(kind.path(user_id)))
}

pub fn followers(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/user/followers"))
}

pub fn tracks(client: &HtbClient) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get("/user/tracks"))
}

pub fn social(client: &HtbClient, action: Social, user_id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::post(format!("/user/{}/{user_id}", action.verb())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_decodes_mixed_number_types() {
        let body = r#"{"profile":{"id":1,"name":"neo","rank":"Hacker","ranking":"512",
            "points":88,"user_owns":10,"system_owns":"9","team":{"name":"zion"}}}"#;
        let resp: ProfileResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.profile.points.as_deref(), Some("88"));
        assert_eq!(resp.profile.system_owns.as_deref(), Some("9"));
        assert_eq!(
            resp.profile.team.and_then(|t| t.name).as_deref(),
            Some("zion")
        );
    }

    #[test]
    fn activity_under_profile() {
        let body = r#"{"profile":{"activity":[{"date":"2024-01-02T00:00:00.000000Z",
            "type":"root","name":"Lame","object_type":"machine"}]}}"#;
        let resp: ActivityResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.profile.activity[0].subject(), Some("Lame"));
    }

    #[test]
    fn progress_paths() {
        assert_eq!(
            Progress::MachinesOs.path(4),
            "/user/profile/progress/machines/os/4"
        );
        assert_eq!(Progress::Fortress.path(4), "/user/profile/progress/fortress/4");
    }

    #[test]
    fn bloods_split_by_kind() {
        let body = r#"{"profile":{"machines":[{"id":1,"name":"Lame","type":"root"}],"challenges":[]}}"#;
        let resp: BloodsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.profile.machines[0].kind.as_deref(), Some("root"));
        assert!(resp.profile.challenges.is_empty());
    }

    #[test]
    fn respect_posts_to_user() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/user/respect/42")
            .with_body(r#"{"message":"Respected"}"#)
            .create();
        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        let resp = social(&client, Social::Respect, 42).unwrap();
        assert_eq!(resp.message().as_deref(), Some("Respected"));
        mock.assert();
    }
}
