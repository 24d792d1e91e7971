use serde::Deserialize;

use crate::api::catalog::Writeup;
use crate::api::{lenient_bool, lenient_string, InfoOrData, Listing};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;
use crate::query::Paging;

#[derive(Debug, Clone, Deserialize)]
pub struct Creator {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub complete: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub creator: Option<Creator>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub official: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub likes: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub enrolled: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<TrackItem>,
}

impl Track {
    pub fn creator_name(&self) -> Option<&str> {
        self.creator.as_ref().and_then(|c| c.name.as_deref())
    }

    /// Items of one kind (`machine`, `challenge`), in track order.
    pub fn items_of(&self, kind: &str) -> Vec<&TrackItem> {
        self.items
            .iter()
            .filter(|item| item.kind.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(kind)))
            .collect()
    }
}

/// `/tracks/{id}` answers either bare or under `data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TrackResponse {
    Wrapped { data: Track },
    Bare(Track),
}

impl TrackResponse {
    pub fn into_track(self) -> Track {
        match self {
            TrackResponse::Wrapped { data } | TrackResponse::Bare(data) => data,
        }
    }
}

pub type TrackListing = Listing<Track>;
pub type WriteupResponse = InfoOrData<Writeup>;

pub fn list(client: &HtbClient, paging: &Paging) -> Result<ApiResponse> {
    let request = ApiRequest::get("/tracks")
        .param("page", paging.page)
        .param("per_page", paging.per_page);
    client.execute(&request)
}

pub fn info(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/tracks/{id}")))
}

pub fn writeup(client: &HtbClient, id: u64) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(format!("/tracks/{id}/writeup")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_items_split_by_kind() {
        let body = r#"{"id":12,"name":"Intro to Zephyr","creator":{"name":"HTB"},"official":1,
            "items":[{"id":1,"name":"Lame","type":"machine","os":"Linux","complete":true},
                     {"id":2,"name":"Weak RSA","type":"challenge","category":5},
                     {"id":3,"name":"Jerry","type":"Machine","complete":0}]}"#;
        let track = serde_json::from_str::<TrackResponse>(body).unwrap().into_track();
        assert_eq!(track.creator_name(), Some("HTB"));
        assert_eq!(track.official, Some(true));
        let machines = track.items_of("machine");
        assert_eq!(machines.len(), 2);
        assert_eq!(machines[1].complete, Some(false));
        assert_eq!(track.items_of("challenge")[0].category.as_deref(), Some("5"));
    }

    #[test]
    fn wrapped_track_unwrapped() {
        let track = serde_json::from_str::<TrackResponse>(r#"{"data":{"id":4,"name":"Beginner"}}"#)
            .unwrap()
            .into_track();
        assert_eq!(track.id, Some(4));
    }

    #[test]
    fn list_sends_paging() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/tracks")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("page".into(), "1".into()),
                mockito::Matcher::UrlEncoded("per_page".into(), "20".into()),
            ]))
            .with_body(r#"[{"id":4,"name":"Beginner","likes":10}]"#)
            .create();

        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        let tracks: TrackListing = list(&client, &Paging::default()).unwrap().decode().unwrap();
        assert_eq!(tracks.into_items()[0].likes.as_deref(), Some("10"));
        mock.assert();
    }
}
