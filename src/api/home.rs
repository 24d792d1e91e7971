use serde::Deserialize;

use crate::api::{lenient_bool, lenient_string, InfoOrData};
use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

/// Banners, announcements and notices all share this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notice {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
}

impl Notice {
    pub fn when(&self) -> Option<&str> {
        self.date.as_deref().or(self.created_at.as_deref())
    }
}

/// Single notices come back as `null` when nothing is posted.
pub type NoticeResponse = InfoOrData<Option<Notice>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Main,
    Announcement,
    Changelog,
    Notice,
}

impl Banner {
    fn path(self) -> &'static str {
        match self {
            Banner::Main => "/home/banner",
            Banner::Announcement => "/home/banner/announcement",
            Banner::Changelog => "/home/banner/changelog",
            Banner::Notice => "/home/banner/notice",
        }
    }
}

pub fn banner(client: &HtbClient, banner: Banner) -> Result<ApiResponse> {
    client.execute(&ApiRequest::get(banner.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_notice_decodes_as_none() {
        let resp: NoticeResponse = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(resp.data.is_none());
    }

    #[test]
    fn notice_fields_are_lenient() {
        let body = r#"{"data":{"title":"Maintenance","type":"warning","priority":2,"active":1,
            "created_at":"2024-04-01 10:00:00"}}"#;
        let notice = serde_json::from_str::<NoticeResponse>(body).unwrap().data.unwrap();
        assert_eq!(notice.priority.as_deref(), Some("2"));
        assert_eq!(notice.active, Some(true));
        assert_eq!(notice.when(), Some("2024-04-01 10:00:00"));
    }

    #[test]
    fn changelog_banner_path() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/home/banner/changelog")
            .with_body(r#"{"data":[]}"#)
            .create();
        let client = HtbClient::new(&server.url(), "tok", 5.0).unwrap();
        banner(&client, Banner::Changelog).unwrap();
        mock.assert();
    }
}
