//! Turns what the user typed (an ID, a name, or "active") into the numeric ID
//! that the write endpoints require.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::api::Listing;
use crate::client::{ApiRequest, HtbClient};
use crate::error::{HtbError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Machine,
    Challenge,
    Sherlock,
    Track,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Machine => "machine",
            EntityKind::Challenge => "challenge",
            EntityKind::Sherlock => "sherlock",
            EntityKind::Track => "track",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(u64),
    Slug(String),
    Active,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err("target must not be empty".into());
        }
        if value.eq_ignore_ascii_case("active") {
            return Ok(Target::Active);
        }
        Ok(value
            .parse::<u64>()
            .map(Target::Id)
            .unwrap_or_else(|_| Target::Slug(value.to_string())))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Id(id) => write!(f, "{id}"),
            Target::Slug(slug) => f.write_str(slug),
            Target::Active => f.write_str("active"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntity {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct InfoEnvelope {
    #[serde(default)]
    info: Option<NamedEntity>,
}

/// First entity whose name equals `name` ignoring case. When several share a
/// name, the API's ordering decides.
pub fn pick_by_name<'a>(entities: &'a [NamedEntity], name: &str) -> Option<&'a NamedEntity> {
    let wanted = name.to_lowercase();
    entities
        .iter()
        .find(|e| e.name.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str()))
}

fn not_found(kind: EntityKind, reference: &str) -> HtbError {
    HtbError::NotFound {
        kind,
        reference: reference.to_string(),
    }
}

/// The profile endpoint is lenient about what it matches, so the answer only
/// counts when its name is the one the user typed.
fn resolve_machine_slug(client: &HtbClient, slug: &str) -> Result<u64> {
    let request = ApiRequest::get("/machine/profile").segment(slug);
    let resp = match client.execute(&request) {
        Ok(resp) => resp,
        Err(HtbError::Http { status: 404, .. }) => {
            return Err(not_found(EntityKind::Machine, slug));
        }
        Err(e) => return Err(e),
    };
    let envelope: InfoEnvelope = resp.decode()?;
    let candidates: Vec<NamedEntity> = envelope.info.into_iter().collect();
    pick_by_name(&candidates, slug)
        .map(|machine| machine.id)
        .ok_or_else(|| not_found(EntityKind::Machine, slug))
}

fn resolve_by_listing(client: &HtbClient, kind: EntityKind, name: &str) -> Result<u64> {
    let path = match kind {
        EntityKind::Challenge => "/challenges",
        EntityKind::Sherlock => "/sherlocks",
        EntityKind::Track => "/tracks",
        EntityKind::Machine => "/machine/paginated",
    };
    let resp = client.execute(&ApiRequest::get(path).param("keyword", name))?;
    let entities = resp.decode::<Listing<NamedEntity>>()?.into_items();
    pick_by_name(&entities, name)
        .map(|entity| entity.id)
        .ok_or_else(|| not_found(kind, name))
}

/// The machine currently provisioned for the user, if any.
pub fn active_machine(client: &HtbClient) -> Result<Option<NamedEntity>> {
    let resp = client.execute(&ApiRequest::get("/machine/active"))?;
    let envelope: InfoEnvelope = resp.decode()?;
    Ok(envelope.info)
}

pub fn resolve(client: &HtbClient, target: &Target, kind: EntityKind) -> Result<u64> {
    match target {
        Target::Id(id) => Ok(*id),
        Target::Slug(slug) => {
            log::info!("resolving {kind} {slug:?}");
            match kind {
                EntityKind::Machine => resolve_machine_slug(client, slug),
                EntityKind::Challenge | EntityKind::Sherlock | EntityKind::Track => {
                    resolve_by_listing(client, kind, slug)
                }
            }
        }
        Target::Active => {
            if kind != EntityKind::Machine {
                return Err(HtbError::NoActiveTarget(kind));
            }
            log::info!("resolving active machine");
            active_machine(client)?
                .map(|machine| machine.id)
                .ok_or(HtbError::NoActiveTarget(kind))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> HtbClient {
        HtbClient::new(&server.url(), "tok", 5.0).unwrap()
    }

    #[test]
    fn parse_target_variants() {
        assert_eq!("123".parse::<Target>().unwrap(), Target::Id(123));
        assert_eq!("Active".parse::<Target>().unwrap(), Target::Active);
        assert_eq!(
            "lame".parse::<Target>().unwrap(),
            Target::Slug("lame".into())
        );
        assert_eq!(
            "-5".parse::<Target>().unwrap(),
            Target::Slug("-5".into())
        );
        assert!("  ".parse::<Target>().is_err());
    }

    #[test]
    fn numeric_target_skips_network() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let client = client_for(&server);
        for kind in [EntityKind::Machine, EntityKind::Challenge, EntityKind::Sherlock] {
            assert_eq!(resolve(&client, &Target::Id(42), kind).unwrap(), 42);
        }
        mock.assert();
    }

    #[test]
    fn machine_slug_resolved_via_profile() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/machine/profile/Lame")
            .with_body(r#"{"info":{"id":1,"name":"Lame"}}"#)
            .create();

        let id = resolve(
            &client_for(&server),
            &Target::Slug("Lame".into()),
            EntityKind::Machine,
        )
        .unwrap();
        assert_eq!(id, 1);
        mock.assert();
    }

    #[test]
    fn machine_slug_with_url_syntax_stays_one_segment() {
        let mut server = mockito::Server::new();
        let truncated = server
            .mock("GET", "/machine/profile/what")
            .match_query(Matcher::Any)
            .with_body(r#"{"info":{"id":77,"name":"what"}}"#)
            .expect(0)
            .create();
        let encoded = server
            .mock("GET", "/machine/profile/what%3Fx=1")
            .with_status(404)
            .with_body(r#"{"message":"Machine not found"}"#)
            .create();

        let err = resolve(
            &client_for(&server),
            &Target::Slug("what?x=1".into()),
            EntityKind::Machine,
        )
        .unwrap_err();
        assert!(matches!(err, HtbError::NotFound { kind: EntityKind::Machine, .. }));
        encoded.assert();
        truncated.assert();
    }

    #[test]
    fn machine_profile_with_other_name_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/machine/profile/lam")
            .with_body(r#"{"info":{"id":1,"name":"Lame"}}"#)
            .create();

        let err = resolve(
            &client_for(&server),
            &Target::Slug("lam".into()),
            EntityKind::Machine,
        )
        .unwrap_err();
        assert!(matches!(err, HtbError::NotFound { kind: EntityKind::Machine, .. }));
    }

    #[test]
    fn machine_slug_404_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/machine/profile/ghost")
            .with_status(404)
            .with_body(r#"{"message":"Machine not found"}"#)
            .create();

        let err = resolve(
            &client_for(&server),
            &Target::Slug("ghost".into()),
            EntityKind::Machine,
        )
        .unwrap_err();
        assert!(matches!(err, HtbError::NotFound { kind: EntityKind::Machine, .. }));
    }

    #[test]
    fn challenge_name_matched_case_insensitively() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/challenges")
            .match_query(Matcher::UrlEncoded("keyword".into(), "weak rsa".into()))
            .with_body(
                r#"{"data":[{"id":5,"name":"Weak RSA Revenge"},{"id":6,"name":"Weak RSA"}]}"#,
            )
            .create();

        let id = resolve(
            &client_for(&server),
            &Target::Slug("weak rsa".into()),
            EntityKind::Challenge,
        )
        .unwrap();
        assert_eq!(id, 6);
        mock.assert();
    }

    #[test]
    fn duplicate_names_take_first_returned() {
        let entities = vec![
            NamedEntity {
                id: 9,
                name: Some("Brutus".into()),
            },
            NamedEntity {
                id: 3,
                name: Some("BRUTUS".into()),
            },
        ];
        assert_eq!(pick_by_name(&entities, "brutus").unwrap().id, 9);
    }

    #[test]
    fn sherlock_without_exact_match_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/sherlocks")
            .match_query(Matcher::UrlEncoded("keyword".into(), "brut".into()))
            .with_body(r#"{"data":[{"id":3,"name":"Brutus"}]}"#)
            .create();

        let err = resolve(
            &client_for(&server),
            &Target::Slug("brut".into()),
            EntityKind::Sherlock,
        )
        .unwrap_err();
        match err {
            HtbError::NotFound { kind, reference } => {
                assert_eq!(kind, EntityKind::Sherlock);
                assert_eq!(reference, "brut");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn active_machine_resolved() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/machine/active")
            .with_body(r#"{"info":{"id":811,"name":"Sea","type":"Free"}}"#)
            .create();

        let id = resolve(&client_for(&server), &Target::Active, EntityKind::Machine).unwrap();
        assert_eq!(id, 811);
    }

    #[test]
    fn no_active_machine() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/machine/active")
            .with_body(r#"{"info":null}"#)
            .create();

        let err = resolve(&client_for(&server), &Target::Active, EntityKind::Machine).unwrap_err();
        assert!(matches!(err, HtbError::NoActiveTarget(EntityKind::Machine)));
    }

    #[test]
    fn track_name_resolved_from_flat_listing() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/tracks")
            .match_query(Matcher::UrlEncoded("keyword".into(), "intro to zephyr".into()))
            .with_body(r#"[{"id":4,"name":"Beginner Track"},{"id":12,"name":"Intro to Zephyr"}]"#)
            .create();

        let id = resolve(
            &client_for(&server),
            &Target::Slug("intro to zephyr".into()),
            EntityKind::Track,
        )
        .unwrap();
        assert_eq!(id, 12);
        mock.assert();
    }

    #[test]
    fn active_unsupported_for_challenges() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let err =
            resolve(&client_for(&server), &Target::Active, EntityKind::Challenge).unwrap_err();
        assert!(matches!(err, HtbError::NoActiveTarget(EntityKind::Challenge)));
        mock.assert();
    }
}
