//! Flag submission: resolve the target, then submit exactly once.

use std::io::Read;

use serde_json::{json, Value};

use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::{HtbError, Result};
use crate::resolve::{resolve, EntityKind, Target};

pub const DEFAULT_CHALLENGE_DIFFICULTY: u8 = 50;

/// What a flag is submitted against, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagTarget {
    Machine(Target),
    Challenge { target: Target, difficulty: u8 },
    Sherlock { target: Target, task: u64 },
}

impl FlagTarget {
    fn kind(&self) -> EntityKind {
        match self {
            FlagTarget::Machine(_) => EntityKind::Machine,
            FlagTarget::Challenge { .. } => EntityKind::Challenge,
            FlagTarget::Sherlock { .. } => EntityKind::Sherlock,
        }
    }

    fn target(&self) -> &Target {
        match self {
            FlagTarget::Machine(target)
            | FlagTarget::Challenge { target, .. }
            | FlagTarget::Sherlock { target, .. } => target,
        }
    }

    fn request(&self, id: u64, flag: &str) -> ApiRequest {
        match self {
            FlagTarget::Machine(_) => ApiRequest::post("/machine/own")
                .v5()
                .json(json!({ "flag": flag, "id": id })),
            FlagTarget::Challenge { difficulty, .. } => ApiRequest::post("/challenge/own").json(
                json!({ "challenge_id": id, "flag": flag, "difficulty": difficulty }),
            ),
            FlagTarget::Sherlock { task, .. } => {
                ApiRequest::post(format!("/sherlocks/{id}/tasks/{task}/flag"))
                    .json(json!({ "flag": flag }))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted { message: String },
    /// Any failure the server reports, including HTTP errors.
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub entity_id: u64,
    pub outcome: Outcome,
    /// Raw exchange of the submit call, kept for `--debug`.
    pub raw: String,
}

/// Explicit argument wins and is sent as typed; otherwise the whole of
/// `stdin`, trailing whitespace stripped.
pub fn read_flag(explicit: Option<&str>, mut stdin: impl Read) -> Result<String> {
    let flag = match explicit {
        Some(flag) => flag.to_string(),
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf.trim_end().to_string()
        }
    };
    if flag.trim().is_empty() {
        return Err(HtbError::EmptyFlag);
    }
    Ok(flag)
}

/// A 2xx body can still carry a failure.
pub fn body_signals_failure(body: &Value) -> bool {
    let flag_false = |key: &str| body.get(key).and_then(Value::as_bool) == Some(false);
    flag_false("success")
        || flag_false("status")
        || body
            .get("error")
            .is_some_and(|e| !e.is_null() && e != &Value::Bool(false))
}

fn classify(response: &ApiResponse) -> Outcome {
    let message = response
        .message()
        .unwrap_or_else(|| response.raw.trim().to_string());
    if body_signals_failure(&response.body) {
        Outcome::Rejected {
            status: response.status,
            message,
        }
    } else {
        Outcome::Accepted { message }
    }
}

pub fn submit_flag(client: &HtbClient, target: &FlagTarget, flag: &str) -> Result<Submission> {
    let entity_id = resolve(client, target.target(), target.kind())?;
    log::info!("submitting flag for {} {entity_id}", target.kind());

    match client.execute(&target.request(entity_id, flag)) {
        Ok(response) => Ok(Submission {
            entity_id,
            outcome: classify(&response),
            raw: response.raw_exchange(),
        }),
        Err(HtbError::Http {
            status,
            message,
            body,
        }) => Ok(Submission {
            entity_id,
            outcome: Outcome::Rejected {
                status,
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
            },
            raw: format!("HTTP {status}\n{body}"),
        }),
        Err(err) => Err(err),
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
    fn explicit_flag_ignores_stdin() {
        let stdin = "HTB{from_pipe}\n".as_bytes();
        assert_eq!(read_flag(Some("HTB{arg}"), stdin).unwrap(), "HTB{arg}");
    }

    #[test]
    fn explicit_flag_sent_as_typed() {
        let stdin = "ignored".as_bytes();
        assert_eq!(read_flag(Some(" HTB{pad} "), stdin).unwrap(), " HTB{pad} ");
    }

    #[test]
    fn piped_flag_keeps_leading_whitespace() {
        assert_eq!(read_flag(None, "  HTB{x}\n".as_bytes()).unwrap(), "  HTB{x}");
    }

    #[test]
    fn piped_flag_trimmed() {
        let stdin = "HTB{from_pipe}\r\n\n".as_bytes();
        assert_eq!(read_flag(None, stdin).unwrap(), "HTB{from_pipe}");
    }

    #[test]
    fn empty_flag_rejected() {
        assert!(matches!(read_flag(None, "\n".as_bytes()), Err(HtbError::EmptyFlag)));
        assert!(matches!(read_flag(Some("  "), "".as_bytes()), Err(HtbError::EmptyFlag)));
    }

    #[test]
    fn failure_markers_in_success_body() {
        assert!(body_signals_failure(&json!({"success": false, "message": "x"})));
        assert!(body_signals_failure(&json!({"status": false})));
        assert!(body_signals_failure(&json!({"error": "Incorrect flag"})));
        assert!(!body_signals_failure(&json!({"success": true, "message": "ok"})));
        assert!(!body_signals_failure(&json!({"error": null})));
        assert!(!body_signals_failure(&json!({"status": 200})));
    }

    #[test]
    fn machine_flag_accepted() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/machine/profile/lame")
            .with_body(r#"{"info":{"id":1,"name":"Lame"}}"#)
            .create();
        let own = server
            .mock("POST", "/machine/own")
            .match_body(Matcher::Json(json!({"flag": "abc", "id": 1})))
            .with_body(r#"{"success":true,"message":"Lame user is now owned."}"#)
            .expect(1)
            .create();

        let target = FlagTarget::Machine(Target::Slug("lame".into()));
        let submission = submit_flag(&client_for(&server), &target, "abc").unwrap();
        assert_eq!(submission.entity_id, 1);
        assert_eq!(
            submission.outcome,
            Outcome::Accepted {
                message: "Lame user is now owned.".into()
            }
        );
        own.assert();
    }

    #[test]
    fn already_owned_rejected_verbatim() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/machine/own")
            .with_status(400)
            .with_body(r#"{"message":"Lame root is already owned."}"#)
            .create();

        let target = FlagTarget::Machine(Target::Id(1));
        let submission = submit_flag(&client_for(&server), &target, "abc").unwrap();
        assert_eq!(
            submission.outcome,
            Outcome::Rejected {
                status: 400,
                message: "Lame root is already owned.".into()
            }
        );
        assert!(submission.raw.starts_with("HTTP 400\n"));
    }

    #[test]
    fn ok_status_with_failure_body_is_rejected() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/challenge/own")
            .match_body(Matcher::Json(
                json!({"challenge_id": 9, "flag": "abc", "difficulty": 50}),
            ))
            .with_body(r#"{"message":"Incorrect flag","success":false}"#)
            .create();

        let target = FlagTarget::Challenge {
            target: Target::Id(9),
            difficulty: DEFAULT_CHALLENGE_DIFFICULTY,
        };
        let submission = submit_flag(&client_for(&server), &target, "abc").unwrap();
        assert_eq!(
            submission.outcome,
            Outcome::Rejected {
                status: 200,
                message: "Incorrect flag".into()
            }
        );
    }

    #[test]
    fn sherlock_task_flag_path() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/sherlocks/3/tasks/17/flag")
            .match_body(Matcher::Json(json!({"flag": "10.0.0.5"})))
            .with_body(r#"{"message":"Correct flag"}"#)
            .create();

        let target = FlagTarget::Sherlock {
            target: Target::Id(3),
            task: 17,
        };
        let submission = submit_flag(&client_for(&server), &target, "10.0.0.5").unwrap();
        assert!(matches!(submission.outcome, Outcome::Accepted { .. }));
        mock.assert();
    }

    #[test]
    fn resolution_failure_never_submits() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/machine/active")
            .with_body(r#"{"info":null}"#)
            .create();
        let own = server.mock("POST", Matcher::Any).expect(0).create();

        let target = FlagTarget::Machine(Target::Active);
        let err = submit_flag(&client_for(&server), &target, "abc").unwrap_err();
        assert!(matches!(err, HtbError::NoActiveTarget(EntityKind::Machine)));
        own.assert();
    }
}
