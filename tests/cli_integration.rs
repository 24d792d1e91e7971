use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use serde_json::json;

/// Binary isolated from the developer's own token, config file and `./.env`.
fn htbcli(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("htbcli");
    cmd.env_remove("HTB_TOKEN")
        .env_remove("HTB_BASE_URL")
        .env_remove("HTB_TIMEOUT")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .current_dir(home);
    cmd
}

fn authed(home: &Path, server: &mockito::ServerGuard) -> Command {
    let mut cmd = htbcli(home);
    cmd.env("HTB_TOKEN", "test-token")
        .env("HTB_BASE_URL", format!("{}/api/v4", server.url()));
    cmd
}

#[test]
fn help_flag_works() {
    let dir = tempfile::tempdir().unwrap();
    htbcli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("htbcli"))
        .stdout(predicate::str::contains("machines"));
}

#[test]
fn missing_token_fails_without_calling_api() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    htbcli(dir.path())
        .env("HTB_BASE_URL", format!("{}/api/v4", server.url()))
        .args(["machines", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing API token"));
    mock.assert();
}

#[test]
fn huge_timeout_is_reported_not_panicked() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    authed(dir.path(), &server)
        .env("HTB_TIMEOUT", "1e300")
        .args(["machines", "active"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTB_TIMEOUT must be a positive number"))
        .stderr(predicate::str::contains("panicked").not());
    mock.assert();
}

#[test]
fn token_from_dotenv_in_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/machine/active")
        .match_header("Authorization", "Bearer from-dotenv")
        .with_body(r#"{"info":null}"#)
        .create();
    std::fs::write(
        dir.path().join(".env"),
        format!(
            "HTB_TOKEN=from-dotenv\nHTB_BASE_URL={}/api/v4\n",
            server.url()
        ),
    )
    .unwrap();

    htbcli(dir.path())
        .args(["machines", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active machine."));
    mock.assert();
}

#[test]
fn invalid_filter_rejected_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    authed(dir.path(), &server)
        .args(["machines", "list", "--difficulty", "impossible"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("impossible"));
    mock.assert();
}

#[test]
fn machine_list_sends_filters() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/machine/paginated")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("difficulty".into(), "easy".into()),
            Matcher::UrlEncoded("sort_by".into(), "rating".into()),
            Matcher::UrlEncoded("sort_type".into(), "desc".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("per_page".into(), "20".into()),
        ]))
        .with_body(
            r#"{"data":[{"id":1,"name":"Lame","os":"Linux","difficultyText":"Easy",
                "points":20,"star":4.4,"release":"2017-03-14T19:00:00.000000Z"}]}"#,
        )
        .create();

    authed(dir.path(), &server)
        .args([
            "machines",
            "list",
            "--status",
            "active",
            "--difficulty",
            "easy",
            "--sort-by",
            "rating",
            "--sort-type",
            "desc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lame"))
        .stdout(predicate::str::contains("2017-03-14"));
    mock.assert();
}

#[test]
fn machine_submit_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v5/machine/own")
        .match_header("Authorization", "Bearer test-token")
        .match_body(Matcher::Json(json!({"flag": "HTB{user}", "id": 1})))
        .with_body(r#"{"success":true,"message":"Lame user is now owned."}"#)
        .expect(1)
        .create();

    authed(dir.path(), &server)
        .args(["machines", "submit", "HTB{user}", "--target", "1"])
        .write_stdin("ignored-from-stdin\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lame user is now owned."));
    mock.assert();
}

#[test]
fn machine_submit_reads_stdin_and_resolves_active() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let active = server
        .mock("GET", "/api/v4/machine/active")
        .with_body(r#"{"info":{"id":42,"name":"Lame","type":"Free","ip":"10.10.10.3"}}"#)
        .create();
    let own = server
        .mock("POST", "/api/v5/machine/own")
        .match_body(Matcher::Json(json!({"flag": "HTB{piped}", "id": 42})))
        .with_body(r#"{"message":"Correct flag!"}"#)
        .expect(1)
        .create();

    authed(dir.path(), &server)
        .args(["machines", "submit"])
        .write_stdin("HTB{piped}\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct flag!"));
    active.assert();
    own.assert();
}

#[test]
fn already_owned_machine_is_rejected_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let profile = server
        .mock("GET", "/api/v4/machine/profile/owned-machine")
        .with_body(r#"{"info":{"id":7,"name":"owned-machine"}}"#)
        .create();
    let own = server
        .mock("POST", "/api/v5/machine/own")
        .with_status(400)
        .with_body(r#"{"message":"Machine user already owned."}"#)
        .expect(1)
        .create();

    authed(dir.path(), &server)
        .args(["machines", "submit", "HTB{again}", "--target", "owned-machine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Machine user already owned."));
    profile.assert();
    own.assert();
}

#[test]
fn submit_without_active_machine_never_posts() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let active = server
        .mock("GET", "/api/v4/machine/active")
        .with_body(r#"{"info":null}"#)
        .create();
    let own = server
        .mock("POST", "/api/v5/machine/own")
        .expect(0)
        .create();

    authed(dir.path(), &server)
        .args(["machines", "submit", "HTB{x}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active machine"));
    active.assert();
    own.assert();
}

#[test]
fn vm_spawn_conflict_surfaces_message_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v4/vm/spawn")
        .match_body(Matcher::Json(json!({"machine_id": 123})))
        .with_status(400)
        .with_body(r#"{"message":"You already have an active machine."}"#)
        .expect(1)
        .create();

    authed(dir.path(), &server)
        .args(["vm", "spawn", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "You already have an active machine.",
        ));
    mock.assert();
}

#[test]
fn debug_prints_raw_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v4/user/info")
        .with_body(r#"{"info":{"id":9,"name":"neo"}}"#)
        .create();

    authed(dir.path(), &server)
        .args(["--debug", "user", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HTTP 200"))
        .stdout(predicate::str::contains(r#"{"info":{"id":9,"name":"neo"}}"#));
}

#[test]
fn debug_prints_raw_exchange_on_http_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v4/season/list")
        .with_status(500)
        .with_body("upstream exploded")
        .create();

    authed(dir.path(), &server)
        .args(["season", "list", "--debug"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("HTTP 500\nupstream exploded"))
        .stderr(predicate::str::contains("error: HTTP 500"));
}

#[test]
fn json_prints_body() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v4/connection/status")
        .with_body(r#"{"data":{"connected":true}}"#)
        .create();

    authed(dir.path(), &server)
        .args(["--json", "vpn", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"connected\": true"));
}

#[test]
fn prolabs_list_renders_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/prolab/list")
        .match_query(Matcher::UrlEncoded("per_page".into(), "500".into()))
        .with_body(r#"{"data":{"data":[{"id":2,"name":"Dante","difficulty":"Intermediate","machines_count":14}]}}"#)
        .create();

    authed(dir.path(), &server)
        .args(["prolabs", "list", "--per-page", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ProLab list (page 1)"))
        .stdout(predicate::str::contains("Dante"))
        .stdout(predicate::str::contains("14"));
    mock.assert();
}

#[test]
fn tracks_items_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let lookup = server
        .mock("GET", "/api/v4/tracks")
        .match_query(Matcher::UrlEncoded("keyword".into(), "Intro to Zephyr".into()))
        .with_body(r#"[{"id":12,"name":"Intro to Zephyr"}]"#)
        .create();
    let track = server
        .mock("GET", "/api/v4/tracks/12")
        .with_body(
            json!({
                "id": 12,
                "name": "Intro to Zephyr",
                "items": [
                    {"id": 1, "name": "Lame", "type": "machine", "os": "Linux", "complete": true},
                    {"id": 2, "name": "Weak RSA", "type": "challenge", "difficulty": "Easy"}
                ]
            })
            .to_string(),
        )
        .create();

    authed(dir.path(), &server)
        .args(["tracks", "items", "Intro to Zephyr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Track 12: Intro to Zephyr"))
        .stdout(predicate::str::contains("Lame"))
        .stdout(predicate::str::contains("Weak RSA"));
    lookup.assert();
    track.assert();
}

#[test]
fn connection_alias_lists_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v4/connections")
        .with_body(r#"{"data":{"lab":{"can_access":true,"assigned_server":{"id":5,"friendly_name":"EU VIP 5"}}}}"#)
        .create();

    authed(dir.path(), &server)
        .args(["connection", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EU VIP 5"))
        .stdout(predicate::str::contains("Starting Point"));
}

#[test]
fn review_helpful_prints_server_message() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v4/review/helpful/31")
        .with_body(r#"{"message":"Thanks for your feedback"}"#)
        .create();

    authed(dir.path(), &server)
        .args(["review", "helpful", "31"])
        .assert()
        .success()
        .stdout("Thanks for your feedback\n");
    mock.assert();
}

#[test]
fn machine_graph_printed_as_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/machine/graph/activity/7/1W")
        .with_body(r#"{"info":{"user_owns":[1,2]}}"#)
        .create();

    authed(dir.path(), &server)
        .args(["machines", "graph-activity", "7", "--period", "1W"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Owns of machine 7 over 1W"))
        .stdout(predicate::str::contains("\"user_owns\""));
    mock.assert();
}

#[test]
fn vpn_download_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v4/access/ovpnfile/5/0/1")
        .with_body("client\ndev tun\n")
        .create();
    let output = dir.path().join("lab.ovpn");

    authed(dir.path(), &server)
        .args(["vpn", "download", "5", "--tcp", "--output"])
        .arg(&output)
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "client\ndev tun\n");
}

#[test]
fn config_path_outputs_path() {
    let dir = tempfile::tempdir().unwrap();
    htbcli(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("htbcli"))
        .stdout(predicate::str::contains(".env"));
}

#[test]
fn config_set_then_show() {
    let dir = tempfile::tempdir().unwrap();

    htbcli(dir.path())
        .args(["config", "set", "--token", "abcdef123456"])
        .assert()
        .success();

    assert!(dir.path().join("config").join("htbcli").join(".env").exists());

    htbcli(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********3456"))
        .stdout(predicate::str::contains("abcdef").not());
}

#[test]
fn config_set_conflicting_flags() {
    let dir = tempfile::tempdir().unwrap();
    htbcli(dir.path())
        .args(["config", "set", "--token", "x", "--clear-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot use --token and --clear-token"));
}

#[test]
fn info_works_without_token() {
    let dir = tempfile::tempdir().unwrap();
    htbcli(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://labs.hackthebox.com/api/v5"))
        .stdout(predicate::str::contains("(unset)"));
}

#[test]
fn completion_script_generated() {
    let dir = tempfile::tempdir().unwrap();
    htbcli(dir.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("htbcli"));
}

#[test]
fn endpoints_and_module_info_read_swagger() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("swagger.htb"),
        r#"
tags:
  - name: VM
    description: Machine instances
paths:
  /vm/spawn:
    post:
      tags: [VM]
      summary: Spawn a machine
      description: Spawns the given machine on your assigned lab server and returns immediately.
"#,
    )
    .unwrap();

    htbcli(dir.path())
        .arg("endpoints")
        .assert()
        .success()
        .stdout(predicate::str::contains("Machine instances"));

    htbcli(dir.path())
        .args(["module-info", "vm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/vm/spawn"))
        .stdout(predicate::str::contains(
            "Spawns the given machine on your assigned lab serv...",
        ));

    htbcli(dir.path())
        .args(["module-info", "nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No endpoints found"));
}

#[test]
fn endpoints_without_swagger_fails() {
    let dir = tempfile::tempdir().unwrap();
    htbcli(dir.path())
        .arg("endpoints")
        .assert()
        .failure()
        .stderr(predicate::str::contains("swagger file not found"));
}
