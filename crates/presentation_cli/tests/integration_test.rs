//! Integration tests for CLI
//!
//! Command parsing through the real `Cli` definition, and whole invocations
//! against a mocked CalDAV server.

#![allow(clippy::panic)] // Allow panic! in tests for clear failure messages

use std::ffi::OsString;
use std::io::Write;

use application::ErrorKind;
use clap::Parser;
use infrastructure::OutputFormat;
use presentation_cli::{Cli, Command, run};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse_args(args: &[&str]) -> Result<Cli, clap::Error> {
    let os_args: Vec<OsString> = std::iter::once("yacal")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    Cli::try_parse_from(os_args)
}

// ============================================================================
// Parsing
// ============================================================================

mod parsing {
    use super::*;

    #[test]
    fn parses_list_calendars() {
        let cli = parse_args(&["list-calendars"]).unwrap();
        assert!(matches!(cli.command, Command::ListCalendars));
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = parse_args(&["events", "--calendar", "Work", "--format", "text", "-vv"]).unwrap();
        assert_eq!(cli.calendar.as_deref(), Some("Work"));
        assert_eq!(cli.format, Some(OutputFormat::Text));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn token_alias_is_accepted() {
        let cli = parse_args(&["--token", "abc", "list-todos"]).unwrap();
        assert_eq!(cli.auth.oauth_token.as_deref(), Some("abc"));
    }

    #[test]
    fn today_conflicts_with_from() {
        assert!(parse_args(&["events", "--today", "--from", "2026-03-01"]).is_err());
    }

    #[test]
    fn delete_requires_a_uid() {
        assert!(parse_args(&["delete"]).is_err());
    }

    #[test]
    fn uid_cannot_be_given_twice() {
        assert!(parse_args(&["delete", "a", "--uid", "b"]).is_err());
    }

    #[test]
    fn complete_todo_accepts_flag_form() {
        let cli = parse_args(&["complete-todo", "--uid", "todo-1"]).unwrap();
        let Command::CompleteTodo(uid) = cli.command else {
            panic!("Expected CompleteTodo command");
        };
        assert_eq!(uid.value(), "todo-1");
    }

    #[test]
    fn create_requires_a_title() {
        assert!(parse_args(&["create", "--start", "2026-03-01T10:00"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(parse_args(&["--format", "yaml", "list-calendars"]).is_err());
    }
}

// ============================================================================
// Whole invocations
// ============================================================================

mod invocation {
    use super::*;

    fn config_file(server: &MockServer) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            "[caldav]\nserver_url = \"{}\"\ncalendar_home = \"/calendars/alice/\"\ntimeout_secs = 5\n",
            server.uri()
        )
        .unwrap();
        file
    }

    fn calendars_body() -> &'static str {
        r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/alice/events-1/</D:href>
    <D:propstat><D:prop>
      <D:displayname>Work</D:displayname>
      <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
      <C:supported-calendar-component-set><C:comp name="VEVENT"/></C:supported-calendar-component-set>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#
    }

    async fn invoke(server: &MockServer, args: &[&str]) -> Result<String, ErrorKind> {
        let config = config_file(server);
        let path = config.path().to_string_lossy().into_owned();
        let mut full = vec!["--oauth-token", "test-token", "--config", path.as_str()];
        full.extend_from_slice(args);
        let cli = parse_args(&full).unwrap();
        run(cli).await.map_err(|e| e.kind())
    }

    #[tokio::test]
    async fn list_calendars_prints_json() {
        let server = MockServer::start().await;
        Mock::given(method("PROPFIND"))
            .and(path("/calendars/alice/"))
            .and(header("Authorization", "OAuth test-token"))
            .respond_with(ResponseTemplate::new(207).set_body_string(calendars_body()))
            .expect(1)
            .mount(&server)
            .await;

        let output = invoke(&server, &["list-calendars"]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["name"], "Work");
        assert_eq!(value[0]["supports_events"], true);
        assert_eq!(value[0]["supports_todos"], false);
    }

    #[tokio::test]
    async fn delete_prints_status_object() {
        let server = MockServer::start().await;
        Mock::given(method("PROPFIND"))
            .respond_with(ResponseTemplate::new(207).set_body_string(calendars_body()))
            .mount(&server)
            .await;
        Mock::given(method("REPORT"))
            .and(body_string_contains("ev-1"))
            .respond_with(ResponseTemplate::new(207).set_body_string(
                r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/alice/events-1/ev-1.ics</D:href>
    <D:propstat><D:prop>
      <D:getetag>"e1"</D:getetag>
      <C:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:ev-1
SUMMARY:Planning
DTSTART:20260310T090000Z
DTEND:20260310T100000Z
END:VEVENT
END:VCALENDAR</C:calendar-data>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/alice/events-1/ev-1.ics"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let output = invoke(&server, &["delete", "ev-1"]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, serde_json::json!({"status": "deleted", "uid": "ev-1"}));
    }

    #[tokio::test]
    async fn invalid_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let kind = invoke(
            &server,
            &[
                "create",
                "--title",
                "Backwards",
                "--start",
                "2026-03-10T10:00:00Z",
                "--end",
                "2026-03-10T09:00:00Z",
            ],
        )
        .await
        .unwrap_err();
        assert_eq!(kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        let config = config_file(&server);
        let path = config.path().to_string_lossy().into_owned();

        for args in [
            vec!["--config", path.as_str(), "list-calendars"],
            // credentials are checked before input parsing
            vec!["--config", path.as_str(), "events", "--from", "the 45th of Smarch"],
        ] {
            let cli = parse_args(&args).unwrap();
            let err = run(cli).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Auth);
            assert_eq!(err.exit_code(), 3);
        }
    }

    #[tokio::test]
    async fn missing_config_file_is_a_config_error() {
        let cli = parse_args(&[
            "--oauth-token",
            "t",
            "--config",
            "/nonexistent/yacal.toml",
            "list-calendars",
        ])
        .unwrap();
        let err = run(cli).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.exit_code(), 1);
    }
}
