//! Shared scaffolding for the integration tests: a scriptable fake of the hosting API and
//! the dependency services, plus a host that captures output.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use core::time::Duration as StdDuration;
use repo_risk_lib::Host;
use repo_risk_lib::config::Config;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "octo";
pub const NAME: &str = "widgets";

fn repo_path(suffix: &str) -> String {
    if suffix.is_empty() {
        format!("/repos/{OWNER}/{NAME}")
    } else {
        format!("/repos/{OWNER}/{NAME}/{suffix}")
    }
}

/// Wrap text the way the contents API does: base64 broken into lines.
pub fn contents_payload(text: &str) -> Value {
    let encoded = STANDARD.encode(text);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    json!({ "encoding": "base64", "content": wrapped.join("\n") })
}

/// A repository as the fake services describe it.
#[derive(Debug, Clone)]
pub struct FakeRepository {
    pub now: DateTime<Utc>,
    pub license: Option<(&'static str, &'static str)>,
    pub stars: u64,
    pub size_kb: u64,
    pub contributors: usize,
    pub present_paths: Vec<&'static str>,
    pub package_json: Option<String>,
    pub requirements_txt: Option<String>,
    pub releases: Vec<(&'static str, i64)>,
    pub readme: Option<&'static str>,
    pub alerts_enabled: bool,
    pub dependabot_alerts: Vec<Value>,

    /// Ages in days of the open pull requests.
    pub open_pull_request_ages: Vec<i64>,

    /// Ages in days of the open issues that are not pull requests.
    pub open_issue_ages: Vec<i64>,

    /// Closed issues as (age in days, hours until the first comment).
    pub closed_issues: Vec<(i64, i64)>,
}

impl FakeRepository {
    /// A well-kept repository that trips no risk rule.
    pub fn healthy(now: DateTime<Utc>) -> Self {
        Self {
            now,
            license: Some(("MIT", "MIT License")),
            stars: 850,
            size_kb: 5_400,
            contributors: 25,
            present_paths: vec![
                "tests",
                ".github/workflows",
                "docs",
                ".eslintrc",
                "CONTRIBUTING.md",
                "SECURITY.md",
                "README.md",
                "package.json",
            ],
            package_json: Some(r#"{"dependencies":{"react":"^18.2.0"},"devDependencies":{"lodash":"~4.17.21"}}"#.to_string()),
            requirements_txt: None,
            releases: vec![("v2.3.1", 21), ("v2.3.0", 60)],
            readme: Some("# Widgets\n\n[![CI](https://ci.example.com/badge.svg)](https://ci.example.com)\n\nWidgets is a library of reusable widgets.\n"),
            alerts_enabled: true,
            dependabot_alerts: Vec::new(),
            open_pull_request_ages: Vec::new(),
            open_issue_ages: Vec::new(),
            closed_issues: Vec::new(),
        }
    }

    /// No license, tests, CI, README or docs; one contributor and no stars.
    pub fn neglected(now: DateTime<Utc>) -> Self {
        Self {
            license: None,
            stars: 0,
            contributors: 1,
            present_paths: vec![".eslintrc", "CONTRIBUTING.md", "SECURITY.md", "package.json"],
            package_json: Some(r#"{"dependencies":{}}"#.to_string()),
            readme: None,
            ..Self::healthy(now)
        }
    }

    fn date(&self, days_ago: i64) -> String {
        (self.now - Duration::days(days_ago)).to_rfc3339()
    }

    fn date_plus_hours(&self, days_ago: i64, hours: i64) -> String {
        (self.now - Duration::days(days_ago) + Duration::hours(hours)).to_rfc3339()
    }

    /// Open issues as the issues API lists them: pull requests included, flagged as such.
    fn open_issues_json(&self) -> Value {
        let issues = self
            .open_issue_ages
            .iter()
            .enumerate()
            .map(|(i, days)| json!({ "number": 100 + i, "created_at": self.date(*days), "comments": 0 }));
        let pulls = self.open_pull_request_ages.iter().enumerate().map(|(i, days)| {
            json!({ "number": 200 + i, "created_at": self.date(*days), "comments": 0, "pull_request": { "url": "https://example.com" } })
        });
        Value::Array(issues.chain(pulls).collect())
    }

    fn repo_json(&self) -> Value {
        json!({
            "full_name": format!("{OWNER}/{NAME}"),
            "created_at": self.date(1500),
            "updated_at": self.date(1),
            "stargazers_count": self.stars,
            "forks_count": 12,
            "subscribers_count": 7,
            "watchers_count": self.stars,
            "open_issues_count": 3,
            "size": self.size_kb,
            "license": self.license.map(|(id, name)| json!({ "key": id.to_lowercase(), "spdx_id": id, "name": name })),
            "description": "Widgets for everyone",
            "default_branch": "main",
            "archived": false,
        })
    }

    /// Mount every endpoint this repository answers; anything else is a 404.
    pub async fn mount(&self, server: &MockServer) {
        get(server, &repo_path(""), self.repo_json()).await;

        for candidate in &self.present_paths {
            let body = match (*candidate, &self.package_json, &self.requirements_txt) {
                ("package.json", Some(text), _) | ("requirements.txt", _, Some(text)) => contents_payload(text),
                _ => json!({ "name": candidate, "type": "file" }),
            };
            get(server, &repo_path(&format!("contents/{candidate}")), body).await;
        }

        get(
            server,
            &repo_path("commits"),
            json!([{ "commit": { "author": { "date": self.date(3) }, "committer": { "date": self.date(2) } } }]),
        )
        .await;

        let contributors: Vec<Value> = (0..self.contributors).map(|i| json!({ "login": format!("dev{i}") })).collect();
        get(server, &repo_path("contributors"), Value::Array(contributors)).await;

        let pulls: Vec<Value> = self.open_pull_request_ages.iter().map(|days| json!({ "created_at": self.date(*days) })).collect();
        get(server, &repo_path("pulls"), Value::Array(pulls)).await;

        Mock::given(method("GET"))
            .and(path(repo_path("issues")))
            .and(query_param("state", "open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.open_issues_json()))
            .mount(server)
            .await;

        // A commented pull request heads the closed list; its slow reply must not be sampled.
        let mut closed = vec![json!({ "number": 399, "created_at": self.date(5), "comments": 4, "pull_request": { "url": "https://example.com" } })];
        get(server, &repo_path("issues/399/comments"), json!([{ "created_at": self.date_plus_hours(5, 1000) }])).await;
        for (i, (days, hours)) in self.closed_issues.iter().enumerate() {
            let number = 300 + i;
            closed.push(json!({ "number": number, "created_at": self.date(*days), "comments": 1 }));
            get(
                server,
                &repo_path(&format!("issues/{number}/comments")),
                json!([{ "created_at": self.date_plus_hours(*days, *hours) }]),
            )
            .await;
        }

        Mock::given(method("GET"))
            .and(path(repo_path("issues")))
            .and(query_param("state", "closed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(closed)))
            .mount(server)
            .await;

        let releases: Vec<Value> = self
            .releases
            .iter()
            .map(|(tag, days_ago)| json!({ "tag_name": tag, "published_at": self.date(*days_ago), "created_at": self.date(*days_ago) }))
            .collect();
        get(server, &repo_path("releases"), Value::Array(releases)).await;

        if let Some(readme) = self.readme {
            get(server, &repo_path("readme"), contents_payload(readme)).await;
        }

        if self.alerts_enabled {
            Mock::given(method("GET"))
                .and(path(repo_path("vulnerability-alerts")))
                .respond_with(ResponseTemplate::new(204))
                .mount(server)
                .await;
            get(server, &repo_path("dependabot/alerts"), Value::Array(self.dependabot_alerts.clone())).await;
        }

        Mock::given(method("POST"))
            .and(path("/v1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(server)
            .await;

        get(server, "/react/latest", json!({ "name": "react", "version": "18.2.0" })).await;
        get(server, "/lodash/latest", json!({ "name": "lodash", "version": "4.17.21" })).await;
    }
}

async fn get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Configuration pointing every service at the fake server, without batch pauses.
pub fn config_for(server: &MockServer) -> Config {
    Config {
        github_api_url: server.uri(),
        osv_api_url: server.uri(),
        npm_registry_url: server.uri(),
        pypi_url: server.uri(),
        batch_pause: StdDuration::ZERO,
        ..Config::default()
    }
}

/// The same configuration as a TOML file body.
pub fn config_toml_for(server: &MockServer) -> String {
    let uri = server.uri();
    format!(
        "github_api_url = \"{uri}\"\nosv_api_url = \"{uri}\"\nnpm_registry_url = \"{uri}\"\npypi_url = \"{uri}\"\nbatch_pause = \"0s\"\n"
    )
}

/// Test host that captures output to in-memory buffers.
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl TestHost {
    pub const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
            exit_code: None,
        }
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
