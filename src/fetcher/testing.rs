//! In-memory transport for tests: canned responses keyed by exact URL.

use crate::fetcher::client::{HttpResponse, Transport};
use crate::fetcher::error::FetchError;
use reqwest::Url;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: HashMap<String, HttpResponse>,
    unreachable: HashSet<String>,
    pub requested: Vec<String>,
}

/// A real `reqwest::Error`, produced without touching the network (the URL has no host).
pub fn reqwest_error() -> reqwest::Error {
    match reqwest::blocking::Client::new().get("http://").build() {
        Err(e) => e,
        Ok(request) => panic!("request to {} unexpectedly built", request.url()),
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, link: Option<&str>, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status,
                link: link.map(String::from),
                body: body.to_string(),
            },
        );
        self
    }

    /// Requests to `url` fail as if the connection could not be made.
    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// Lookup response for `acct` on example.social with the given id and counts.
    pub fn with_account(self, acct: &str, id: &str, followers: u64, following: u64) -> Self {
        let body = format!(
            r#"{{"id":"{id}","username":"{acct}","acct":"{acct}","url":"https://example.social/@{acct}","followers_count":{followers},"following_count":{following}}}"#
        );
        self.respond(
            &format!("https://example.social/api/v1/accounts/lookup?acct={}", acct),
            200,
            None,
            &body,
        )
    }
}

impl Transport for FakeTransport {
    fn get(&mut self, url: &Url) -> Result<HttpResponse, FetchError> {
        self.requested.push(url.to_string());
        if self.unreachable.contains(url.as_str()) {
            return Err(FetchError::Network {
                url: url.to_string(),
                source: reqwest_error(),
            });
        }
        Ok(self
            .responses
            .get(url.as_str())
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                link: None,
                body: r#"{"error":"Record not found"}"#.to_string(),
            }))
    }
}

/// JSON array of listing entries with the given accts.
pub fn page_body(accts: &[&str]) -> String {
    let items: Vec<String> = accts
        .iter()
        .enumerate()
        .map(|(i, acct)| format!(r#"{{"id":"{}","username":"u{}","acct":"{}"}}"#, 1000 + i, i, acct))
        .collect();
    format!("[{}]", items.join(","))
}

pub fn next_link(url: &str) -> String {
    format!("<{}>; rel=\"next\"", url)
}
