//! Paginated retrieval of a Mastodon account's following/followers listing.
//!
//! Flow: profile URL -> `GET /api/v1/accounts/lookup` -> `GET /api/v1/accounts/{id}/{relation}`,
//! then follow `Link: <...>; rel="next"` until a page has no next link or is empty.

mod client;
mod error;
mod link;
mod profile;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, ApiClientBuilder, HttpResponse, Transport, DEFAULT_TIMEOUT_SECS};
pub use error::{ErrorKind, FetchError};
pub use link::{next_page_token, NextPageToken};
pub use profile::{parse_profile, ProfileRef};

use crate::model::{Account, FollowerHandle, ListedAccount, Relation};
use reqwest::Url;
use std::collections::VecDeque;
use std::iter::FusedIterator;
use tracing::debug;

/// Mastodon caps `limit` on account listings at 80.
pub const MAX_PAGE_SIZE: u32 = 80;
pub const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;

/// What to fetch and how many accounts to ask for per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub relation: Relation,
    pub page_size: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            relation: Relation::Following,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Handles extracted from one listing page, plus where the next page is (if anywhere).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub handles: Vec<FollowerHandle>,
    pub next: Option<NextPageToken>,
}

/// Build `{base}/api/v1/<segments>`.
fn api_url(profile: &ProfileRef, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = profile.base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl {
            input: profile.base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .clear()
        .extend(["api", "v1"])
        .extend(segments);
    Ok(url)
}

/// Fail on non-success status; otherwise hand the response back.
fn check_response(
    response: HttpResponse,
    url: &Url,
    context: &str,
) -> Result<HttpResponse, FetchError> {
    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            status: response.status,
            url: url.to_string(),
            context: context.to_string(),
        });
    }
    Ok(response)
}

/// Resolve `profile.acct` to an account (and its id) on `profile.base`.
pub fn lookup_account<T: Transport + ?Sized>(
    transport: &mut T,
    profile: &ProfileRef,
) -> Result<Account, FetchError> {
    let mut url = api_url(profile, &["accounts", "lookup"])?;
    url.query_pairs_mut().append_pair("acct", &profile.acct);
    debug!(%url, "looking up account");

    let response = transport.get(&url)?;
    if response.status == 404 {
        return Err(FetchError::AccountNotFound {
            acct: profile.acct.clone(),
            host: profile.host.clone(),
        });
    }
    let response = check_response(response, &url, "account lookup")?;
    serde_json::from_str(&response.body).map_err(|e| FetchError::ParseResponse {
        url: url.to_string(),
        context: "account lookup".to_string(),
        reason: e.to_string(),
    })
}

/// URL of the first listing page for `account`.
pub fn first_page_url(
    profile: &ProfileRef,
    account: &Account,
    options: FetchOptions,
) -> Result<Url, FetchError> {
    let mut url = api_url(
        profile,
        &["accounts", account.id.as_str(), options.relation.path_segment()],
    )?;
    url.query_pairs_mut()
        .append_pair("limit", &options.page_size.to_string());
    Ok(url)
}

/// Extract handles and the next-page reference from a successful listing response.
///
/// The body must be a JSON array of accounts. An empty array ends the listing even if
/// the server still sent a next link.
pub fn parse_page(url: &Url, response: &HttpResponse, context: &str) -> Result<Page, FetchError> {
    let accounts: Vec<ListedAccount> =
        serde_json::from_str(&response.body).map_err(|e| FetchError::ParseResponse {
            url: url.to_string(),
            context: context.to_string(),
            reason: e.to_string(),
        })?;
    if accounts.is_empty() {
        return Ok(Page {
            handles: Vec::new(),
            next: None,
        });
    }
    let next = match response.link.as_deref() {
        Some(header) => next_page_token(header, url)?,
        None => None,
    };
    if next.as_ref().is_some_and(|t| t.url() == url) {
        return Err(FetchError::InvalidLink {
            url: url.to_string(),
            reason: "next page points back at the current page".to_string(),
        });
    }
    Ok(Page {
        handles: accounts.into_iter().map(FollowerHandle::from).collect(),
        next,
    })
}

/// GET one listing page and parse it.
pub fn fetch_page<T: Transport + ?Sized>(
    transport: &mut T,
    token: &NextPageToken,
    context: &str,
) -> Result<Page, FetchError> {
    let url = token.url();
    debug!(%url, context, "fetching page");
    let response = check_response(transport.get(url)?, url, context)?;
    parse_page(url, &response, context)
}

/// Holds the caller's transport for the duration of one listing run.
pub struct Fetcher<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    options: FetchOptions,
}

impl<'a, T: Transport + ?Sized> Fetcher<'a, T> {
    pub fn new(transport: &'a mut T, options: FetchOptions) -> Self {
        Self { transport, options }
    }

    /// Resolve `account_url` and return the lazy handle sequence.
    ///
    /// The account lookup happens here; listing pages are requested as the stream is consumed.
    pub fn fetch(&mut self, account_url: &str) -> Result<FollowerStream<'_, T>, FetchError> {
        let profile = parse_profile(account_url)?;
        let account = lookup_account(&mut *self.transport, &profile)?;
        debug!(acct = %account.acct, id = %account.id, "resolved account");
        let first = first_page_url(&profile, &account, self.options)?;
        Ok(FollowerStream {
            transport: &mut *self.transport,
            profile,
            account,
            relation: self.options.relation,
            buffer: VecDeque::new(),
            next: Some(NextPageToken::new(first)),
            pages: 0,
            finished: false,
        })
    }
}

/// Lazy, non-restartable sequence of handles in page order.
///
/// Each page is fetched only once the previous page's handles have been consumed. On error
/// the error is yielded once and the sequence ends; nothing from the failing page is yielded.
pub struct FollowerStream<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    profile: ProfileRef,
    account: Account,
    relation: Relation,
    buffer: VecDeque<FollowerHandle>,
    next: Option<NextPageToken>,
    pages: u32,
    finished: bool,
}

impl<T: Transport + ?Sized> FollowerStream<'_, T> {
    pub fn profile(&self) -> &ProfileRef {
        &self.profile
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Pages requested so far, including a failed one.
    pub fn pages_fetched(&self) -> u32 {
        self.pages
    }

    fn load(&mut self, token: NextPageToken) -> Result<(), FetchError> {
        self.pages += 1;
        let context = format!("{} page {}", self.relation, self.pages);
        let page = fetch_page(&mut *self.transport, &token, &context)?;
        debug!(
            page = self.pages,
            count = page.handles.len(),
            has_next = page.next.is_some(),
            "page parsed"
        );
        if self.pages == 1 && page.handles.is_empty() {
            let count = self.account.count_for(self.relation);
            if count > 0 {
                // A remote account's listing is only as complete as this instance's view of it.
                if self.profile.acct.contains('@') {
                    return Err(FetchError::ListNotFederated {
                        acct: self.profile.acct.clone(),
                        host: self.profile.host.clone(),
                        relation: self.relation.to_string(),
                        count,
                    });
                }
                return Err(FetchError::ListHidden {
                    acct: self.account.acct.clone(),
                    relation: self.relation.to_string(),
                    count,
                });
            }
        }
        self.buffer.extend(page.handles);
        self.next = page.next;
        Ok(())
    }
}

impl<T: Transport + ?Sized> Iterator for FollowerStream<'_, T> {
    type Item = Result<FollowerHandle, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(handle) = self.buffer.pop_front() {
                return Some(Ok(handle));
            }
            if self.finished {
                return None;
            }
            let Some(token) = self.next.take() else {
                self.finished = true;
                return None;
            };
            if let Err(e) = self.load(token) {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

impl<T: Transport + ?Sized> FusedIterator for FollowerStream<'_, T> {}
