//! Account reference parsing: profile URL or `user@host` handle to instance base URL plus acct.

use crate::fetcher::error::FetchError;
use reqwest::Url;

/// Where an account lives and how to look it up there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRef {
    /// Instance origin (scheme, host, port) with path `/`.
    pub base: Url,
    /// Host name of the instance, used to qualify bare handles.
    pub host: String,
    /// Value for `/api/v1/accounts/lookup?acct=`: `alice` or `alice@remote.tld`.
    pub acct: String,
}

fn invalid(input: &str, reason: impl Into<String>) -> FetchError {
    FetchError::InvalidUrl {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Accepts `https://host/@alice`, `https://host/@alice@remote.tld`, `https://host/users/alice`
/// (extra trailing segments such as `/followers` are ignored) and the handle forms
/// `alice@host` / `@alice@host`.
pub fn parse_profile(input: &str) -> Result<ProfileRef, FetchError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid(input, "empty account URL"));
    }
    if input.contains("://") {
        parse_profile_url(input)
    } else {
        parse_handle(input)
    }
}

fn parse_profile_url(input: &str) -> Result<ProfileRef, FetchError> {
    let url = Url::parse(input).map_err(|e| invalid(input, e.to_string()))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid(
            input,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid(input, "URL has no host"))?
        .to_string();

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let acct = match segments.as_slice() {
        [first, ..] if first.starts_with('@') => &first[1..],
        ["users", name, ..] => *name,
        _ => {
            return Err(invalid(
                input,
                "path does not identify an account (expected /@user or /users/user)",
            ))
        }
    };
    validate_acct(input, acct)?;

    let mut base = url.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    // Credentials in the input URL are never sent.
    let _ = base.set_username("");
    let _ = base.set_password(None);

    Ok(ProfileRef {
        base,
        host,
        acct: acct.to_string(),
    })
}

fn parse_handle(input: &str) -> Result<ProfileRef, FetchError> {
    let handle = input.strip_prefix('@').unwrap_or(input);
    let (user, host) = handle.split_once('@').ok_or_else(|| {
        invalid(
            input,
            "expected a profile URL (https://host/@user) or a handle (user@host)",
        )
    })?;
    if host.is_empty() || host.contains(['@', '/', ' ']) {
        return Err(invalid(input, "handle has no valid host"));
    }
    validate_acct(input, user)?;
    let base = Url::parse(&format!("https://{}/", host)).map_err(|e| invalid(input, e.to_string()))?;
    Ok(ProfileRef {
        base,
        host: host.to_string(),
        acct: user.to_string(),
    })
}

/// `user` or `user@domain`, both parts non-empty.
fn validate_acct(input: &str, acct: &str) -> Result<(), FetchError> {
    let mut parts = acct.split('@');
    let user = parts.next().unwrap_or_default();
    if user.is_empty() {
        return Err(invalid(input, "no username in account URL"));
    }
    match (parts.next(), parts.next()) {
        (None, _) => Ok(()),
        (Some(domain), None) if !domain.is_empty() => Ok(()),
        _ => Err(invalid(input, format!("malformed account '{}'", acct))),
    }
}
