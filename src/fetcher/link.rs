//! `Link` response header parsing (RFC 8288), as Mastodon uses it for pagination:
//! `<https://host/api/v1/accounts/1/following?max_id=7>; rel="next", <...>; rel="prev"`.

use crate::fetcher::error::FetchError;
use reqwest::Url;

/// Absolute URL of the next listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPageToken(Url);

impl NextPageToken {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

/// One `<target>; param; param` entry of a Link header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkValue<'a> {
    target: &'a str,
    rels: Vec<String>,
}

fn parse_link_header(header: &str) -> Result<Vec<LinkValue<'_>>, String> {
    let mut values = Vec::new();
    let mut rest = header.trim_start();
    while !rest.is_empty() {
        let after_open = rest
            .strip_prefix('<')
            .ok_or_else(|| format!("expected '<' before {:?}", rest))?;
        let close = after_open
            .find('>')
            .ok_or_else(|| "unterminated '<' in link target".to_string())?;
        let target = &after_open[..close];

        // Parameters run to the next comma outside a quoted string.
        let params_start = &after_open[close + 1..];
        let mut in_quote = false;
        let mut end = params_start.len();
        for (i, c) in params_start.char_indices() {
            match c {
                '"' => in_quote = !in_quote,
                ',' if !in_quote => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }
        if in_quote {
            return Err("unterminated quoted parameter".to_string());
        }

        let mut rels = Vec::new();
        for param in params_start[..end].split(';') {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("rel") {
                let value = value.trim().trim_matches('"');
                rels.extend(value.split_whitespace().map(str::to_ascii_lowercase));
            }
        }
        values.push(LinkValue { target, rels });

        rest = params_start[end..]
            .strip_prefix(',')
            .unwrap_or("")
            .trim_start();
    }
    Ok(values)
}

/// Find the `rel="next"` target in a Link header, resolved against the page it came from.
pub fn next_page_token(
    header: &str,
    page_url: &Url,
) -> Result<Option<NextPageToken>, FetchError> {
    let invalid = |reason: String| FetchError::InvalidLink {
        url: page_url.to_string(),
        reason,
    };
    let values = parse_link_header(header).map_err(invalid)?;
    let Some(next) = values
        .into_iter()
        .find(|v| v.rels.iter().any(|r| r == "next"))
    else {
        return Ok(None);
    };
    let url = page_url
        .join(next.target.trim())
        .map_err(|e| invalid(format!("bad next URL {:?}: {}", next.target, e)))?;
    Ok(Some(NextPageToken::new(url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.social/api/v1/accounts/42/following?limit=80")
            .expect("static URL")
    }

    #[test]
    fn mastodon_next_and_prev() -> Result<(), FetchError> {
        let header = "<https://example.social/api/v1/accounts/42/following?limit=80&max_id=1093>; rel=\"next\", <https://example.social/api/v1/accounts/42/following?limit=80&since_id=1200>; rel=\"prev\"";
        let next = next_page_token(header, &page_url())?;
        assert_eq!(
            next.map(|t| t.url().to_string()),
            Some(
                "https://example.social/api/v1/accounts/42/following?limit=80&max_id=1093"
                    .to_string()
            )
        );
        Ok(())
    }

    #[test]
    fn prev_only_means_last_page() -> Result<(), FetchError> {
        let header = "<https://example.social/api/v1/accounts/42/following?since_id=5>; rel=\"prev\"";
        assert!(next_page_token(header, &page_url())?.is_none());
        Ok(())
    }

    #[test]
    fn next_listed_second_with_unquoted_rel_and_extra_params() -> Result<(), FetchError> {
        let header = "</prev?a=1>; rel=prev; title=\"a, b; c\", </api/v1/accounts/42/following?max_id=9>; type=\"application/json\"; rel=next";
        let next = next_page_token(header, &page_url())?
            .map(|t| t.url().to_string());
        assert_eq!(
            next.as_deref(),
            Some("https://example.social/api/v1/accounts/42/following?max_id=9")
        );
        Ok(())
    }

    #[test]
    fn multi_valued_rel_and_case() -> Result<(), FetchError> {
        let header = "<https://example.social/p2>; REL=\"last NEXT\"";
        let next = next_page_token(header, &page_url())?;
        assert_eq!(
            next.map(|t| t.url().to_string()).as_deref(),
            Some("https://example.social/p2")
        );
        Ok(())
    }

    #[test]
    fn empty_header_has_no_next() -> Result<(), FetchError> {
        assert!(next_page_token("", &page_url())?.is_none());
        assert!(next_page_token("   ", &page_url())?.is_none());
        Ok(())
    }

    #[test]
    fn malformed_headers_error() -> Result<(), String> {
        for header in [
            "https://example.social/p2; rel=\"next\"",
            "<https://example.social/p2; rel=\"next\"",
            "<https://example.social/p2>; rel=\"next",
        ] {
            match next_page_token(header, &page_url()) {
                Err(FetchError::InvalidLink { .. }) => {}
                other => return Err(format!("{:?}: expected InvalidLink, got {:?}", header, other)),
            }
        }
        Ok(())
    }
}
