//! Domain extraction and hostname utilities.
//!
//! This module approximates the registrable domain of a URL without consulting
//! the Public Suffix List. The rule is deliberately simple:
//!
//! - `www.google.com` -> `google.com`
//! - `login.google.co.uk` -> `google.co.uk` (second-to-last label is short)
//! - `localhost` -> `localhost`
//!
//! Known limitation: short second-level names are mistaken for public suffixes
//! (`www.bbc.com` -> `www.bbc.com`, `a.ibm.com` -> `a.ibm.com`), and real
//! multi-label suffixes with long labels are missed. Scoring only compares
//! domains produced by this same rule, so the approximation stays consistent
//! across a single analysis.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::SHORT_SECOND_LEVEL_LABEL_LEN;

static IPV4_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$")
        .expect("IPv4 literal pattern is valid")
});

/// Returns the host component of a URL.
///
/// Returns `None` for unparseable URLs and for URLs without a host
/// (`about:blank`, `data:` URLs, `file:///...`). The port is never included.
pub fn hostname(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Returns the host exactly as written in the URL's authority, lowercased.
///
/// Unlike [`hostname`], nothing is canonicalized: `http://2130706433/` yields
/// `2130706433` and `http://0x7f.1/` yields `0x7f.1`, where a WHATWG parser
/// would rewrite both to `127.0.0.1`. Userinfo, port, path, query and
/// fragment are stripped. Returns `None` when there is no `//` authority or
/// the host is empty.
pub fn authority_host(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = if host_port.starts_with('[') {
        host_port
            .find(']')
            .map_or(host_port, |end| &host_port[..=end])
    } else {
        host_port.split_once(':').map_or(host_port, |(host, _)| host)
    };
    (!host.is_empty()).then(|| host.to_lowercase())
}

/// Approximates the registrable domain of a URL.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// The registrable domain (e.g. "example.com" from "https://www.example.com/path"),
/// or `None` when the URL has no host.
pub fn registrable_domain(url: &str) -> Option<String> {
    hostname(url).map(|host| registrable_domain_of_host(&host))
}

/// Applies the registrable-domain rule to a bare host.
///
/// Idempotent for hosts with at least two labels.
pub fn registrable_domain_of_host(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    let n = labels.len();
    if n < 2 {
        return host.to_string();
    }
    if n >= 3 && labels[n - 2].len() <= SHORT_SECOND_LEVEL_LABEL_LEN {
        return labels[n - 3..].join(".");
    }
    labels[n - 2..].join(".")
}

/// Checks whether a hostname is a textual IPv4 address.
///
/// Matches exactly four dot-separated groups of one to three ASCII digits. Octet
/// ranges are not validated and IPv6 literals never match.
pub fn is_ip_literal(hostname: &str) -> bool {
    IPV4_LITERAL.is_match(hostname)
}

/// Returns the final host label of a URL, prefixed with a dot (`.xyz`).
pub fn pseudo_tld(url: &str) -> Option<String> {
    let host = hostname(url)?;
    host.rsplit('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(|label| format!(".{label}"))
}

/// Whether `candidate` is a different registrable domain than `original`.
///
/// A candidate ending with the original (a subdomain of it, after the
/// registrable-domain rule) is not external. The suffix test is textual, so
/// `notexample.com` is treated as belonging to `example.com`.
pub fn is_external_domain(candidate: &str, original: &str) -> bool {
    candidate != original && !candidate.ends_with(original)
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
