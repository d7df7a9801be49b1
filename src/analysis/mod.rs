//! Heuristic phishing checks.
//!
//! [`analyze`] runs a fixed battery of checks over an [`Observation`] and
//! folds their outcomes into an [`AnalysisVerdict`]. Each check occupies one
//! slot in `checks_total` no matter how many reasons it produces, so a single
//! noisy check (many suspicious-TLD requests, many foreign iframes) still
//! counts once.

use std::collections::HashSet;

use log::{debug, warn};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::config::{
    COMMON_BRANDS, MAX_EXTERNAL_DOMAINS, MAX_HOST_LABELS, MAX_REDIRECTS, MIN_PHISHING_KEYWORDS,
    PHISHING_KEYWORDS, SUSPICIOUS_TLDS,
};
use crate::domain::{
    authority_host, is_external_domain, is_ip_literal, pseudo_tld, registrable_domain,
    registrable_domain_of_host,
};
use crate::error_handling::QueryError;
use crate::models::{AnalysisVerdict, Observation};

/// The checks, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Check {
    /// Host is a bare IPv4 address
    IpLiteralHost,
    /// `meta http-equiv="refresh"` with a zero delay
    ImmediateMetaRefresh,
    /// Host has too many labels
    ExcessiveSubdomains,
    /// Well-known brand in the host but not in the registrable domain
    BrandMismatch,
    /// Requests to suspicious TLDs or to too many external domains
    ExternalRequests,
    /// Frames loaded from other registrable domains
    ExternalIframes,
    /// Too many redirect hops
    ExcessiveRedirects,
    /// Page asks for a password
    PasswordField,
    /// Body text is dense with credential-harvesting vocabulary
    PhishingKeywords,
}

impl Check {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Check::IpLiteralHost => "ip_literal_host",
            Check::ImmediateMetaRefresh => "immediate_meta_refresh",
            Check::ExcessiveSubdomains => "excessive_subdomains",
            Check::BrandMismatch => "brand_mismatch",
            Check::ExternalRequests => "external_requests",
            Check::ExternalIframes => "external_iframes",
            Check::ExcessiveRedirects => "excessive_redirects",
            Check::PasswordField => "password_field",
            Check::PhishingKeywords => "phishing_keywords",
        }
    }
}

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Evaluated and found nothing
    Passed,
    /// Evaluated and found something; never empty
    Fired(Vec<String>),
    /// The probe it depends on failed; counted in the total but not passed
    Skipped(String),
    /// Does not apply to this page; not counted at all
    NotApplicable,
}

impl CheckOutcome {
    fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            CheckOutcome::Passed
        } else {
            CheckOutcome::Fired(reasons)
        }
    }

    fn skipped(error: &QueryError) -> Self {
        CheckOutcome::Skipped(error.to_string())
    }
}

/// Facts about the analyzed URL shared by several checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisContext {
    /// Host as written in the analyzed URL, empty when it has none
    pub host: String,
    /// Registrable domain of `host`, for the host-structure checks
    pub host_domain: Option<String>,
    /// Registrable domain of the parsed URL, compared against request and
    /// frame URLs the browser reports in canonical form
    pub domain: Option<String>,
    /// Whether `host` is an IPv4 literal
    pub is_ip: bool,
}

impl AnalysisContext {
    /// Derives the context from the analyzed URL.
    pub fn from_url(url: &str) -> Self {
        let host = authority_host(url).unwrap_or_default();
        let is_ip = is_ip_literal(&host);
        Self {
            host_domain: (!host.is_empty()).then(|| registrable_domain_of_host(&host)),
            domain: registrable_domain(url),
            host,
            is_ip,
        }
    }

    /// Host-structure checks only make sense for named hosts.
    fn host_checks_apply(&self) -> bool {
        !self.is_ip && self.host_domain.is_some()
    }

    fn is_external(&self, url: &str) -> bool {
        match (&self.domain, registrable_domain(url)) {
            (Some(original), Some(candidate)) => is_external_domain(&candidate, original),
            _ => false,
        }
    }
}

/// Runs every check against `observation` and builds the verdict.
pub fn analyze(observation: &Observation) -> AnalysisVerdict {
    let context = AnalysisContext::from_url(&observation.url);
    let mut verdict = AnalysisVerdict::default();

    for check in Check::iter() {
        let outcome = evaluate(check, &context, observation);
        match outcome {
            CheckOutcome::Passed => {
                verdict.checks_total += 1;
                verdict.checks_passed += 1;
            }
            CheckOutcome::Fired(reasons) => {
                debug!("Check {} fired for {}", check.name(), observation.url);
                verdict.checks_total += 1;
                verdict.reasons.extend(reasons);
            }
            CheckOutcome::Skipped(cause) => {
                warn!(
                    "Check {} skipped for {}: {}",
                    check.name(),
                    observation.url,
                    cause
                );
                verdict.checks_total += 1;
            }
            CheckOutcome::NotApplicable => {}
        }
    }

    verdict.suspicious = !verdict.reasons.is_empty();
    verdict
}

/// Evaluates a single check.
pub fn evaluate(check: Check, context: &AnalysisContext, observation: &Observation) -> CheckOutcome {
    match check {
        Check::IpLiteralHost => check_ip_literal(context),
        Check::ImmediateMetaRefresh => check_meta_refresh(observation),
        Check::ExcessiveSubdomains => check_subdomains(context),
        Check::BrandMismatch => check_brand_mismatch(context),
        Check::ExternalRequests => check_external_requests(context, &observation.request_urls),
        Check::ExternalIframes => check_external_iframes(context, observation),
        Check::ExcessiveRedirects => check_redirects(&observation.redirect_urls),
        Check::PasswordField => check_password_field(observation),
        Check::PhishingKeywords => check_keywords(observation),
    }
}

fn check_ip_literal(context: &AnalysisContext) -> CheckOutcome {
    if context.is_ip {
        CheckOutcome::Fired(vec![format!("URL uses direct IP address: {}", context.host)])
    } else {
        CheckOutcome::Passed
    }
}

fn check_meta_refresh(observation: &Observation) -> CheckOutcome {
    match &observation.meta_refresh {
        Err(e) => CheckOutcome::skipped(e),
        Ok(None) => CheckOutcome::Passed,
        Ok(Some(meta)) => match meta.content.as_deref() {
            Some(content) if content.trim().starts_with("0;") => CheckOutcome::Fired(vec![
                format!("Immediate meta refresh detected: content='{content}'"),
            ]),
            _ => CheckOutcome::Passed,
        },
    }
}

fn check_subdomains(context: &AnalysisContext) -> CheckOutcome {
    if !context.host_checks_apply() {
        return CheckOutcome::NotApplicable;
    }
    let labels = context.host.split('.').count();
    if labels > MAX_HOST_LABELS {
        CheckOutcome::Fired(vec![format!(
            "Excessive subdomains detected ({labels} parts)"
        )])
    } else {
        CheckOutcome::Passed
    }
}

fn check_brand_mismatch(context: &AnalysisContext) -> CheckOutcome {
    let Some(domain) = context
        .host_domain
        .as_deref()
        .filter(|_| context.host_checks_apply())
    else {
        return CheckOutcome::NotApplicable;
    };
    let host = context.host.to_lowercase();
    let domain = domain.to_lowercase();
    match COMMON_BRANDS
        .iter()
        .find(|brand| host.contains(*brand) && !domain.contains(*brand))
    {
        Some(brand) => CheckOutcome::Fired(vec![format!(
            "Brand mismatch: '{brand}' in subdomain/hostname but not main domain."
        )]),
        None => CheckOutcome::Passed,
    }
}

// One slot for two findings: a page can emit many TLD reasons plus the
// volume reason and still only occupy a single slot in the total.
fn check_external_requests(context: &AnalysisContext, request_urls: &[String]) -> CheckOutcome {
    let mut reasons = Vec::new();
    let mut external_domains: HashSet<String> = HashSet::new();

    for request_url in request_urls {
        if let (Some(original), Some(candidate)) =
            (context.domain.as_deref(), registrable_domain(request_url))
        {
            if is_external_domain(&candidate, original) {
                external_domains.insert(candidate);
            }
        }

        if let Some(tld) = pseudo_tld(request_url) {
            if SUSPICIOUS_TLDS.contains(&tld.as_str()) {
                reasons.push(format!("Request to suspicious TLD ({tld}): {request_url}"));
            }
        }
    }

    if external_domains.len() > MAX_EXTERNAL_DOMAINS {
        reasons.push(format!(
            "High number of unique external domains requested: {}",
            external_domains.len()
        ));
    }

    CheckOutcome::from_reasons(reasons)
}

fn check_external_iframes(context: &AnalysisContext, observation: &Observation) -> CheckOutcome {
    let reasons = observation
        .frames
        .iter()
        .filter_map(|frame| frame.real_url())
        .filter(|url| context.is_external(url))
        .map(|url| format!("External domain iframe detected: {url}"))
        .collect();
    CheckOutcome::from_reasons(reasons)
}

fn check_redirects(redirect_urls: &[String]) -> CheckOutcome {
    if redirect_urls.len() > MAX_REDIRECTS {
        CheckOutcome::Fired(vec![format!(
            "High number of redirects: {}",
            redirect_urls.len()
        )])
    } else {
        CheckOutcome::Passed
    }
}

fn check_password_field(observation: &Observation) -> CheckOutcome {
    match &observation.password_field {
        Err(e) => CheckOutcome::skipped(e),
        Ok(true) => CheckOutcome::Fired(vec!["Password input field found on page.".to_string()]),
        Ok(false) => CheckOutcome::Passed,
    }
}

fn check_keywords(observation: &Observation) -> CheckOutcome {
    let text = match &observation.body_text {
        Err(e) => return CheckOutcome::skipped(e),
        Ok(text) => text.to_lowercase(),
    };
    let found: Vec<&str> = PHISHING_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| text.contains(keyword))
        .collect();
    if found.len() >= MIN_PHISHING_KEYWORDS {
        CheckOutcome::Fired(vec![format!(
            "Potential phishing keywords found: {}",
            found.join(", ")
        )])
    } else {
        CheckOutcome::Passed
    }
}
