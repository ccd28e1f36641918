// Collector module.
// Defines the trait, shared fetch/extraction helpers and the ingestion
// pipeline for job source collectors.

pub mod linkedin;
pub mod naukri;
pub mod runner;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::job::{CollectedJob, EXPERIENCE_NOT_SPECIFIED};

/// Characters that encodeURIComponent does NOT encode.
/// RFC 3986 unreserved: A-Z a-z 0-9 - _ . ! ~ * ' ( )
pub(crate) const ENCODE_URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Failure to retrieve or read a whole source page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("source returned {0}")]
    Status(StatusCode),

    #[error("invalid selector: {0}")]
    Selector(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e)
        } else {
            FetchError::Request(e)
        }
    }
}

/// Trait that all job collectors must implement.
/// Each collector fetches one search-results page for a keyword and returns
/// the jobs found on it, in document order.
#[async_trait]
pub trait JobCollector: Send + Sync {
    /// Source name stamped on every collected job.
    fn name(&self) -> &str;

    async fn collect(&self, keyword: &str) -> Result<Vec<CollectedJob>, FetchError>;
}

/// HTTP settings shared by the built-in collectors.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub naukri_base_url: String,
    pub linkedin_base_url: String,
}

/// The built-in collectors in registration order.
pub fn default_collectors(
    settings: &CollectorSettings,
) -> Result<Vec<Arc<dyn JobCollector>>, reqwest::Error> {
    let client = build_client(&settings.user_agent, settings.timeout)?;
    Ok(vec![
        Arc::new(naukri::Naukri::new(client.clone(), &settings.naukri_base_url)),
        Arc::new(linkedin::LinkedIn::new(client, &settings.linkedin_base_url)),
    ])
}

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// GET a page and return its body. Any non-2xx status is an error.
pub(crate) async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .header(ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    Ok(resp.text().await?)
}

/// CSS selectors describing one source's result cards.
pub(crate) struct CardSelectors {
    pub card: &'static str,
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    /// `None` when the source does not show an experience level.
    pub experience: Option<&'static str>,
    pub description: &'static str,
    pub link: &'static str,
}

struct CompiledSelectors {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    experience: Option<Selector>,
    description: Selector,
    link: Selector,
}

impl CardSelectors {
    fn compile(&self) -> Result<CompiledSelectors, FetchError> {
        Ok(CompiledSelectors {
            card: selector(self.card)?,
            title: selector(self.title)?,
            company: selector(self.company)?,
            location: selector(self.location)?,
            experience: self.experience.map(selector).transpose()?,
            description: selector(self.description)?,
            link: selector(self.link)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Selector(format!("{css}: {e:?}")))
}

/// Extract jobs from every card on the page. Cards without both a title and
/// a company are skipped.
pub(crate) fn extract_cards(
    html: &str,
    page_url: &str,
    selectors: &CardSelectors,
    source: &str,
) -> Result<Vec<CollectedJob>, FetchError> {
    let compiled = selectors.compile()?;
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let posted_at = Utc::now();

    let mut jobs = Vec::new();
    for card in document.select(&compiled.card) {
        let title = text_of(card, &compiled.title);
        let company = text_of(card, &compiled.company);
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let experience = compiled
            .experience
            .as_ref()
            .map(|s| text_of(card, s))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| EXPERIENCE_NOT_SPECIFIED.to_string());

        let href = card
            .select(&compiled.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();

        jobs.push(CollectedJob {
            title,
            company,
            location: text_of(card, &compiled.location),
            experience,
            description: text_of(card, &compiled.description),
            application_link: resolve_link(base.as_ref(), href),
            source: source.to_string(),
            posted_at,
        });
    }
    Ok(jobs)
}

/// Text of every element matching `sel` inside `card`, whitespace-collapsed.
fn text_of(card: ElementRef<'_>, sel: &Selector) -> String {
    let raw: String = card.select(sel).flat_map(|el| el.text()).collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve an href against the page it was found on. Unresolvable links are
/// kept verbatim; a missing href stays empty.
fn resolve_link(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    match base.and_then(|b| b.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::get;

    use super::testing::serve;
    use super::*;

    const SELECTORS: CardSelectors = CardSelectors {
        card: ".card",
        title: ".title",
        company: ".company",
        location: ".location",
        experience: Some(".exp"),
        description: ".desc",
        link: "a.title",
    };

    #[test]
    fn extract_cards_skips_cards_without_title_or_company() {
        let html = r#"
            <div class="card"><a class="title" href="/a">Alpha</a><span class="company">Acme</span></div>
            <div class="card"><a class="title" href="/b">  </a><span class="company">Acme</span></div>
            <div class="card"><a class="title" href="/c">Gamma</a></div>
            <div class="card"><a class="title" href="/d">Delta</a><span class="company">Initech</span></div>
        "#;
        let jobs = extract_cards(html, "https://example.com/search", &SELECTORS, "Test").unwrap();
        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Delta"]);
        assert!(jobs.iter().all(|j| !j.company.is_empty()));
    }

    #[test]
    fn extract_cards_normalizes_text_and_links() {
        let html = r#"
            <div class="card">
                <a class="title" href="/jobs/1?ref=search">
                    Senior   Rust
                    Engineer
                </a>
                <span class="company"> Acme </span>
                <span class="location">Pune</span>
                <span class="desc"></span>
            </div>
        "#;
        let jobs = extract_cards(html, "https://example.com/search", &SELECTORS, "Test").unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.title, "Senior Rust Engineer");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.location, "Pune");
        assert_eq!(job.description, "");
        assert_eq!(job.experience, EXPERIENCE_NOT_SPECIFIED);
        assert_eq!(job.application_link, "https://example.com/jobs/1?ref=search");
        assert_eq!(job.source, "Test");
    }

    #[test]
    fn resolve_link_keeps_absolute_and_missing_links() {
        let base = Url::parse("https://example.com/search").unwrap();
        assert_eq!(
            resolve_link(Some(&base), "https://other.example.org/job/9"),
            "https://other.example.org/job/9"
        );
        assert_eq!(resolve_link(Some(&base), ""), "");
        assert_eq!(resolve_link(None, "/job/9"), "/job/9");
    }

    #[test]
    fn invalid_selector_is_a_fetch_error() {
        let broken = CardSelectors {
            card: "div[",
            ..SELECTORS
        };
        let err = extract_cards("<div></div>", "https://example.com", &broken, "Test").unwrap_err();
        assert!(matches!(err, FetchError::Selector(_)));
    }

    #[tokio::test]
    async fn fetch_page_rejects_non_success_status() {
        let base = serve(Router::new().route(
            "/down",
            get(|| async { (HttpStatus::SERVICE_UNAVAILABLE, "maintenance") }),
        ))
        .await;
        let client = build_client("jobboard-test", Duration::from_secs(5)).unwrap();

        let err = fetch_page(&client, &format!("{base}/down")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn fetch_page_times_out() {
        let base = serve(Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        ))
        .await;
        let client = build_client("jobboard-test", Duration::from_millis(100)).unwrap();

        let err = fetch_page(&client, &format!("{base}/slow")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn fetch_page_returns_body() {
        let base = serve(Router::new().route("/ok", get(|| async { "<html></html>" }))).await;
        let client = build_client("jobboard-test", Duration::from_secs(5)).unwrap();

        let body = fetch_page(&client, &format!("{base}/ok")).await.unwrap();
        assert_eq!(body, "<html></html>");
    }
}
