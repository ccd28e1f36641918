use async_trait::async_trait;
use percent_encoding::utf8_percent_encode;

use crate::collectors::{
    CardSelectors, ENCODE_URI_COMPONENT_SET, FetchError, JobCollector, extract_cards, fetch_page,
};
use crate::models::job::CollectedJob;

pub const DEFAULT_BASE_URL: &str = "https://www.linkedin.com";
const SOURCE: &str = "LinkedIn";

// Public job search cards carry no experience level.
const SELECTORS: CardSelectors = CardSelectors {
    card: ".job-search-card",
    title: ".job-search-card__title",
    company: ".job-search-card__company-name",
    location: ".job-search-card__location",
    experience: None,
    description: ".job-search-card__snippet",
    link: "a.job-search-card__link",
};

pub struct LinkedIn {
    client: reqwest::Client,
    base_url: String,
}

impl LinkedIn {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}/jobs/search?keywords={}",
            self.base_url,
            utf8_percent_encode(keyword.trim(), ENCODE_URI_COMPONENT_SET)
        )
    }
}

#[async_trait]
impl JobCollector for LinkedIn {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn collect(&self, keyword: &str) -> Result<Vec<CollectedJob>, FetchError> {
        let url = self.search_url(keyword);
        let html = fetch_page(&self.client, &url).await?;
        extract_cards(&html, &url, &SELECTORS, SOURCE)
    }
}
