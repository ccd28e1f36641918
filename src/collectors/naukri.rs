use async_trait::async_trait;
use percent_encoding::utf8_percent_encode;

use crate::collectors::{
    CardSelectors, ENCODE_URI_COMPONENT_SET, FetchError, JobCollector, extract_cards, fetch_page,
};
use crate::models::job::CollectedJob;

pub const DEFAULT_BASE_URL: &str = "https://www.naukri.com";
const SOURCE: &str = "Naukri";

const SELECTORS: CardSelectors = CardSelectors {
    card: ".jobTuple",
    title: ".title",
    company: ".companyInfo",
    location: ".location",
    experience: Some(".experience"),
    description: ".job-description",
    link: "a.title",
};

pub struct Naukri {
    client: reqwest::Client,
    base_url: String,
}

impl Naukri {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Naukri search pages live at `/<keyword-slug>-jobs`.
    fn search_url(&self, keyword: &str) -> String {
        let slug = keyword
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        format!(
            "{}/{}-jobs",
            self.base_url,
            utf8_percent_encode(&slug, ENCODE_URI_COMPONENT_SET)
        )
    }
}

#[async_trait]
impl JobCollector for Naukri {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn collect(&self, keyword: &str) -> Result<Vec<CollectedJob>, FetchError> {
        let url = self.search_url(keyword);
        let html = fetch_page(&self.client, &url).await?;
        extract_cards(&html, &url, &SELECTORS, SOURCE)
    }
}
