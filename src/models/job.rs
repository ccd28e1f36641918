use chrono::{DateTime, Utc};
use serde::Serialize;

/// Experience level recorded when a source does not expose one.
pub const EXPERIENCE_NOT_SPECIFIED: &str = "Not specified";

/// A persisted job listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience: String,
    pub description: String,
    pub application_link: String,
    pub source: String,
    pub posted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job as extracted from a source page, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience: String,
    pub description: String,
    pub application_link: String,
    pub source: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidJob {
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl CollectedJob {
    /// Checks the fields the `jobs` table requires to be non-blank.
    /// The description may be empty.
    pub fn validate(&self) -> Result<(), InvalidJob> {
        let required = [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("experience", &self.experience),
            ("application_link", &self.application_link),
            ("source", &self.source),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(InvalidJob::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Column filters shared by listing, search and filter queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Case-insensitive substring matched against title, company or description.
    pub search: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = [&job.title, &job.company, &job.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(location) = &self.location
            && job.location != *location
        {
            return false;
        }
        if let Some(experience) = &self.experience
            && job.experience != *experience
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest insert first.
    CreatedAt,
    /// Newest posting date first.
    PostedAt,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn collected(title: &str, company: &str) -> CollectedJob {
        CollectedJob {
            title: title.to_string(),
            company: company.to_string(),
            location: "Bengaluru".to_string(),
            experience: EXPERIENCE_NOT_SPECIFIED.to_string(),
            description: String::new(),
            application_link: format!("https://jobs.example.com/{}", title.replace(' ', "-")),
            source: "Test".to_string(),
            posted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::collected;
    use super::*;

    fn persisted(job: CollectedJob) -> Job {
        let now = Utc::now();
        Job {
            id: 1,
            title: job.title,
            company: job.company,
            location: job.location,
            experience: job.experience,
            description: job.description,
            application_link: job.application_link,
            source: job.source,
            posted_at: job.posted_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validate_allows_empty_description() {
        assert_eq!(collected("Rust Engineer", "Acme").validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        let mut job = collected("Rust Engineer", "Acme");
        job.application_link = "  ".to_string();
        assert_eq!(
            job.validate(),
            Err(InvalidJob::MissingField("application_link"))
        );

        let mut job = collected("Rust Engineer", "Acme");
        job.location.clear();
        assert_eq!(job.validate(), Err(InvalidJob::MissingField("location")));
    }

    #[test]
    fn filter_search_is_case_insensitive_across_fields() {
        let mut job = collected("Data Scientist", "Acme");
        job.description = "Work on FORECASTING models".to_string();
        let job = persisted(job);

        let by_company = ListingFilter {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        let by_description = ListingFilter {
            search: Some("forecast".to_string()),
            ..Default::default()
        };
        let miss = ListingFilter {
            search: Some("plumber".to_string()),
            ..Default::default()
        };
        assert!(by_company.matches(&job));
        assert!(by_description.matches(&job));
        assert!(!miss.matches(&job));
    }

    #[test]
    fn filter_location_and_experience_are_exact() {
        let job = persisted(collected("Data Scientist", "Acme"));
        let filter = ListingFilter {
            location: Some("bengaluru".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&job));

        let filter = ListingFilter {
            location: Some("Bengaluru".to_string()),
            experience: Some(EXPERIENCE_NOT_SPECIFIED.to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&job));
    }

    #[test]
    fn job_serializes_with_camel_case_keys() {
        let job = persisted(collected("Data Scientist", "Acme"));
        let value = serde_json::to_value(&job).unwrap();
        assert!(value.get("applicationLink").is_some());
        assert!(value.get("postedAt").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
