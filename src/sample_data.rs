// Placeholder listings served while the store is still empty.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::models::job::{Job, ListingFilter, SortKey};

const SAMPLE_COUNT: usize = 100;
const SEED: u64 = 0x6a6f_6273;

const TITLES: &[&str] = &[
    "Software Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "DevOps Engineer",
    "Product Manager",
    "Data Scientist",
    "UI/UX Designer",
    "Project Manager",
    "QA Engineer",
];

const COMPANIES: &[&str] = &[
    "Google",
    "Microsoft",
    "Amazon",
    "Apple",
    "Meta",
    "Netflix",
    "Twitter",
    "LinkedIn",
    "Uber",
    "Airbnb",
];

pub const LOCATIONS: &[&str] = &["Remote", "Hybrid", "On-site"];
pub const EXPERIENCE_LEVELS: &[&str] = &["Entry Level", "Mid Level", "Senior Level"];

pub const SOURCE: &str = "Local Dummy Data";

/// The full sample set. The seed is fixed so pages stay consistent between
/// requests; only the timestamps move with the clock.
pub fn sample_jobs() -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let now = Utc::now();

    (1..=SAMPLE_COUNT)
        .map(|n| {
            let title = pick(&mut rng, TITLES);
            let title = if rng.random_bool(0.5) {
                format!("{} {title}", pick(&mut rng, &["Senior", "Lead", "Principal"]))
            } else {
                title.to_string()
            };
            let salary_low: u32 = rng.random_range(50_000..150_000);
            let salary_high = salary_low + rng.random_range(0..50_000);
            let age = Duration::seconds(rng.random_range(0..7 * 24 * 60 * 60));

            Job {
                id: n as i32,
                title,
                company: pick(&mut rng, COMPANIES).to_string(),
                location: pick(&mut rng, LOCATIONS).to_string(),
                experience: pick(&mut rng, EXPERIENCE_LEVELS).to_string(),
                description: format!(
                    "We are looking for a talented professional to join our team.\n\n\
                     Salary Range: {} - {}\n\n\
                     Requirements:\n\
                     - Bachelor's degree in relevant field\n\
                     - Strong technical skills\n\
                     - Excellent communication abilities\n\
                     - Problem-solving mindset",
                    dollars(salary_low),
                    dollars(salary_high)
                ),
                application_link: format!("https://careers.example.com/jobs/{n}"),
                source: SOURCE.to_string(),
                posted_at: now - age,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

/// Sample jobs matching `filter`, sorted like the store would sort them.
pub fn matching(filter: &ListingFilter, sort: SortKey) -> Vec<Job> {
    let mut jobs: Vec<Job> = sample_jobs()
        .into_iter()
        .filter(|job| filter.matches(job))
        .collect();
    // created_at is identical across the set, so that order is generation order.
    if sort == SortKey::PostedAt {
        jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    }
    jobs
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn dollars(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}
