// Job postings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobCategory {
    Material,
    Labor,
    Machinery,
}

impl JobCategory {
    pub const ALL: [JobCategory; 3] = [
        JobCategory::Material,
        JobCategory::Labor,
        JobCategory::Machinery,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "material" | "materials" => Some(JobCategory::Material),
            "labor" | "labour" => Some(JobCategory::Labor),
            "machinery" => Some(JobCategory::Machinery),
            _ => None,
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobCategory::Material => "Material",
            JobCategory::Labor => "Labor",
            JobCategory::Machinery => "Machinery",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Awarded,
    Closed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Open => "open",
            JobStatus::Awarded => "awarded",
            JobStatus::Closed => "closed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub category: JobCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub delivery_timeline: String,
    #[serde(default)]
    pub budget_range: Option<String>,
    pub posted_by: String,
    pub status: JobStatus,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_urls: Vec<String>,
}

/// Body for `POST /jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJob {
    pub title: String,
    pub category: JobCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub location: String,
    pub delivery_timeline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
}

/// Case-insensitive search over title, description and location, plus an
/// optional category filter. Mirrors the browse tab's search box.
pub fn filter_jobs<'a>(
    jobs: &'a [Job],
    search: &str,
    category: Option<JobCategory>,
) -> Vec<&'a Job> {
    let needle = search.trim().to_lowercase();
    jobs.iter()
        .filter(|job| category.map_or(true, |c| job.category == c))
        .filter(|job| {
            needle.is_empty()
                || job.title.to_lowercase().contains(&needle)
                || job.description.to_lowercase().contains(&needle)
                || job.location.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_job(id: &str, status: JobStatus) -> Job {
    Job {
        id: id.to_string(),
        title: format!("Cement for {id}"),
        category: JobCategory::Material,
        description: "500 bags OPC 53".to_string(),
        quantity: Some("500 bags".to_string()),
        location: "Pune".to_string(),
        delivery_timeline: "2 weeks".to_string(),
        budget_range: None,
        posted_by: "buyer-1".to_string(),
        status,
        created_at: None,
        file_urls: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_job_without_optional_fields() {
        let job: Job = serde_json::from_value(json!({
            "id": "j-1",
            "title": "Excavator hire",
            "category": "machinery",
            "posted_by": "b-1",
            "status": "open"
        }))
        .unwrap();
        assert_eq!(job.category, JobCategory::Machinery);
        assert_eq!(job.status, JobStatus::Open);
        assert!(job.file_urls.is_empty());
    }

    #[test]
    fn new_job_skips_blank_optionals() {
        let job = NewJob {
            title: "Masons".into(),
            category: JobCategory::Labor,
            description: "Ten masons".into(),
            quantity: None,
            location: "Nagpur".into(),
            delivery_timeline: "Immediate".into(),
            budget_range: Some("₹50k-80k".into()),
        };
        let v = serde_json::to_value(&job).unwrap();
        assert_eq!(v["category"], "labor");
        assert!(v.get("quantity").is_none());
        assert_eq!(v["budget_range"], "₹50k-80k");
    }

    #[test]
    fn category_parse_accepts_spelling_variants() {
        assert_eq!(JobCategory::parse("Labour"), Some(JobCategory::Labor));
        assert_eq!(JobCategory::parse("materials"), Some(JobCategory::Material));
        assert_eq!(JobCategory::parse("tools"), None);
    }

    #[test]
    fn filter_matches_location_and_category() {
        let mut a = sample_job("a", JobStatus::Open);
        a.location = "Chennai".into();
        let mut b = sample_job("b", JobStatus::Open);
        b.category = JobCategory::Labor;
        let jobs = vec![a, b];

        let hits = filter_jobs(&jobs, "chennai", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        let hits = filter_jobs(&jobs, "", Some(JobCategory::Labor));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");

        assert_eq!(filter_jobs(&jobs, "  ", None).len(), 2);
    }
}
