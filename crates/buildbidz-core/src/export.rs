// CSV export of the admin tables.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::AdminTable;
use crate::model::{Bid, Job, User};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Flat row shapes (private)
// ---------------------------------------------------------------------------

fn ts(dt: &Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.to_rfc3339()).unwrap_or_default()
}

#[derive(Serialize)]
struct UserRow<'a> {
    id: &'a str,
    email: &'a str,
    company_name: &'a str,
    contact_phone: &'a str,
    role: &'a str,
    gst_number: &'a str,
    is_verified: bool,
    subscription_status: &'a str,
    created_at: String,
}

#[derive(Serialize)]
struct JobRow<'a> {
    id: &'a str,
    title: &'a str,
    category: String,
    location: &'a str,
    quantity: &'a str,
    budget_range: &'a str,
    delivery_timeline: &'a str,
    status: String,
    posted_by: &'a str,
    created_at: String,
}

#[derive(Serialize)]
struct BidRow<'a> {
    id: &'a str,
    job_id: &'a str,
    supplier_id: &'a str,
    bidder: &'a str,
    price_quote: f64,
    delivery_estimate: &'a str,
    status: String,
    created_at: String,
}

// ---------------------------------------------------------------------------
// Writer-based exporters (testable without temp files)
// ---------------------------------------------------------------------------

pub fn write_users<W: Write>(out: W, users: &[User]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for u in users {
        writer.serialize(UserRow {
            id: &u.id,
            email: &u.email,
            company_name: &u.company_name,
            contact_phone: &u.contact_phone,
            role: u.role.as_str(),
            gst_number: u.gst_number.as_deref().unwrap_or(""),
            is_verified: u.is_verified,
            subscription_status: u.subscription_status.label(),
            created_at: ts(&u.created_at),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_jobs<W: Write>(out: W, jobs: &[Job]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for j in jobs {
        writer.serialize(JobRow {
            id: &j.id,
            title: &j.title,
            category: j.category.to_string(),
            location: &j.location,
            quantity: j.quantity.as_deref().unwrap_or(""),
            budget_range: j.budget_range.as_deref().unwrap_or(""),
            delivery_timeline: &j.delivery_timeline,
            status: j.status.to_string(),
            posted_by: &j.posted_by,
            created_at: ts(&j.created_at),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_bids<W: Write>(out: W, bids: &[Bid]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for b in bids {
        writer.serialize(BidRow {
            id: &b.id,
            job_id: &b.job_id,
            supplier_id: &b.supplier_id,
            bidder: b.bidder_name(),
            price_quote: b.price_quote,
            delivery_estimate: &b.delivery_estimate,
            status: b.status.to_string(),
            created_at: ts(&b.created_at),
        })?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File exporters
// ---------------------------------------------------------------------------

/// `<dir>/buildbidz-<table>-<timestamp>.csv`
pub fn export_path(dir: &Path, table: AdminTable, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!(
        "buildbidz-{}-{}.csv",
        table.as_str(),
        now.format("%Y%m%d-%H%M%S")
    ))
}

/// Create `path` (and its parent) and hand the file to `write`.
pub fn export_to_file<F>(path: &Path, write: F) -> Result<PathBuf, ExportError>
where
    F: FnOnce(std::fs::File) -> Result<(), csv::Error>,
{
    let shown = path.display().to_string();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: shown.clone(),
            source,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: shown.clone(),
        source,
    })?;
    write(file).map_err(|source| ExportError::Csv {
        path: shown.clone(),
        source,
    })?;
    info!(path = %shown, "exported CSV");
    Ok(path.to_path_buf())
}
