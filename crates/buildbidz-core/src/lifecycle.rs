// Job and bid state transitions, mirrored locally for optimistic updates.
//
// The server is authoritative. These rules decide what the client offers
// (award buttons, bid forms, chat access) and how it patches its cached
// lists between a successful mutation and the refetch that follows.

use thiserror::Error;

use crate::model::{Bid, BidStatus, Job, JobStatus, Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("job {job_id} is {status}, not open")]
    JobNotOpen { job_id: String, status: JobStatus },

    #[error("bid {bid_id} does not belong to job {job_id}")]
    BidNotOnJob { bid_id: String, job_id: String },

    #[error("bid {bid_id} is already {status}")]
    BidNotSubmitted { bid_id: String, status: BidStatus },

    #[error("bid {bid_id} not found")]
    BidNotFound { bid_id: String },

    #[error("You have already submitted a bid for this job")]
    AlreadyBid { job_id: String },

    #[error("cannot move job from {from} to {to}")]
    InvalidJobTransition { from: JobStatus, to: JobStatus },
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Whether a job may move from `from` to `to`.
pub fn job_transition_allowed(from: JobStatus, to: JobStatus) -> bool {
    matches!(
        (from, to),
        (JobStatus::Open, JobStatus::Awarded)
            | (JobStatus::Open, JobStatus::Closed)
            | (JobStatus::Awarded, JobStatus::Closed)
    )
}

pub fn transition_job(job: &mut Job, to: JobStatus) -> Result<(), LifecycleError> {
    if !job_transition_allowed(job.status, to) {
        return Err(LifecycleError::InvalidJobTransition {
            from: job.status,
            to,
        });
    }
    job.status = to;
    Ok(())
}

/// Whether a bid may move from `from` to `to`.
pub fn bid_transition_allowed(from: BidStatus, to: BidStatus) -> bool {
    from == BidStatus::Submitted && matches!(to, BidStatus::Awarded | BidStatus::Rejected)
}

/// Check that `bid_id` can be awarded on `job` given the known `bids`.
pub fn check_award(job: &Job, bids: &[Bid], bid_id: &str) -> Result<(), LifecycleError> {
    if job.status != JobStatus::Open {
        return Err(LifecycleError::JobNotOpen {
            job_id: job.id.clone(),
            status: job.status,
        });
    }
    let bid = bids
        .iter()
        .find(|b| b.id == bid_id)
        .ok_or_else(|| LifecycleError::BidNotFound {
            bid_id: bid_id.to_string(),
        })?;
    if bid.job_id != job.id {
        return Err(LifecycleError::BidNotOnJob {
            bid_id: bid.id.clone(),
            job_id: job.id.clone(),
        });
    }
    if bid.status != BidStatus::Submitted {
        return Err(LifecycleError::BidNotSubmitted {
            bid_id: bid.id.clone(),
            status: bid.status,
        });
    }
    Ok(())
}

/// Award `bid_id`: it becomes awarded, every other bid on the job is
/// rejected, and the job becomes awarded. Nothing changes on error.
pub fn apply_award(job: &mut Job, bids: &mut [Bid], bid_id: &str) -> Result<(), LifecycleError> {
    check_award(job, bids, bid_id)?;
    transition_job(job, JobStatus::Awarded)?;
    for bid in bids.iter_mut().filter(|b| b.job_id == job.id) {
        let to = if bid.id == bid_id {
            BidStatus::Awarded
        } else {
            BidStatus::Rejected
        };
        if bid_transition_allowed(bid.status, to) {
            bid.status = to;
        }
    }
    Ok(())
}

/// Award button visibility: a buyer looking at a submitted bid on an open job.
pub fn can_award(user: &User, job: &Job, bid: &Bid) -> bool {
    user.role == Role::Buyer
        && job.posted_by == user.id
        && job.status == JobStatus::Open
        && bid.status == BidStatus::Submitted
}

/// Refuse a bid on a closed/awarded job or a second bid by the same bidder.
/// `known_bids` is whatever the client has cached for this user.
pub fn check_can_bid(job: &Job, bidder_id: &str, known_bids: &[Bid]) -> Result<(), LifecycleError> {
    if job.status != JobStatus::Open {
        return Err(LifecycleError::JobNotOpen {
            job_id: job.id.clone(),
            status: job.status,
        });
    }
    if known_bids
        .iter()
        .any(|b| b.job_id == job.id && b.supplier_id == bidder_id)
    {
        return Err(LifecycleError::AlreadyBid {
            job_id: job.id.clone(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chat access
// ---------------------------------------------------------------------------

/// The awarded bid on a job, if any.
pub fn awarded_bid<'a>(job_id: &str, bids: &'a [Bid]) -> Option<&'a Bid> {
    bids.iter()
        .find(|b| b.job_id == job_id && b.status == BidStatus::Awarded)
}

/// Chat opens once a job has an awarded bid.
pub fn chat_unlocked(job: &Job, bids: &[Bid]) -> bool {
    matches!(job.status, JobStatus::Awarded | JobStatus::Closed) && awarded_bid(&job.id, bids).is_some()
}

/// Chat participants: the job owner, whoever placed the awarded bid, and admins.
pub fn is_chat_participant(user: &User, job: &Job, bids: &[Bid]) -> bool {
    if !chat_unlocked(job, bids) {
        return false;
    }
    if user.role == Role::Admin || job.posted_by == user.id {
        return true;
    }
    awarded_bid(&job.id, bids).is_some_and(|b| b.supplier_id == user.id)
}
