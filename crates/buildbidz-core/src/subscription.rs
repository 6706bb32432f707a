// Buyer subscription and free-trial gating.

use chrono::{DateTime, Utc};

use crate::model::{Role, SubscriptionStatus, User};

/// Shown when job creation is refused for lack of a subscription.
pub const SUBSCRIPTION_REQUIRED: &str = "Active subscription required";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

fn trial_remaining(user: &User, now: DateTime<Utc>) -> Option<chrono::Duration> {
    user.trial_expires_at
        .map(|expiry| expiry - now)
        .filter(|left| *left > chrono::Duration::zero())
}

/// Buyer on a trial that has not yet expired.
pub fn trial_active(user: &User, now: DateTime<Utc>) -> bool {
    user.role == Role::Buyer
        && user.subscription_status == SubscriptionStatus::Trial
        && trial_remaining(user, now).is_some()
}

/// Buyer without an active plan and without any running trial.
pub fn needs_subscription(user: &User, now: DateTime<Utc>) -> bool {
    user.role == Role::Buyer
        && user.subscription_status != SubscriptionStatus::Active
        && trial_remaining(user, now).is_none()
}

/// Whole days left on the trial, rounded up. Zero once expired.
pub fn trial_days_left(user: &User, now: DateTime<Utc>) -> u32 {
    match trial_remaining(user, now) {
        Some(left) => {
            let secs = left.num_seconds().max(1);
            ((secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY) as u32
        }
        None => 0,
    }
}

/// One-line status for the dashboard and subscription page.
pub fn describe(user: &User, now: DateTime<Utc>) -> String {
    if user.role != Role::Buyer {
        return String::new();
    }
    if user.subscription_status == SubscriptionStatus::Active {
        return match user.subscription_expires_at {
            Some(expiry) => format!("Subscription active until {}", expiry.format("%d %b %Y")),
            None => "Subscription active".to_string(),
        };
    }
    if trial_active(user, now) {
        let days = trial_days_left(user, now);
        let unit = if days == 1 { "day" } else { "days" };
        return format!("Free trial: {days} {unit} left");
    }
    "Subscribe to post jobs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::user_with_role;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn buyer(status: SubscriptionStatus, trial_in: Option<Duration>) -> User {
        let mut u = user_with_role(Role::Buyer);
        u.subscription_status = status;
        u.trial_expires_at = trial_in.map(|d| now() + d);
        u
    }

    #[test]
    fn running_trial() {
        let u = buyer(SubscriptionStatus::Trial, Some(Duration::days(3)));
        assert!(trial_active(&u, now()));
        assert!(!needs_subscription(&u, now()));
        assert_eq!(trial_days_left(&u, now()), 3);
    }

    #[test]
    fn partial_days_round_up() {
        let u = buyer(SubscriptionStatus::Trial, Some(Duration::hours(30)));
        assert_eq!(trial_days_left(&u, now()), 2);
        let u = buyer(SubscriptionStatus::Trial, Some(Duration::minutes(5)));
        assert_eq!(trial_days_left(&u, now()), 1);
        assert_eq!(describe(&u, now()), "Free trial: 1 day left");
    }

    #[test]
    fn expired_trial_needs_subscription() {
        let u = buyer(SubscriptionStatus::Trial, Some(Duration::days(-1)));
        assert!(!trial_active(&u, now()));
        assert!(needs_subscription(&u, now()));
        assert_eq!(trial_days_left(&u, now()), 0);
        assert_eq!(describe(&u, now()), "Subscribe to post jobs");
    }

    #[test]
    fn active_plan_never_needs_subscription() {
        let u = buyer(SubscriptionStatus::Active, None);
        assert!(!needs_subscription(&u, now()));
        assert!(!trial_active(&u, now()));
        assert_eq!(describe(&u, now()), "Subscription active");
    }

    #[test]
    fn inactive_without_trial() {
        let u = buyer(SubscriptionStatus::Inactive, None);
        assert!(needs_subscription(&u, now()));
        let u = buyer(SubscriptionStatus::Expired, None);
        assert!(needs_subscription(&u, now()));
    }

    #[test]
    fn non_buyers_are_never_gated() {
        for role in [Role::Supplier, Role::Admin, Role::Salesman] {
            let u = user_with_role(role);
            assert!(!needs_subscription(&u, now()));
            assert!(!trial_active(&u, now()));
            assert!(describe(&u, now()).is_empty());
        }
    }
}
