// Route guards, role capabilities and per-role defaults.

use std::fmt;

use crate::model::{Job, Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Auth,
    About,
    Dashboard,
    Jobs,
    Bids,
    Chat,
    Settings,
    Subscription,
}

impl Route {
    /// Routes a signed-in user can reach from the navigation bar, in order.
    pub const NAV: [Route; 6] = [
        Route::Dashboard,
        Route::Jobs,
        Route::Bids,
        Route::Chat,
        Route::Settings,
        Route::Subscription,
    ];

    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Jobs | Route::Bids | Route::Chat | Route::Settings
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Landing => "landing",
            Route::Auth => "auth",
            Route::About => "about",
            Route::Dashboard => "dashboard",
            Route::Jobs => "jobs",
            Route::Bids => "bids",
            Route::Chat => "chat",
            Route::Settings => "settings",
            Route::Subscription => "subscription",
        }
    }

    pub fn parse(s: &str) -> Option<Route> {
        let route = match s {
            "landing" => Route::Landing,
            "auth" => Route::Auth,
            "about" => Route::About,
            "dashboard" => Route::Dashboard,
            "jobs" => Route::Jobs,
            "bids" => Route::Bids,
            "chat" => Route::Chat,
            "settings" => Route::Settings,
            "subscription" => Route::Subscription,
            _ => return None,
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Route::Landing => "Home",
            Route::Auth => "Sign in",
            Route::About => "About",
            Route::Dashboard => "Dashboard",
            Route::Jobs => "Jobs",
            Route::Bids => "Bids",
            Route::Chat => "Chat",
            Route::Settings => "Settings",
            Route::Subscription => "Subscription",
        })
    }
}

/// The route actually shown when `requested` is asked for.
pub fn guard(requested: Route, user: Option<&User>) -> Route {
    match (requested, user) {
        (Route::Landing | Route::Auth, Some(_)) => Route::Dashboard,
        (Route::About, _) => Route::About,
        (Route::Subscription, Some(u)) if u.role == Role::Buyer => Route::Subscription,
        (Route::Subscription, Some(_)) => Route::Dashboard,
        (Route::Subscription, None) => Route::Landing,
        (r, None) if r.is_protected() => Route::Landing,
        (r, _) => r,
    }
}

/// Routes offered in the navigation bar for this user.
pub fn nav_routes(user: &User) -> Vec<Route> {
    Route::NAV
        .into_iter()
        .filter(|r| guard(*r, Some(user)) == *r)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Admin,
    Salesman,
    Standard,
}

pub fn dashboard_kind(user: &User) -> DashboardKind {
    match user.role {
        Role::Admin => DashboardKind::Admin,
        Role::Salesman => DashboardKind::Salesman,
        Role::Buyer | Role::Supplier => DashboardKind::Standard,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    PostJob,
    SubmitBid,
    SubmitSalesmanBid,
    AwardBid,
    ViewMyJobs,
    ViewMyBids,
    ViewJobBids,
    Subscribe,
    Administer,
}

pub fn permits(user: &User, capability: Capability) -> bool {
    use Capability::*;
    match capability {
        PostJob | AwardBid | ViewMyJobs | Subscribe => user.role == Role::Buyer,
        SubmitBid => user.role == Role::Supplier,
        SubmitSalesmanBid => user.role == Role::Salesman,
        ViewMyBids => matches!(user.role, Role::Supplier | Role::Salesman),
        ViewJobBids => matches!(user.role, Role::Buyer | Role::Admin),
        Administer => user.role == Role::Admin,
    }
}

/// Whether this user may list the bids on `job`: its owner or an admin.
pub fn can_view_job_bids(user: &User, job: &Job) -> bool {
    user.role == Role::Admin || (user.role == Role::Buyer && job.posted_by == user.id)
}

/// Sub-view of the Jobs tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobsTab {
    Browse,
    Mine,
}

/// Sub-view of the Bids tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidsTab {
    Received,
    Mine,
}

pub fn default_jobs_tab(user: &User) -> JobsTab {
    if user.role == Role::Buyer {
        JobsTab::Mine
    } else {
        JobsTab::Browse
    }
}

pub fn default_bids_tab(user: &User) -> BidsTab {
    if user.role == Role::Buyer {
        BidsTab::Received
    } else {
        BidsTab::Mine
    }
}

#[cfg(test)]
pub(crate) fn user_with_role(role: Role) -> User {
    use crate::model::SubscriptionStatus;
    User {
        id: format!("{}-1", role.as_str()),
        email: format!("{}@example.in", role.as_str()),
        company_name: format!("{role} Co"),
        contact_phone: "+91-9000000000".to_string(),
        role,
        gst_number: None,
        address: None,
        is_verified: true,
        subscription_status: SubscriptionStatus::Inactive,
        subscription_expires_at: None,
        trial_expires_at: None,
        created_at: None,
    }
}
