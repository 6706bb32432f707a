// Messages between the terminal front end and the orchestrator.

use std::path::PathBuf;

use buildbidz_core::access::{BidsTab, JobsTab, Route};
use buildbidz_core::api::AdminTable;
use buildbidz_core::model::{
    Bid, ChatAnalytics, ChatSummary, DashboardStats, FileAttachment, Job, Message, NewBid, NewJob,
    Notification, PaymentConfirmation, ProfileUpdate, RegisterRequest, ResetPassword,
    SalesmanBid, SubscriptionOrder, User, UserDetails,
};
use buildbidz_core::ApiError;

// ---------------------------------------------------------------------------
// Commands (TUI -> orchestrator)
// ---------------------------------------------------------------------------

/// Requests from the front end. Form input is validated before a command is
/// built, so every field here is already well-formed.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Navigate(Route),

    // Session
    Login { email: String, password: String },
    Register(RegisterRequest),
    Logout,
    ForgotPassword { email: String },
    ResetPassword(ResetPassword),
    UpdateProfile(ProfileUpdate),
    ChangePassword { current: String, new: String },

    // Listings
    RefreshDashboard,
    LoadJobs(JobsTab),
    LoadBids(BidsTab),
    ViewJobBids { job_id: String },

    // Mutations
    CreateJob { job: NewJob, attachments: Vec<PathBuf> },
    SubmitBid { job_id: String, bid: NewBid, attachments: Vec<PathBuf> },
    SubmitSalesmanBid { job_id: String, bid: SalesmanBid, attachments: Vec<PathBuf> },
    AwardBid { job_id: String, bid_id: String },

    // Chat
    LoadChats,
    OpenChat { job_id: String },
    /// Switch to the Chat route with this job's conversation open.
    ChatAboutJob { job_id: String },
    CloseChat,
    SendMessage { job_id: String, text: String, attachments: Vec<PathBuf> },
    DeleteMessage { job_id: String, message_id: String },
    DownloadAttachment { file: FileAttachment },

    // Notifications
    LoadNotifications,

    // Subscription
    CreateSubscriptionOrder,
    VerifySubscription(PaymentConfirmation),

    // Admin
    AdminLoad(AdminTable),
    AdminDelete { table: AdminTable, id: String },
    AdminUserDetails { user_id: String },
    AdminChatAnalytics,
    AdminExport(AdminTable),

    Quit,
}

// ---------------------------------------------------------------------------
// Updates (orchestrator -> TUI)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Inline message shown above the active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    /// Route the user is pointed to, e.g. Subscription after a 402.
    pub hint: Option<Route>,
}

impl Banner {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            text: text.into(),
            hint: None,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
            hint: None,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Warning,
            text: text.into(),
            hint: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
            hint: None,
        }
    }

    /// "Failed to <action>: <detail>"
    pub fn failure(action: &str, err: &ApiError) -> Self {
        let mut banner = Self::error(format!("Failed to {action}: {}", err.detail()));
        if err.is_payment_required() {
            banner.hint = Some(Route::Subscription);
        }
        banner
    }

    pub fn with_hint(mut self, route: Route) -> Self {
        self.hint = Some(route);
        self
    }
}

/// Which bid list an update carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidsView {
    Received { job_id: String },
    Mine,
}

/// Which form an update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Profile,
    ChangePassword,
    NewJob,
    Bid,
    SalesmanBid,
    Message,
    PaymentConfirmation,
}

#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Signed-in user changed (`None` on logout or expiry).
    Session(Option<User>),
    Route(Route),
    Banner(Banner),
    ClearBanner,
    /// A submitted form was accepted; the front end closes it.
    FormAccepted(FormKind),
    Loading(bool),

    Dashboard(DashboardStats),
    Jobs { tab: JobsTab, jobs: Vec<Job> },
    Bids { view: BidsView, bids: Vec<Bid> },

    Chats(Vec<ChatSummary>),
    Messages { job_id: String, messages: Vec<Message> },

    UnreadNotifications(u32),
    Notifications(Vec<Notification>),

    SubscriptionOrder(SubscriptionOrder),

    AdminUsers(Vec<User>),
    AdminJobs(Vec<Job>),
    AdminBids(Vec<Bid>),
    AdminUserDetails(Box<UserDetails>),
    ChatAnalytics(ChatAnalytics),
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildbidz_core::error::StatusCode;

    #[test]
    fn failure_banner_reads_failed_to_action() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: "Job not found or closed".into(),
        };
        let banner = Banner::failure("submit bid", &err);
        assert_eq!(banner.kind, BannerKind::Error);
        assert_eq!(banner.text, "Failed to submit bid: Job not found or closed");
        assert!(banner.hint.is_none());
    }

    #[test]
    fn payment_required_points_to_subscription() {
        let err = ApiError::Status {
            status: StatusCode::PAYMENT_REQUIRED,
            detail: "Active subscription required".into(),
        };
        let banner = Banner::failure("create job", &err);
        assert_eq!(banner.text, "Failed to create job: Active subscription required");
        assert_eq!(banner.hint, Some(Route::Subscription));
    }

    #[test]
    fn not_signed_in_banner() {
        let banner = Banner::failure("load jobs", &ApiError::NotAuthenticated);
        assert_eq!(banner.text, "Failed to load jobs: not signed in");
    }
}
