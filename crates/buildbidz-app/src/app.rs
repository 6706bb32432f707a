// Application state and orchestration logic.
//
// The central event loop that turns user commands from the TUI into REST
// calls, folds poll results into the open conversation and the unread
// counter, and pushes UI updates to the TUI render loop. Handlers follow
// one shape: fetch on open, submit on confirm, update the local copy
// optimistically where it helps, then refetch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildbidz_core::access::{
    can_view_job_bids, default_bids_tab, default_jobs_tab, guard, permits, BidsTab, Capability,
    JobsTab, Route,
};
use buildbidz_core::api::AdminTable;
use buildbidz_core::config::Config;
use buildbidz_core::db::Database;
use buildbidz_core::export;
use buildbidz_core::lifecycle;
use buildbidz_core::model::{
    Bid, ChangePassword, ChatSummary, FileAttachment, Job, Message, NewBid, NewJob,
    PaymentConfirmation, SalesmanBid, User,
};
use buildbidz_core::poll::{PollEvent, PollIntervals, PollKind, Poller};
use buildbidz_core::upload::{partial_upload_warning, UploadTarget};
use buildbidz_core::{ApiClient, ApiError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{Banner, BidsView, FormKind, UiUpdate, UserCommand};
use crate::session;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the orchestrator knows. The TUI holds a display mirror of the
/// parts it renders; this is the copy requests and optimistic updates work
/// against.
pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub db: Database,
    pub poller: Poller<ApiClient>,

    pub user: Option<User>,
    pub route: Route,

    pub open_jobs: Vec<Job>,
    pub my_jobs: Vec<Job>,
    /// Bids on the job the owner (or an admin) is looking at.
    pub received_bids: Option<(String, Vec<Bid>)>,
    pub my_bids: Vec<Bid>,

    pub chats: Vec<ChatSummary>,
    /// Messages of the open conversation (`poller.open_job()`).
    pub messages: Vec<Message>,
    pub unread_notifications: u32,

    pub admin_users: Vec<User>,
    pub admin_jobs: Vec<Job>,
    pub admin_bids: Vec<Bid>,

    /// Set when a request came back 401; the loop ends the session once the
    /// current handler returns.
    session_expired: bool,
}

impl AppState {
    pub fn new(
        config: Config,
        api: Arc<ApiClient>,
        db: Database,
        poll_tx: mpsc::Sender<PollEvent>,
    ) -> Self {
        let intervals = PollIntervals::from(&config.polling);
        let poller = Poller::new(Arc::clone(&api), poll_tx, intervals);
        Self {
            config,
            api,
            db,
            poller,
            user: None,
            route: Route::Landing,
            open_jobs: Vec::new(),
            my_jobs: Vec::new(),
            received_bids: None,
            my_bids: Vec::new(),
            chats: Vec::new(),
            messages: Vec::new(),
            unread_notifications: 0,
            admin_users: Vec::new(),
            admin_jobs: Vec::new(),
            admin_bids: Vec::new(),
            session_expired: false,
        }
    }

    /// Drop every per-user listing, e.g. when the session ends.
    pub fn reset_caches(&mut self) {
        self.open_jobs.clear();
        self.my_jobs.clear();
        self.received_bids = None;
        self.my_bids.clear();
        self.chats.clear();
        self.messages.clear();
        self.unread_notifications = 0;
        self.admin_users.clear();
        self.admin_jobs.clear();
        self.admin_bids.clear();
    }

    /// A job from any cached listing.
    pub fn find_job(&self, job_id: &str) -> Option<&Job> {
        self.my_jobs
            .iter()
            .chain(self.open_jobs.iter())
            .chain(self.admin_jobs.iter())
            .find(|j| j.id == job_id)
    }

    fn can(&self, capability: Capability) -> bool {
        self.user.as_ref().is_some_and(|u| permits(u, capability))
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Restores (or auto-creates) a session first, then listens on two channels
/// using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Poll results for the open conversation and the unread counter
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut poll_rx: mpsc::Receiver<PollEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    if !session::restore(&mut state, &ui_tx).await {
        session::auto_login(&mut state, &ui_tx).await;
    }
    if state.user.is_none() {
        let _ = ui_tx.send(UiUpdate::Route(state.route)).await;
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            Some(event) = poll_rx.recv() => {
                handle_poll_event(&mut state, event, &ui_tx).await;
            }
        }

        if std::mem::take(&mut state.session_expired) {
            session::expire(&mut state, &ui_tx).await;
        }
    }

    state.poller.stop_all();
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Report a failed request as an inline banner. A 401 while signed in
/// marks the session expired instead.
async fn fail(state: &mut AppState, action: &str, err: ApiError, ui_tx: &mpsc::Sender<UiUpdate>) {
    if err.is_unauthorized() && state.user.is_some() {
        warn!(action, "request unauthorized, ending session");
        state.session_expired = true;
        return;
    }
    warn!(action, error = %err, "request failed");
    let _ = ui_tx
        .send(UiUpdate::Banner(Banner::failure(action, &err)))
        .await;
}

async fn banner(ui_tx: &mpsc::Sender<UiUpdate>, banner: Banner) {
    let _ = ui_tx.send(UiUpdate::Banner(banner)).await;
}

async fn accepted(ui_tx: &mpsc::Sender<UiUpdate>, form: FormKind) {
    let _ = ui_tx.send(UiUpdate::FormAccepted(form)).await;
}

/// Show `requested` (after the route guard) and load what it displays.
pub async fn navigate(state: &mut AppState, requested: Route, ui_tx: &mpsc::Sender<UiUpdate>) {
    let target = guard(requested, state.user.as_ref());
    if target != requested {
        debug!(?requested, ?target, "route redirected");
    }
    if state.route == Route::Chat && target != Route::Chat {
        state.poller.close_chat();
        state.messages.clear();
    }
    state.route = target;
    if state.user.is_some() {
        if let Err(e) = state.db.save_last_route(target.as_str()) {
            warn!("Failed to save last route: {e:#}");
        }
    }
    let _ = ui_tx.send(UiUpdate::Route(target)).await;
    let _ = ui_tx.send(UiUpdate::ClearBanner).await;

    let _ = ui_tx.send(UiUpdate::Loading(true)).await;
    fetch_on_open(state, target, ui_tx).await;
    let _ = ui_tx.send(UiUpdate::Loading(false)).await;
}

async fn fetch_on_open(state: &mut AppState, route: Route, ui_tx: &mpsc::Sender<UiUpdate>) {
    let Some(user) = state.user.clone() else {
        return;
    };
    match route {
        Route::Dashboard => {
            refresh_dashboard(state, ui_tx).await;
        }
        Route::Jobs => {
            refresh_jobs(state, default_jobs_tab(&user), ui_tx).await;
            if permits(&user, Capability::ViewMyBids) {
                refresh_my_bids(state, ui_tx).await;
            }
        }
        Route::Bids => match default_bids_tab(&user) {
            BidsTab::Received => {
                refresh_jobs(state, JobsTab::Mine, ui_tx).await;
                if let Some(job_id) = state.received_bids.as_ref().map(|(id, _)| id.clone()) {
                    refresh_job_bids(state, &job_id, ui_tx).await;
                }
            }
            BidsTab::Mine => refresh_my_bids(state, ui_tx).await,
        },
        Route::Chat => refresh_chats(state, ui_tx).await,
        Route::Landing | Route::Auth | Route::About | Route::Settings | Route::Subscription => {}
    }
}

// ---------------------------------------------------------------------------
// Refetchers
// ---------------------------------------------------------------------------

async fn refresh_dashboard(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.api.dashboard_stats().await {
        Ok(stats) => {
            let _ = ui_tx.send(UiUpdate::Dashboard(stats)).await;
        }
        Err(e) => fail(state, "load dashboard", e, ui_tx).await,
    }
    if state.can(Capability::Administer) {
        for table in AdminTable::ALL {
            refresh_admin(state, table, ui_tx).await;
        }
    }
}

async fn refresh_jobs(state: &mut AppState, tab: JobsTab, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = match tab {
        JobsTab::Browse => state.api.open_jobs().await,
        JobsTab::Mine => state.api.my_jobs().await,
    };
    match result {
        Ok(jobs) => {
            debug!(?tab, count = jobs.len(), "jobs loaded");
            match tab {
                JobsTab::Browse => state.open_jobs = jobs.clone(),
                JobsTab::Mine => state.my_jobs = jobs.clone(),
            }
            let _ = ui_tx.send(UiUpdate::Jobs { tab, jobs }).await;
        }
        Err(e) => fail(state, "load jobs", e, ui_tx).await,
    }
}

async fn refresh_job_bids(state: &mut AppState, job_id: &str, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.api.job_bids(job_id).await {
        Ok(bids) => {
            state.received_bids = Some((job_id.to_string(), bids.clone()));
            let _ = ui_tx
                .send(UiUpdate::Bids {
                    view: BidsView::Received {
                        job_id: job_id.to_string(),
                    },
                    bids,
                })
                .await;
        }
        Err(e) => fail(state, "load bids", e, ui_tx).await,
    }
}

async fn refresh_my_bids(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.api.my_bids().await {
        Ok(bids) => {
            state.my_bids = bids.clone();
            let _ = ui_tx
                .send(UiUpdate::Bids {
                    view: BidsView::Mine,
                    bids,
                })
                .await;
        }
        Err(e) => fail(state, "load bids", e, ui_tx).await,
    }
}

async fn refresh_chats(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.api.chats().await {
        Ok(chats) => {
            state.chats = chats.clone();
            let _ = ui_tx.send(UiUpdate::Chats(chats)).await;
        }
        Err(e) => fail(state, "load conversations", e, ui_tx).await,
    }
}

async fn refresh_messages(state: &mut AppState, job_id: &str, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.api.messages(job_id).await {
        Ok(messages) => store_messages(state, job_id, messages, ui_tx).await,
        Err(e) => fail(state, "load messages", e, ui_tx).await,
    }
}

/// Replace the open conversation's messages (last fetch wins).
async fn store_messages(
    state: &mut AppState,
    job_id: &str,
    messages: Vec<Message>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if let Err(e) = state.db.cache_messages(job_id, &messages) {
        warn!("Failed to cache messages: {e:#}");
    }
    if state.poller.open_job() != Some(job_id) {
        return;
    }
    state.messages = messages.clone();
    let _ = ui_tx
        .send(UiUpdate::Messages {
            job_id: job_id.to_string(),
            messages,
        })
        .await;
}

async fn refresh_admin(state: &mut AppState, table: AdminTable, ui_tx: &mpsc::Sender<UiUpdate>) {
    let action = format!("load {table}");
    match table {
        AdminTable::Users => match state.api.admin_users().await {
            Ok(users) => {
                state.admin_users = users.clone();
                let _ = ui_tx.send(UiUpdate::AdminUsers(users)).await;
            }
            Err(e) => fail(state, &action, e, ui_tx).await,
        },
        AdminTable::Jobs => match state.api.admin_jobs().await {
            Ok(jobs) => {
                state.admin_jobs = jobs.clone();
                let _ = ui_tx.send(UiUpdate::AdminJobs(jobs)).await;
            }
            Err(e) => fail(state, &action, e, ui_tx).await,
        },
        AdminTable::Bids => match state.api.admin_bids().await {
            Ok(bids) => {
                state.admin_bids = bids.clone();
                let _ = ui_tx.send(UiUpdate::AdminBids(bids)).await;
            }
            Err(e) => fail(state, &action, e, ui_tx).await,
        },
    }
}

// ---------------------------------------------------------------------------
// User command handling
// ---------------------------------------------------------------------------

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Navigate(route) => navigate(state, route, ui_tx).await,

        // --- Session ---
        UserCommand::Login { email, password } => match state.api.login(&email, &password).await {
            Ok(auth) => {
                accepted(ui_tx, FormKind::Login).await;
                session::start(state, auth, ui_tx).await;
            }
            Err(e) => fail(state, "sign in", e, ui_tx).await,
        },
        UserCommand::Register(req) => match state.api.register(&req).await {
            Ok(auth) => {
                accepted(ui_tx, FormKind::Register).await;
                session::start(state, auth, ui_tx).await;
            }
            Err(e) => fail(state, "register", e, ui_tx).await,
        },
        UserCommand::Logout => session::end(state, ui_tx).await,
        UserCommand::ForgotPassword { email } => match state.api.forgot_password(&email).await {
            Ok(message) => {
                accepted(ui_tx, FormKind::ForgotPassword).await;
                banner(ui_tx, Banner::success(message)).await;
            }
            Err(e) => fail(state, "request password reset", e, ui_tx).await,
        },
        UserCommand::ResetPassword(req) => match state.api.reset_password(&req).await {
            Ok(message) => {
                accepted(ui_tx, FormKind::ResetPassword).await;
                banner(ui_tx, Banner::success(message)).await;
            }
            Err(e) => fail(state, "reset password", e, ui_tx).await,
        },
        UserCommand::UpdateProfile(update) => match state.api.update_profile(&update).await {
            Ok(user) => {
                accepted(ui_tx, FormKind::Profile).await;
                session::update_user(state, user, ui_tx).await;
                banner(ui_tx, Banner::success("Profile updated successfully")).await;
            }
            Err(e) => fail(state, "update profile", e, ui_tx).await,
        },
        UserCommand::ChangePassword { current, new } => {
            let req = ChangePassword {
                current_password: current,
                new_password: new,
            };
            match state.api.change_password(&req).await {
                Ok(message) => {
                    accepted(ui_tx, FormKind::ChangePassword).await;
                    banner(ui_tx, Banner::success(message)).await;
                }
                Err(e) => fail(state, "change password", e, ui_tx).await,
            }
        }

        // --- Listings ---
        UserCommand::RefreshDashboard => refresh_dashboard(state, ui_tx).await,
        UserCommand::LoadJobs(tab) => {
            if tab == JobsTab::Mine && !state.can(Capability::ViewMyJobs) {
                banner(ui_tx, Banner::error("Only buyers have posted jobs")).await;
                return;
            }
            refresh_jobs(state, tab, ui_tx).await;
        }
        UserCommand::LoadBids(tab) => match tab {
            BidsTab::Received => refresh_jobs(state, JobsTab::Mine, ui_tx).await,
            BidsTab::Mine => refresh_my_bids(state, ui_tx).await,
        },
        UserCommand::ViewJobBids { job_id } => {
            let allowed = match (state.user.as_ref(), state.find_job(&job_id)) {
                (Some(user), Some(job)) => can_view_job_bids(user, job),
                (Some(user), None) => permits(user, Capability::ViewJobBids),
                (None, _) => false,
            };
            if !allowed {
                banner(
                    ui_tx,
                    Banner::error("Only the job owner can view bids on this job"),
                )
                .await;
                return;
            }
            refresh_job_bids(state, &job_id, ui_tx).await;
        }

        // --- Mutations ---
        UserCommand::CreateJob { job, attachments } => {
            create_job(state, job, attachments, ui_tx).await
        }
        UserCommand::SubmitBid {
            job_id,
            bid,
            attachments,
        } => submit_bid(state, &job_id, BidForm::Direct(bid), attachments, ui_tx).await,
        UserCommand::SubmitSalesmanBid {
            job_id,
            bid,
            attachments,
        } => submit_bid(state, &job_id, BidForm::Salesman(bid), attachments, ui_tx).await,
        UserCommand::AwardBid { job_id, bid_id } => award_bid(state, &job_id, &bid_id, ui_tx).await,

        // --- Chat ---
        UserCommand::LoadChats => refresh_chats(state, ui_tx).await,
        UserCommand::OpenChat { job_id } => open_chat(state, &job_id, ui_tx).await,
        UserCommand::ChatAboutJob { job_id } => {
            navigate(state, Route::Chat, ui_tx).await;
            if state.route == Route::Chat {
                open_chat(state, &job_id, ui_tx).await;
            }
        }
        UserCommand::CloseChat => {
            state.poller.close_chat();
            state.messages.clear();
        }
        UserCommand::SendMessage {
            job_id,
            text,
            attachments,
        } => send_message(state, &job_id, &text, &attachments, ui_tx).await,
        UserCommand::DeleteMessage { job_id, message_id } => {
            delete_message(state, &job_id, &message_id, ui_tx).await
        }
        UserCommand::DownloadAttachment { file } => download(state, &file, ui_tx).await,

        // --- Notifications ---
        UserCommand::LoadNotifications => match state.api.notifications().await {
            Ok(list) => {
                let unread = list.iter().filter(|n| !n.is_read).count() as u32;
                state.unread_notifications = unread;
                let _ = ui_tx.send(UiUpdate::Notifications(list)).await;
                let _ = ui_tx.send(UiUpdate::UnreadNotifications(unread)).await;
            }
            Err(e) => fail(state, "load notifications", e, ui_tx).await,
        },

        // --- Subscription ---
        UserCommand::CreateSubscriptionOrder => {
            if !state.can(Capability::Subscribe) {
                banner(ui_tx, Banner::error("Only buyers can subscribe")).await;
                return;
            }
            match state.api.create_subscription_order().await {
                Ok(order) => {
                    info!(order_id = %order.id, amount = order.amount, "subscription order created");
                    let _ = ui_tx.send(UiUpdate::SubscriptionOrder(order)).await;
                }
                Err(e) => fail(state, "create subscription order", e, ui_tx).await,
            }
        }
        UserCommand::VerifySubscription(confirmation) => {
            verify_subscription(state, &confirmation, ui_tx).await
        }

        // --- Admin ---
        UserCommand::AdminLoad(table) => {
            if admin_only(state, ui_tx).await {
                refresh_admin(state, table, ui_tx).await;
            }
        }
        UserCommand::AdminDelete { table, id } => {
            if admin_only(state, ui_tx).await {
                admin_delete(state, table, &id, ui_tx).await;
            }
        }
        UserCommand::AdminUserDetails { user_id } => {
            if !admin_only(state, ui_tx).await {
                return;
            }
            match state.api.admin_user_details(&user_id).await {
                Ok(details) => {
                    let _ = ui_tx
                        .send(UiUpdate::AdminUserDetails(Box::new(details)))
                        .await;
                }
                Err(e) => fail(state, "load user details", e, ui_tx).await,
            }
        }
        UserCommand::AdminChatAnalytics => {
            if !admin_only(state, ui_tx).await {
                return;
            }
            match state.api.chat_analytics().await {
                Ok(analytics) => {
                    let _ = ui_tx.send(UiUpdate::ChatAnalytics(analytics)).await;
                }
                Err(e) => fail(state, "load chat analytics", e, ui_tx).await,
            }
        }
        UserCommand::AdminExport(table) => {
            if admin_only(state, ui_tx).await {
                admin_export(state, table, ui_tx).await;
            }
        }

        UserCommand::Quit => {
            // Handled in the main loop; unreachable here.
        }
    }
}

async fn admin_only(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> bool {
    if state.can(Capability::Administer) {
        return true;
    }
    banner(ui_tx, Banner::error("Admin access required")).await;
    false
}

// ---------------------------------------------------------------------------
// Jobs and bids
// ---------------------------------------------------------------------------

async fn create_job(
    state: &mut AppState,
    job: NewJob,
    attachments: Vec<PathBuf>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if !state.can(Capability::PostJob) {
        banner(ui_tx, Banner::error("Only buyers can post jobs")).await;
        return;
    }
    let created = match state.api.create_job(&job).await {
        Ok(created) => created,
        Err(e) => {
            fail(state, "create job", e, ui_tx).await;
            return;
        }
    };
    info!(job_id = %created.id, title = %created.title, "job created");
    accepted(ui_tx, FormKind::NewJob).await;

    let outcome = upload_after_create(state, UploadTarget::Job, &created.id, &attachments).await;
    banner(ui_tx, outcome.unwrap_or_else(|| Banner::success("Job posted successfully"))).await;
    refresh_jobs(state, JobsTab::Mine, ui_tx).await;
}

enum BidForm {
    Direct(NewBid),
    Salesman(SalesmanBid),
}

async fn submit_bid(
    state: &mut AppState,
    job_id: &str,
    form: BidForm,
    attachments: Vec<PathBuf>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let Some(user) = state.user.clone() else {
        return;
    };
    let (capability, kind) = match form {
        BidForm::Direct(_) => (Capability::SubmitBid, FormKind::Bid),
        BidForm::Salesman(_) => (Capability::SubmitSalesmanBid, FormKind::SalesmanBid),
    };
    if !permits(&user, capability) {
        banner(ui_tx, Banner::error("Your role cannot bid on jobs")).await;
        return;
    }
    // Salesmen may bid more than once per job, for different companies.
    if let Some(job) = state.find_job(job_id) {
        let known: &[Bid] = match form {
            BidForm::Direct(_) => &state.my_bids,
            BidForm::Salesman(_) => &[],
        };
        if let Err(e) = lifecycle::check_can_bid(job, &user.id, known) {
            banner(ui_tx, Banner::error(format!("Failed to submit bid: {e}"))).await;
            return;
        }
    }

    let result = match &form {
        BidForm::Direct(bid) => state.api.submit_bid(job_id, bid).await,
        BidForm::Salesman(bid) => state.api.submit_salesman_bid(job_id, bid).await,
    };
    let created = match result {
        Ok(created) => created,
        Err(e) => {
            fail(state, "submit bid", e, ui_tx).await;
            return;
        }
    };
    info!(%job_id, bid_id = %created.id, "bid submitted");
    accepted(ui_tx, kind).await;

    let outcome = upload_after_create(state, UploadTarget::Bid, &created.id, &attachments).await;
    banner(ui_tx, outcome.unwrap_or_else(|| Banner::success("Bid submitted successfully"))).await;
    refresh_my_bids(state, ui_tx).await;
}

/// Upload attachments for a record that was just created. A failure here
/// does not undo the creation; it turns into a warning banner.
async fn upload_after_create(
    state: &AppState,
    target: UploadTarget,
    id: &str,
    attachments: &[PathBuf],
) -> Option<Banner> {
    if attachments.is_empty() {
        return None;
    }
    match state.api.upload_files(target, id, attachments).await {
        Ok(files) => {
            debug!(%target, %id, count = files.len(), "attachments uploaded");
            None
        }
        Err(e) => {
            warn!(%target, %id, error = %e, "attachment upload failed");
            Some(Banner::warning(partial_upload_warning(target)))
        }
    }
}

async fn award_bid(state: &mut AppState, job_id: &str, bid_id: &str, ui_tx: &mpsc::Sender<UiUpdate>) {
    if !state.can(Capability::AwardBid) {
        banner(ui_tx, Banner::error("Only buyers can award bids")).await;
        return;
    }

    // Optimistic: award locally when both the job and its bids are cached.
    let applied = match (
        state.my_jobs.iter_mut().find(|j| j.id == job_id),
        state.received_bids.as_mut(),
    ) {
        (Some(job), Some((bids_job, bids))) if bids_job.as_str() == job_id => {
            Some(lifecycle::apply_award(job, bids, bid_id))
        }
        _ => None,
    };
    match applied {
        Some(Err(e)) => {
            banner(ui_tx, Banner::error(format!("Failed to award bid: {e}"))).await;
            return;
        }
        Some(Ok(())) => {
            if let Some((_, bids)) = &state.received_bids {
                let _ = ui_tx
                    .send(UiUpdate::Bids {
                        view: BidsView::Received {
                            job_id: job_id.to_string(),
                        },
                        bids: bids.clone(),
                    })
                    .await;
            }
            let _ = ui_tx
                .send(UiUpdate::Jobs {
                    tab: JobsTab::Mine,
                    jobs: state.my_jobs.clone(),
                })
                .await;
        }
        None => {}
    }

    match state.api.award_bid(job_id, bid_id).await {
        Ok(message) => {
            info!(%job_id, %bid_id, "bid awarded");
            banner(ui_tx, Banner::success(message)).await;
        }
        Err(e) => fail(state, "award bid", e, ui_tx).await,
    }
    refresh_job_bids(state, job_id, ui_tx).await;
    refresh_jobs(state, JobsTab::Mine, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

async fn open_chat(state: &mut AppState, job_id: &str, ui_tx: &mpsc::Sender<UiUpdate>) {
    let cached = state.db.cached_messages(job_id).unwrap_or_else(|e| {
        warn!("Failed to read message cache: {e:#}");
        Vec::new()
    });
    let generation = state.poller.open_chat(job_id);
    debug!(%job_id, generation, cached = cached.len(), "conversation opened");
    state.messages = cached.clone();
    let _ = ui_tx
        .send(UiUpdate::Messages {
            job_id: job_id.to_string(),
            messages: cached,
        })
        .await;

    if let Some(chat) = state.chats.iter_mut().find(|c| c.job_id == job_id) {
        if chat.unread_count > 0 {
            chat.unread_count = 0;
            let _ = ui_tx.send(UiUpdate::Chats(state.chats.clone())).await;
        }
    }
    if let Err(e) = state.api.mark_chat_read(job_id).await {
        // The counter is only advisory; a failed mark-read is not shown.
        warn!(%job_id, error = %e, "mark-read failed");
        if e.is_unauthorized() {
            state.session_expired = true;
        }
    }
}

async fn send_message(
    state: &mut AppState,
    job_id: &str,
    text: &str,
    attachments: &[PathBuf],
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let result = if attachments.is_empty() {
        state.api.send_message(job_id, text).await.map(|_| ())
    } else {
        state
            .api
            .send_message_with_files(job_id, text, attachments)
            .await
            .map(|resp| debug!(files = resp.files_uploaded, "message sent with files"))
    };
    match result {
        Ok(()) => {
            accepted(ui_tx, FormKind::Message).await;
            refresh_messages(state, job_id, ui_tx).await;
            refresh_chats(state, ui_tx).await;
        }
        Err(e) => fail(state, "send message", e, ui_tx).await,
    }
}

async fn delete_message(
    state: &mut AppState,
    job_id: &str,
    message_id: &str,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if state.poller.open_job() == Some(job_id) {
        state.messages.retain(|m| m.id != message_id);
        let _ = ui_tx
            .send(UiUpdate::Messages {
                job_id: job_id.to_string(),
                messages: state.messages.clone(),
            })
            .await;
    }
    match state.api.delete_message(message_id).await {
        Ok(()) => {
            info!(%message_id, "message deleted");
            if let Err(e) = state.db.cache_messages(job_id, &state.messages) {
                warn!("Failed to cache messages: {e:#}");
            }
        }
        Err(e) => {
            fail(state, "delete message", e, ui_tx).await;
            refresh_messages(state, job_id, ui_tx).await;
        }
    }
}

/// `<download_dir>/<filename>`, keeping only the final path component of
/// the server-supplied name.
fn download_path(dir: &Path, file: &FileAttachment) -> PathBuf {
    let name = Path::new(&file.filename)
        .file_name()
        .map(|n| n.to_os_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| file.id.clone().into());
    dir.join(name)
}

async fn download(state: &mut AppState, file: &FileAttachment, ui_tx: &mpsc::Sender<UiUpdate>) {
    let dest = download_path(&state.config.download_dir(), file);
    match state.api.download_file(UploadTarget::Chat, &file.id, &dest).await {
        Ok(bytes) => {
            info!(file_id = %file.id, bytes, "attachment saved");
            banner(
                ui_tx,
                Banner::success(format!("Saved {} to {}", file.filename, dest.display())),
            )
            .await;
        }
        Err(e) => fail(state, "download file", e, ui_tx).await,
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

async fn verify_subscription(
    state: &mut AppState,
    confirmation: &PaymentConfirmation,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let activated = match state.api.verify_subscription(confirmation).await {
        Ok(activated) => activated,
        Err(e) => {
            fail(state, "verify payment", e, ui_tx).await;
            return;
        }
    };
    info!(order_id = %confirmation.order_id, "subscription activated");
    accepted(ui_tx, FormKind::PaymentConfirmation).await;

    match state.api.profile().await {
        Ok(user) => session::update_user(state, user, ui_tx).await,
        Err(e) => fail(state, "refresh profile", e, ui_tx).await,
    }
    let text = if activated.message.is_empty() {
        "Subscription activated".to_string()
    } else {
        activated.message
    };
    banner(ui_tx, Banner::success(text)).await;
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

async fn admin_delete(
    state: &mut AppState,
    table: AdminTable,
    id: &str,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match table {
        AdminTable::Users => {
            state.admin_users.retain(|u| u.id != id);
            let _ = ui_tx.send(UiUpdate::AdminUsers(state.admin_users.clone())).await;
        }
        AdminTable::Jobs => {
            state.admin_jobs.retain(|j| j.id != id);
            let _ = ui_tx.send(UiUpdate::AdminJobs(state.admin_jobs.clone())).await;
        }
        AdminTable::Bids => {
            state.admin_bids.retain(|b| b.id != id);
            let _ = ui_tx.send(UiUpdate::AdminBids(state.admin_bids.clone())).await;
        }
    }
    match state.api.admin_delete(table, id).await {
        Ok(()) => {
            info!(%table, %id, "admin delete");
            banner(ui_tx, Banner::success(format!("Deleted {id} from {table}"))).await;
        }
        Err(e) => {
            fail(state, &format!("delete from {table}"), e, ui_tx).await;
            refresh_admin(state, table, ui_tx).await;
        }
    }
}

async fn admin_export(state: &mut AppState, table: AdminTable, ui_tx: &mpsc::Sender<UiUpdate>) {
    let path = export::export_path(&state.config.download_dir(), table, chrono::Utc::now());
    let (rows, result) = match table {
        AdminTable::Users => (
            state.admin_users.len(),
            export::export_to_file(&path, |f| export::write_users(f, &state.admin_users)),
        ),
        AdminTable::Jobs => (
            state.admin_jobs.len(),
            export::export_to_file(&path, |f| export::write_jobs(f, &state.admin_jobs)),
        ),
        AdminTable::Bids => (
            state.admin_bids.len(),
            export::export_to_file(&path, |f| export::write_bids(f, &state.admin_bids)),
        ),
    };
    match result {
        Ok(written) => {
            banner(
                ui_tx,
                Banner::success(format!("Exported {rows} {table} to {}", written.display())),
            )
            .await
        }
        Err(e) => {
            warn!(%table, error = %e, "export failed");
            banner(ui_tx, Banner::error(format!("Failed to export {table}: {e}"))).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Poll events
// ---------------------------------------------------------------------------

async fn handle_poll_event(state: &mut AppState, event: PollEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    match event {
        PollEvent::Messages {
            job_id,
            generation,
            messages,
        } => {
            if !state.poller.is_current(&job_id, generation) {
                debug!(%job_id, generation, "discarding stale chat poll");
                return;
            }
            store_messages(state, &job_id, messages, ui_tx).await;
        }
        PollEvent::UnreadCount(count) => {
            if state.unread_notifications != count {
                debug!(count, "unread notifications changed");
            }
            state.unread_notifications = count;
            let _ = ui_tx.send(UiUpdate::UnreadNotifications(count)).await;
        }
        PollEvent::Failed {
            kind,
            message,
            unauthorized,
        } => {
            if unauthorized && state.user.is_some() {
                state.session_expired = true;
                return;
            }
            match kind {
                PollKind::Chat => debug!(%message, "chat poll failed; next tick retries"),
                PollKind::Notifications => {
                    debug!(%message, "notification poll failed; next tick retries")
                }
            }
        }
    }
}
