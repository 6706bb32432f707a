// Terminal front end: view state, rendering and the input loop.
//
// The front end owns a `ViewState` that mirrors what the orchestrator has
// fetched. The orchestrator pushes `UiUpdate` messages over an mpsc channel;
// the front end applies them to `ViewState` and re-renders at ~30 fps.

pub mod form;
pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use buildbidz_app::protocol::{Banner, BannerKind, BidsView, UiUpdate, UserCommand};
use buildbidz_core::access::{self, BidsTab, DashboardKind, JobsTab, Route};
use buildbidz_core::api::AdminTable;
use buildbidz_core::config::UploadsConfig;
use buildbidz_core::model::job::filter_jobs;
use buildbidz_core::model::{
    Bid, ChatAnalytics, ChatSummary, DashboardStats, Job, JobCategory, Message, Notification,
    SubscriptionOrder, User, UserDetails,
};

use form::FormState;
use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// A delete waiting for y/n.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    /// Shown in the dialog, e.g. "user u-7".
    pub what: String,
    pub command: UserCommand,
}

/// Front-end state that mirrors the orchestrator's for rendering, plus
/// purely local state: selection, tabs, filters and the open form.
pub struct ViewState {
    pub user: Option<User>,
    pub route: Route,
    pub banner: Option<Banner>,
    pub loading: bool,

    pub dashboard: Option<DashboardStats>,

    pub jobs_tab: JobsTab,
    pub open_jobs: Vec<Job>,
    pub my_jobs: Vec<Job>,
    pub filter_text: String,
    pub filter_mode: bool,
    pub category_filter: Option<JobCategory>,

    pub bids_tab: BidsTab,
    /// Bids on one of the buyer's jobs, keyed by job id.
    pub received_bids: Option<(String, Vec<Bid>)>,
    pub my_bids: Vec<Bid>,

    pub chats: Vec<ChatSummary>,
    /// Job whose conversation is shown.
    pub open_chat: Option<String>,
    pub messages: Vec<Message>,
    pub message_selected: usize,
    /// Attachment of the highlighted message that `d` downloads.
    pub attachment_selected: usize,

    pub unread_notifications: u32,
    pub notifications: Vec<Notification>,
    pub show_notifications: bool,

    pub subscription_order: Option<SubscriptionOrder>,

    pub admin_table: AdminTable,
    pub admin_users: Vec<User>,
    pub admin_jobs: Vec<Job>,
    pub admin_bids: Vec<Bid>,
    pub user_details: Option<Box<UserDetails>>,
    pub chat_analytics: Option<ChatAnalytics>,

    /// Highlighted row of the active list.
    pub selected: usize,
    pub form: Option<FormState>,
    pub confirm_quit: bool,
    pub confirm_delete: Option<PendingDelete>,
    pub max_upload_bytes: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(UploadsConfig::default().max_file_size_bytes())
    }
}

impl ViewState {
    pub fn new(max_upload_bytes: u64) -> Self {
        ViewState {
            user: None,
            route: Route::Landing,
            banner: None,
            loading: false,
            dashboard: None,
            jobs_tab: JobsTab::Browse,
            open_jobs: Vec::new(),
            my_jobs: Vec::new(),
            filter_text: String::new(),
            filter_mode: false,
            category_filter: None,
            bids_tab: BidsTab::Mine,
            received_bids: None,
            my_bids: Vec::new(),
            chats: Vec::new(),
            open_chat: None,
            messages: Vec::new(),
            message_selected: 0,
            attachment_selected: 0,
            unread_notifications: 0,
            notifications: Vec::new(),
            show_notifications: false,
            subscription_order: None,
            admin_table: AdminTable::Users,
            admin_users: Vec::new(),
            admin_jobs: Vec::new(),
            admin_bids: Vec::new(),
            user_details: None,
            chat_analytics: None,
            selected: 0,
            form: None,
            confirm_quit: false,
            confirm_delete: None,
            max_upload_bytes,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| access::dashboard_kind(u) == DashboardKind::Admin)
    }

    /// Jobs on the active Jobs tab after search and category filtering.
    pub fn visible_jobs(&self) -> Vec<&Job> {
        let source = match self.jobs_tab {
            JobsTab::Browse => &self.open_jobs,
            JobsTab::Mine => &self.my_jobs,
        };
        filter_jobs(source, &self.filter_text, self.category_filter)
    }

    /// Bids tab on Received with no job chosen yet: the list shows the
    /// buyer's jobs to pick from.
    pub fn picking_job_for_bids(&self) -> bool {
        self.bids_tab == BidsTab::Received && self.received_bids.is_none()
    }

    pub fn visible_bids(&self) -> &[Bid] {
        match self.bids_tab {
            BidsTab::Received => self
                .received_bids
                .as_ref()
                .map(|(_, bids)| bids.as_slice())
                .unwrap_or_default(),
            BidsTab::Mine => &self.my_bids,
        }
    }

    pub fn admin_len(&self) -> usize {
        match self.admin_table {
            AdminTable::Users => self.admin_users.len(),
            AdminTable::Jobs => self.admin_jobs.len(),
            AdminTable::Bids => self.admin_bids.len(),
        }
    }

    /// Rows in the list that `selected` indexes.
    pub fn list_len(&self) -> usize {
        match self.route {
            Route::Dashboard if self.is_admin() => self.admin_len(),
            Route::Jobs => self.visible_jobs().len(),
            Route::Bids if self.picking_job_for_bids() => self.my_jobs.len(),
            Route::Bids => self.visible_bids().len(),
            Route::Chat => self.chats.len(),
            _ => 0,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.list_len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.list_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn selected_job(&self) -> Option<&Job> {
        match self.route {
            Route::Jobs => self.visible_jobs().get(self.selected).copied(),
            Route::Bids if self.picking_job_for_bids() => self.my_jobs.get(self.selected),
            _ => None,
        }
    }

    pub fn selected_bid(&self) -> Option<&Bid> {
        self.visible_bids().get(self.selected)
    }

    pub fn selected_chat(&self) -> Option<&ChatSummary> {
        self.chats.get(self.selected)
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.messages.get(self.message_selected)
    }

    /// The job whose bids are listed, looked up in the buyer's jobs.
    pub fn received_job(&self) -> Option<&Job> {
        let (job_id, _) = self.received_bids.as_ref()?;
        self.my_jobs
            .iter()
            .chain(self.open_jobs.iter())
            .find(|j| &j.id == job_id)
    }

    /// Id of the highlighted admin row.
    pub fn selected_admin_id(&self) -> Option<&str> {
        match self.admin_table {
            AdminTable::Users => self.admin_users.get(self.selected).map(|u| u.id.as_str()),
            AdminTable::Jobs => self.admin_jobs.get(self.selected).map(|j| j.id.as_str()),
            AdminTable::Bids => self.admin_bids.get(self.selected).map(|b| b.id.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Session(Some(user)) => {
            let switched = state.user.as_ref().map(|u| &u.id) != Some(&user.id);
            if switched {
                state.jobs_tab = access::default_jobs_tab(&user);
                state.bids_tab = access::default_bids_tab(&user);
            }
            state.user = Some(user);
        }
        UiUpdate::Session(None) => {
            let fresh = ViewState::new(state.max_upload_bytes);
            let route = state.route;
            let banner = state.banner.take();
            *state = ViewState {
                route,
                banner,
                ..fresh
            };
        }
        UiUpdate::Route(route) => {
            if route != state.route {
                state.selected = 0;
                state.filter_mode = false;
                state.user_details = None;
            }
            if route != Route::Chat {
                state.open_chat = None;
                state.messages.clear();
            }
            state.route = route;
        }
        UiUpdate::Banner(banner) => {
            if let Some(form) = state.form.as_mut() {
                if matches!(banner.kind, BannerKind::Error | BannerKind::Warning) {
                    form.submitting = false;
                }
                if banner.kind == BannerKind::Error {
                    form.error = Some(banner.text.clone());
                }
            }
            state.banner = Some(banner);
        }
        UiUpdate::ClearBanner => state.banner = None,
        UiUpdate::FormAccepted(kind) => {
            if state.form.as_ref().is_some_and(|f| f.kind == kind) {
                state.form = None;
            }
        }
        UiUpdate::Loading(loading) => state.loading = loading,

        UiUpdate::Dashboard(stats) => state.dashboard = Some(stats),
        UiUpdate::Jobs { tab, jobs } => {
            match tab {
                JobsTab::Browse => state.open_jobs = jobs,
                JobsTab::Mine => state.my_jobs = jobs,
            }
            state.clamp_selection();
        }
        UiUpdate::Bids { view, bids } => {
            match view {
                BidsView::Received { job_id } => state.received_bids = Some((job_id, bids)),
                BidsView::Mine => state.my_bids = bids,
            }
            state.clamp_selection();
        }

        UiUpdate::Chats(chats) => {
            state.chats = chats;
            state.clamp_selection();
        }
        UiUpdate::Messages { job_id, messages } => {
            if state.open_chat.as_deref() == Some(job_id.as_str()) {
                let grew = messages.len() > state.messages.len();
                state.messages = messages;
                if grew || state.message_selected >= state.messages.len() {
                    state.message_selected = state.messages.len().saturating_sub(1);
                }
            }
        }

        UiUpdate::UnreadNotifications(count) => state.unread_notifications = count,
        UiUpdate::Notifications(list) => state.notifications = list,

        UiUpdate::SubscriptionOrder(order) => state.subscription_order = Some(order),

        UiUpdate::AdminUsers(users) => {
            state.admin_users = users;
            state.clamp_selection();
        }
        UiUpdate::AdminJobs(jobs) => {
            state.admin_jobs = jobs;
            state.clamp_selection();
        }
        UiUpdate::AdminBids(bids) => {
            state.admin_bids = bids;
            state.clamp_selection();
        }
        UiUpdate::AdminUserDetails(details) => state.user_details = Some(details),
        UiUpdate::ChatAnalytics(analytics) => state.chat_analytics = Some(analytics),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::nav::render(frame, layout.nav, state);
    widgets::banner::render(frame, layout.banner, state);

    match state.route {
        Route::Landing | Route::Auth => widgets::landing::render(frame, layout.main, state),
        Route::About => widgets::landing::render_about(frame, layout.main),
        Route::Dashboard if state.is_admin() => widgets::admin::render(frame, layout.main, state),
        Route::Dashboard => widgets::dashboard::render(frame, layout.main, state),
        Route::Jobs => widgets::jobs::render(frame, layout.main, state),
        Route::Bids => widgets::bids::render(frame, layout.main, state),
        Route::Chat => widgets::chat::render(frame, layout.main, state),
        Route::Settings => widgets::settings::render(frame, layout.main, state),
        Route::Subscription => widgets::subscription::render(frame, layout.main, state),
    }

    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.show_notifications {
        widgets::notifications::render(frame, layout.main, state);
    }
    if let Some(form) = &state.form {
        widgets::form_modal::render(frame, frame.area(), form);
    }
    if let Some(pending) = &state.confirm_delete {
        widgets::confirm::render_delete(frame, frame.area(), &pending.what);
    }
    if state.confirm_quit {
        widgets::confirm::render_quit(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Run the terminal front end until the user quits or the orchestrator
/// closes the update channel.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    max_upload_bytes: u64,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the default panic output
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(max_upload_bytes);
    let mut event_stream = EventStream::new();

    // 3. Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 4. Main loop
    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Orchestrator has stopped.
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("Terminal input error: {e}");
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 5. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use buildbidz_app::protocol::FormKind;
    use buildbidz_core::model::{JobStatus, Role};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn view_state_default_is_signed_out_landing() {
        let state = ViewState::default();
        assert!(state.user.is_none());
        assert_eq!(state.route, Route::Landing);
        assert!(state.form.is_none());
        assert!(!state.confirm_quit);
        assert_eq!(state.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn session_sets_role_default_tabs() {
        let buyer = signed_in(Role::Buyer, Route::Dashboard);
        assert_eq!(buyer.jobs_tab, JobsTab::Mine);
        assert_eq!(buyer.bids_tab, BidsTab::Received);

        let supplier = signed_in(Role::Supplier, Route::Dashboard);
        assert_eq!(supplier.jobs_tab, JobsTab::Browse);
        assert_eq!(supplier.bids_tab, BidsTab::Mine);
    }

    #[test]
    fn session_end_drops_user_data() {
        let mut state = signed_in(Role::Buyer, Route::Jobs);
        apply_ui_update(
            &mut state,
            UiUpdate::Jobs {
                tab: JobsTab::Mine,
                jobs: vec![job("j-1", "u-1", JobStatus::Open)],
            },
        );
        apply_ui_update(&mut state, UiUpdate::UnreadNotifications(3));
        apply_ui_update(&mut state, UiUpdate::Session(None));
        assert!(state.user.is_none());
        assert!(state.my_jobs.is_empty());
        assert_eq!(state.unread_notifications, 0);
    }

    #[test]
    fn route_change_resets_selection_and_closes_chat() {
        let mut state = signed_in(Role::Buyer, Route::Chat);
        state.selected = 2;
        state.open_chat = Some("j-1".into());
        apply_ui_update(&mut state, UiUpdate::Route(Route::Jobs));
        assert_eq!(state.selected, 0);
        assert!(state.open_chat.is_none());
    }

    #[test]
    fn messages_for_another_chat_are_ignored() {
        let mut state = signed_in(Role::Buyer, Route::Chat);
        state.open_chat = Some("j-1".into());
        apply_ui_update(
            &mut state,
            UiUpdate::Messages {
                job_id: "j-2".into(),
                messages: vec![serde_message("m-1", "j-2")],
            },
        );
        assert!(state.messages.is_empty());

        apply_ui_update(
            &mut state,
            UiUpdate::Messages {
                job_id: "j-1".into(),
                messages: vec![serde_message("m-1", "j-1"), serde_message("m-2", "j-1")],
            },
        );
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.message_selected, 1);
    }

    fn serde_message(id: &str, job_id: &str) -> Message {
        Message {
            id: id.to_string(),
            job_id: job_id.to_string(),
            sender_id: "u-2".to_string(),
            receiver_id: None,
            sender_name: Some("Sharma Traders".to_string()),
            message: "Dispatching tomorrow".to_string(),
            file_attachments: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn accepted_form_closes_and_failed_form_stays_open() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        let mut form = FormState::bid("j-1");
        form.submitting = true;
        state.form = Some(form);

        apply_ui_update(
            &mut state,
            UiUpdate::Banner(Banner::error("Failed to submit bid: Job not found or closed")),
        );
        let form = state.form.as_ref().unwrap();
        assert!(!form.submitting);
        assert_eq!(
            form.error.as_deref(),
            Some("Failed to submit bid: Job not found or closed")
        );

        apply_ui_update(&mut state, UiUpdate::FormAccepted(FormKind::Message));
        assert!(state.form.is_some());
        apply_ui_update(&mut state, UiUpdate::FormAccepted(FormKind::Bid));
        assert!(state.form.is_none());
    }

    #[test]
    fn shrinking_list_clamps_selection() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        apply_ui_update(
            &mut state,
            UiUpdate::Jobs {
                tab: JobsTab::Browse,
                jobs: (0..5)
                    .map(|i| job(&format!("j-{i}"), "b-1", JobStatus::Open))
                    .collect(),
            },
        );
        state.selected = 4;
        apply_ui_update(
            &mut state,
            UiUpdate::Jobs {
                tab: JobsTab::Browse,
                jobs: vec![job("j-0", "b-1", JobStatus::Open)],
            },
        );
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn filter_narrows_visible_jobs() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        let mut chennai = job("j-1", "b-1", JobStatus::Open);
        chennai.location = "Chennai".into();
        state.open_jobs = vec![chennai, job("j-2", "b-1", JobStatus::Open)];
        state.filter_text = "chennai".into();
        assert_eq!(state.visible_jobs().len(), 1);
        assert_eq!(state.selected_job().map(|j| j.id.as_str()), Some("j-1"));
    }

    #[test]
    fn every_route_renders_for_every_role() {
        let routes = [
            Route::Landing,
            Route::Auth,
            Route::About,
            Route::Dashboard,
            Route::Jobs,
            Route::Bids,
            Route::Chat,
            Route::Settings,
            Route::Subscription,
        ];
        for role in [Role::Buyer, Role::Supplier, Role::Admin, Role::Salesman] {
            for route in routes {
                let mut state = signed_in(role, route);
                state.show_notifications = true;
                state.form = Some(FormState::login());
                state.confirm_quit = true;
                state.confirm_delete = Some(PendingDelete {
                    what: "user u-7".into(),
                    command: UserCommand::Logout,
                });
                let backend = TestBackend::new(100, 30);
                let mut terminal = Terminal::new(backend).unwrap();
                terminal
                    .draw(|frame| render_frame(frame, &state))
                    .unwrap();
            }
        }
    }

    #[test]
    fn renders_on_a_tiny_terminal() {
        let state = signed_in(Role::Buyer, Route::Jobs);
        let backend = TestBackend::new(20, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }
}
