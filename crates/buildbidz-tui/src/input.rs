// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// orchestrator, or into local ViewState changes (selection, tabs, filters,
// form editing).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use buildbidz_app::protocol::{Banner, UserCommand};
use buildbidz_core::access::{self, BidsTab, Capability, JobsTab, Route};
use buildbidz_core::api::AdminTable;
use buildbidz_core::lifecycle;
use buildbidz_core::model::{BidStatus, JobCategory, User};

use crate::form::FormState;
use crate::{PendingDelete, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should reach the
/// orchestrator. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports Release as well as Press.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if state.confirm_quit {
        return handle_confirm_quit(key_event, state);
    }
    if state.confirm_delete.is_some() {
        return handle_confirm_delete(key_event, state);
    }
    if state.form.is_some() {
        return handle_form(key_event, state);
    }
    if state.filter_mode {
        return handle_filter_mode(key_event, state);
    }
    if state.show_notifications {
        return handle_notifications(key_event, state);
    }

    if key_event.code == KeyCode::Char('q') {
        state.confirm_quit = true;
        return None;
    }

    match state.user.clone() {
        None => handle_signed_out(key_event, state),
        Some(user) => handle_signed_in(key_event, state, &user),
    }
}

// ---------------------------------------------------------------------------
// Modal modes
// ---------------------------------------------------------------------------

fn handle_confirm_quit(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn handle_confirm_delete(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => state.confirm_delete.take().map(|p| p.command),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.confirm_delete = None;
            None
        }
        _ => None,
    }
}

/// Form editing. Enter validates and submits; the form stays open until the
/// orchestrator accepts it.
fn handle_form(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    let max_upload_bytes = state.max_upload_bytes;
    let form = state.form.as_mut()?;
    match key_event.code {
        KeyCode::Esc => {
            state.form = None;
            None
        }
        KeyCode::Tab | KeyCode::Down => {
            form.next_field();
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.prev_field();
            None
        }
        KeyCode::Backspace => {
            form.backspace();
            None
        }
        KeyCode::Enter => {
            if form.submitting {
                return None;
            }
            match form.submit(max_upload_bytes) {
                Ok(cmd) => {
                    form.error = None;
                    form.submitting = true;
                    Some(cmd)
                }
                Err(message) => {
                    form.error = Some(message);
                    None
                }
            }
        }
        KeyCode::Char(c) => {
            form.insert(c);
            None
        }
        _ => None,
    }
}

fn handle_filter_mode(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            state.filter_mode = false;
            state.filter_text.clear();
        }
        KeyCode::Enter => state.filter_mode = false,
        KeyCode::Backspace => {
            state.filter_text.pop();
        }
        KeyCode::Char(c) => state.filter_text.push(c),
        _ => {}
    }
    state.selected = 0;
    None
}

fn handle_notifications(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('n') => {
            state.show_notifications = false;
            None
        }
        KeyCode::Char('r') => Some(UserCommand::LoadNotifications),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Signed out
// ---------------------------------------------------------------------------

fn handle_signed_out(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('l') => {
            state.form = Some(FormState::login());
            (state.route != Route::Auth).then_some(UserCommand::Navigate(Route::Auth))
        }
        KeyCode::Char('r') => {
            state.form = Some(FormState::register());
            (state.route != Route::Auth).then_some(UserCommand::Navigate(Route::Auth))
        }
        KeyCode::Char('f') => {
            state.form = Some(FormState::forgot_password());
            None
        }
        KeyCode::Char('p') => {
            state.form = Some(FormState::reset_password());
            None
        }
        KeyCode::Char('a') => Some(UserCommand::Navigate(Route::About)),
        KeyCode::Char('h') | KeyCode::Esc => Some(UserCommand::Navigate(Route::Landing)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Signed in
// ---------------------------------------------------------------------------

fn handle_signed_in(key_event: KeyEvent, state: &mut ViewState, user: &User) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            return access::nav_routes(user)
                .get(index)
                .map(|route| UserCommand::Navigate(*route));
        }
        KeyCode::Char('a') => return Some(UserCommand::Navigate(Route::About)),
        KeyCode::Char('n') => {
            state.show_notifications = true;
            return Some(UserCommand::LoadNotifications);
        }
        KeyCode::Char('o') => return Some(UserCommand::Logout),
        KeyCode::Char('R') | KeyCode::F(5) => return refresh(state),
        KeyCode::Up | KeyCode::Char('k') if !chat_is_open(state) => {
            state.select_prev();
            return None;
        }
        KeyCode::Down | KeyCode::Char('j') if !chat_is_open(state) => {
            state.select_next();
            return None;
        }
        _ => {}
    }

    match state.route {
        Route::Dashboard if state.is_admin() => handle_admin(key_event, state),
        Route::Jobs => handle_jobs(key_event, state, user),
        Route::Bids => handle_bids(key_event, state, user),
        Route::Chat => handle_chat(key_event, state, user),
        Route::Settings => handle_settings(key_event, state, user),
        Route::Subscription => handle_subscription(key_event, state, user),
        _ => None,
    }
}

fn chat_is_open(state: &ViewState) -> bool {
    state.route == Route::Chat && state.open_chat.is_some()
}

/// Refetch whatever the active view shows.
fn refresh(state: &ViewState) -> Option<UserCommand> {
    match state.route {
        Route::Dashboard if state.is_admin() => Some(UserCommand::AdminLoad(state.admin_table)),
        Route::Dashboard => Some(UserCommand::RefreshDashboard),
        Route::Jobs => Some(UserCommand::LoadJobs(state.jobs_tab)),
        Route::Bids => match &state.received_bids {
            Some((job_id, _)) if state.bids_tab == BidsTab::Received => {
                Some(UserCommand::ViewJobBids {
                    job_id: job_id.clone(),
                })
            }
            _ => Some(UserCommand::LoadBids(state.bids_tab)),
        },
        Route::Chat => Some(UserCommand::LoadChats),
        _ => None,
    }
}

fn handle_jobs(key_event: KeyEvent, state: &mut ViewState, user: &User) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Tab => {
            if !access::permits(user, Capability::ViewMyJobs) {
                return None;
            }
            state.jobs_tab = match state.jobs_tab {
                JobsTab::Browse => JobsTab::Mine,
                JobsTab::Mine => JobsTab::Browse,
            };
            state.selected = 0;
            Some(UserCommand::LoadJobs(state.jobs_tab))
        }
        KeyCode::Char('/') => {
            state.filter_mode = true;
            None
        }
        KeyCode::Char('g') => {
            cycle_category_filter(state);
            None
        }
        KeyCode::Esc => {
            state.filter_text.clear();
            state.category_filter = None;
            None
        }
        KeyCode::Char('c') if access::permits(user, Capability::PostJob) => {
            state.form = Some(FormState::new_job());
            None
        }
        KeyCode::Char('b') => {
            let job_id = state.selected_job()?.id.clone();
            if access::permits(user, Capability::SubmitBid) {
                state.form = Some(FormState::bid(&job_id));
            } else if access::permits(user, Capability::SubmitSalesmanBid) {
                state.form = Some(FormState::salesman_bid(&job_id));
            }
            None
        }
        _ => None,
    }
}

/// None -> Material -> Labor -> Machinery -> None
fn cycle_category_filter(state: &mut ViewState) {
    let all = JobCategory::ALL;
    state.category_filter = match state.category_filter {
        None => Some(all[0]),
        Some(current) => all
            .iter()
            .position(|c| *c == current)
            .and_then(|i| all.get(i + 1))
            .copied(),
    };
    state.selected = 0;
}

fn handle_bids(key_event: KeyEvent, state: &mut ViewState, user: &User) -> Option<UserCommand> {
    if state.picking_job_for_bids() {
        return match key_event.code {
            KeyCode::Enter => {
                let job_id = state.selected_job()?.id.clone();
                state.selected = 0;
                Some(UserCommand::ViewJobBids { job_id })
            }
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Esc if state.bids_tab == BidsTab::Received => {
            state.received_bids = None;
            state.selected = 0;
            None
        }
        KeyCode::Char('w') => {
            let (job, bid) = match (state.received_job(), state.selected_bid()) {
                (Some(job), Some(bid)) => (job, bid),
                _ => return None,
            };
            if !lifecycle::can_award(user, job, bid) {
                state.banner = Some(Banner::error("This bid cannot be awarded"));
                return None;
            }
            Some(UserCommand::AwardBid {
                job_id: job.id.clone(),
                bid_id: bid.id.clone(),
            })
        }
        KeyCode::Char('c') => {
            let (job_id, status) = state
                .selected_bid()
                .map(|b| (b.job_id.clone(), b.status))?;
            let allowed = match state.bids_tab {
                BidsTab::Received => state.received_job().is_some_and(|job| {
                    let bids = state.visible_bids();
                    lifecycle::chat_unlocked(job, bids)
                        && lifecycle::is_chat_participant(user, job, bids)
                }),
                BidsTab::Mine => status == BidStatus::Awarded,
            };
            if !allowed {
                state.banner = Some(Banner::error("Chat opens once a bid is awarded"));
                return None;
            }
            state.open_chat = Some(job_id.clone());
            state.messages.clear();
            state.message_selected = 0;
            state.attachment_selected = 0;
            Some(UserCommand::ChatAboutJob { job_id })
        }
        _ => None,
    }
}

fn handle_chat(key_event: KeyEvent, state: &mut ViewState, user: &User) -> Option<UserCommand> {
    let Some(job_id) = state.open_chat.clone() else {
        return match key_event.code {
            KeyCode::Enter => {
                let job_id = state.selected_chat()?.job_id.clone();
                state.open_chat = Some(job_id.clone());
                state.messages.clear();
                state.message_selected = 0;
                state.attachment_selected = 0;
                Some(UserCommand::OpenChat { job_id })
            }
            _ => None,
        };
    };

    match key_event.code {
        KeyCode::Esc => {
            state.open_chat = None;
            state.messages.clear();
            Some(UserCommand::CloseChat)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.message_selected = state.message_selected.saturating_sub(1);
            state.attachment_selected = 0;
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.message_selected + 1 < state.messages.len() {
                state.message_selected += 1;
            }
            state.attachment_selected = 0;
            None
        }
        KeyCode::Left => {
            state.attachment_selected = state.attachment_selected.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            let count = state
                .selected_message()
                .map_or(0, |m| m.file_attachments.len());
            if state.attachment_selected + 1 < count {
                state.attachment_selected += 1;
            }
            None
        }
        KeyCode::Char('m') => {
            state.form = Some(FormState::message(&job_id));
            None
        }
        KeyCode::Char('d') => {
            let file = state
                .selected_message()?
                .file_attachments
                .get(state.attachment_selected)?
                .clone();
            Some(UserCommand::DownloadAttachment { file })
        }
        KeyCode::Char('x') => {
            let message = state.selected_message()?;
            if !message.is_from(&user.id) {
                state.banner = Some(Banner::error("You can only delete your own messages"));
                return None;
            }
            let message_id = message.id.clone();
            state.confirm_delete = Some(PendingDelete {
                what: "this message".to_string(),
                command: UserCommand::DeleteMessage { job_id, message_id },
            });
            None
        }
        _ => None,
    }
}

fn handle_settings(key_event: KeyEvent, state: &mut ViewState, user: &User) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('e') => state.form = Some(FormState::profile(user)),
        KeyCode::Char('w') => state.form = Some(FormState::change_password()),
        _ => {}
    }
    None
}

fn handle_subscription(
    key_event: KeyEvent,
    state: &mut ViewState,
    user: &User,
) -> Option<UserCommand> {
    if !access::permits(user, Capability::Subscribe) {
        return None;
    }
    match key_event.code {
        KeyCode::Char('s') => Some(UserCommand::CreateSubscriptionOrder),
        KeyCode::Char('v') => {
            let order_id = state.subscription_order.as_ref().map(|o| o.id.as_str());
            state.form = Some(FormState::payment_confirmation(order_id));
            None
        }
        _ => None,
    }
}

fn handle_admin(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Tab => {
            let all = AdminTable::ALL;
            let next = all
                .iter()
                .position(|t| *t == state.admin_table)
                .map_or(0, |i| (i + 1) % all.len());
            state.admin_table = all[next];
            state.selected = 0;
            state.user_details = None;
            Some(UserCommand::AdminLoad(state.admin_table))
        }
        KeyCode::Enter if state.admin_table == AdminTable::Users => {
            let user_id = state.selected_admin_id()?.to_string();
            Some(UserCommand::AdminUserDetails { user_id })
        }
        KeyCode::Esc => {
            state.user_details = None;
            state.chat_analytics = None;
            None
        }
        KeyCode::Char('y') => Some(UserCommand::AdminChatAnalytics),
        KeyCode::Char('e') => Some(UserCommand::AdminExport(state.admin_table)),
        KeyCode::Char('x') => {
            let table = state.admin_table;
            let id = state.selected_admin_id()?.to_string();
            let singular = table.as_str().trim_end_matches('s');
            state.confirm_delete = Some(PendingDelete {
                what: format!("{singular} {id}"),
                command: UserCommand::AdminDelete { table, id },
            });
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_ui_update;
    use crate::test_support::*;
    use buildbidz_app::protocol::{BidsView, FormKind, UiUpdate};
    use buildbidz_core::model::{BidStatus, FileAttachment, JobStatus, Message, NewBid, Role};
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(state: &mut ViewState, code: KeyCode) -> Option<UserCommand> {
        handle_key(key(code), state)
    }

    fn type_text(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            assert_eq!(press(state, KeyCode::Char(c)), None);
        }
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('q'));
        event.kind = KeyEventKind::Release;
        assert_eq!(handle_key(event, &mut state), None);
        assert!(!state.confirm_quit);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = ViewState::default();
        state.form = Some(FormState::login());
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(event, &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn quit_needs_confirmation() {
        let mut state = ViewState::default();
        assert_eq!(press(&mut state, KeyCode::Char('q')), None);
        assert!(state.confirm_quit);
        assert_eq!(press(&mut state, KeyCode::Char('x')), None);
        assert_eq!(press(&mut state, KeyCode::Esc), None);
        assert!(!state.confirm_quit);
        press(&mut state, KeyCode::Char('q'));
        assert_eq!(press(&mut state, KeyCode::Char('y')), Some(UserCommand::Quit));
    }

    #[test]
    fn login_form_submits_once_validated() {
        let mut state = ViewState::default();
        assert_eq!(
            press(&mut state, KeyCode::Char('l')),
            Some(UserCommand::Navigate(Route::Auth))
        );
        type_text(&mut state, "site@acme.in");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "secret1");
        assert_eq!(
            press(&mut state, KeyCode::Enter),
            Some(UserCommand::Login {
                email: "site@acme.in".into(),
                password: "secret1".into(),
            })
        );
        assert!(state.form.as_ref().unwrap().submitting);
        // A second Enter while in flight sends nothing.
        assert_eq!(press(&mut state, KeyCode::Enter), None);
    }

    #[test]
    fn invalid_login_shows_inline_error() {
        let mut state = ViewState::default();
        press(&mut state, KeyCode::Char('l'));
        type_text(&mut state, "nobody");
        assert_eq!(press(&mut state, KeyCode::Enter), None);
        assert_eq!(
            state.form.as_ref().unwrap().error.as_deref(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn bid_with_empty_notes_sends_once_and_closes_on_accept() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        state.open_jobs = vec![job("j-1", "b-1", JobStatus::Open)];

        assert_eq!(press(&mut state, KeyCode::Char('b')), None);
        assert_eq!(state.form.as_ref().unwrap().kind, FormKind::Bid);
        type_text(&mut state, "125000");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "10 days");

        let cmd = press(&mut state, KeyCode::Enter);
        assert_eq!(
            cmd,
            Some(UserCommand::SubmitBid {
                job_id: "j-1".into(),
                bid: NewBid {
                    price_quote: 125_000.0,
                    delivery_estimate: "10 days".into(),
                    notes: None,
                },
                attachments: Vec::new(),
            })
        );
        assert_eq!(press(&mut state, KeyCode::Enter), None);

        apply_ui_update(&mut state, UiUpdate::FormAccepted(FormKind::Bid));
        assert!(state.form.is_none());
    }

    #[test]
    fn unparsable_price_sends_nothing() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        state.open_jobs = vec![job("j-1", "b-1", JobStatus::Open)];
        press(&mut state, KeyCode::Char('b'));
        type_text(&mut state, "lots");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "10 days");
        assert_eq!(press(&mut state, KeyCode::Enter), None);
        let form = state.form.as_ref().unwrap();
        assert!(!form.submitting);
        assert_eq!(form.error.as_deref(), Some("Please enter a valid price"));
    }

    #[test]
    fn salesman_gets_company_bid_form() {
        let mut state = signed_in(Role::Salesman, Route::Jobs);
        state.open_jobs = vec![job("j-1", "b-1", JobStatus::Open)];
        press(&mut state, KeyCode::Char('b'));
        assert_eq!(state.form.as_ref().unwrap().kind, FormKind::SalesmanBid);
    }

    #[test]
    fn only_buyers_post_jobs_or_switch_to_my_jobs() {
        let mut supplier = signed_in(Role::Supplier, Route::Jobs);
        press(&mut supplier, KeyCode::Char('c'));
        assert!(supplier.form.is_none());
        assert_eq!(press(&mut supplier, KeyCode::Tab), None);

        let mut buyer = signed_in(Role::Buyer, Route::Jobs);
        press(&mut buyer, KeyCode::Char('c'));
        assert_eq!(buyer.form.as_ref().unwrap().kind, FormKind::NewJob);
        buyer.form = None;
        assert_eq!(
            press(&mut buyer, KeyCode::Tab),
            Some(UserCommand::LoadJobs(JobsTab::Browse))
        );
    }

    #[test]
    fn number_keys_follow_role_navigation() {
        let mut supplier = signed_in(Role::Supplier, Route::Dashboard);
        assert_eq!(
            press(&mut supplier, KeyCode::Char('2')),
            Some(UserCommand::Navigate(Route::Jobs))
        );
        // Suppliers have no Subscription entry.
        assert_eq!(press(&mut supplier, KeyCode::Char('6')), None);

        let mut buyer = signed_in(Role::Buyer, Route::Dashboard);
        assert_eq!(
            press(&mut buyer, KeyCode::Char('6')),
            Some(UserCommand::Navigate(Route::Subscription))
        );
    }

    #[test]
    fn filter_mode_captures_text() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        press(&mut state, KeyCode::Char('/'));
        type_text(&mut state, "q1");
        assert_eq!(state.filter_text, "q1");
        assert!(!state.confirm_quit);
        press(&mut state, KeyCode::Enter);
        assert!(!state.filter_mode);
        assert_eq!(state.filter_text, "q1");
    }

    #[test]
    fn category_filter_cycles_back_to_none() {
        let mut state = signed_in(Role::Supplier, Route::Jobs);
        for expected in [
            Some(JobCategory::Material),
            Some(JobCategory::Labor),
            Some(JobCategory::Machinery),
            None,
        ] {
            press(&mut state, KeyCode::Char('g'));
            assert_eq!(state.category_filter, expected);
        }
    }

    #[test]
    fn buyer_picks_job_then_awards_bid() {
        let mut state = signed_in(Role::Buyer, Route::Bids);
        state.my_jobs = vec![job("j-1", "u-1", JobStatus::Open)];
        assert_eq!(
            press(&mut state, KeyCode::Enter),
            Some(UserCommand::ViewJobBids {
                job_id: "j-1".into()
            })
        );
        apply_ui_update(
            &mut state,
            UiUpdate::Bids {
                view: BidsView::Received {
                    job_id: "j-1".into(),
                },
                bids: vec![
                    bid("bid-1", "j-1", "s-1", BidStatus::Submitted),
                    bid("bid-2", "j-1", "s-2", BidStatus::Submitted),
                ],
            },
        );
        press(&mut state, KeyCode::Down);
        assert_eq!(
            press(&mut state, KeyCode::Char('w')),
            Some(UserCommand::AwardBid {
                job_id: "j-1".into(),
                bid_id: "bid-2".into(),
            })
        );

        press(&mut state, KeyCode::Esc);
        assert!(state.picking_job_for_bids());
    }

    #[test]
    fn awarded_job_offers_no_award() {
        let mut state = signed_in(Role::Buyer, Route::Bids);
        state.my_jobs = vec![job("j-1", "u-1", JobStatus::Awarded)];
        state.received_bids = Some((
            "j-1".into(),
            vec![bid("bid-1", "j-1", "s-1", BidStatus::Awarded)],
        ));
        assert_eq!(press(&mut state, KeyCode::Char('w')), None);
        assert!(state.banner.is_some());
    }

    #[test]
    fn awarded_bid_opens_its_conversation() {
        let mut state = signed_in(Role::Buyer, Route::Bids);
        state.my_jobs = vec![job("j-1", "u-1", JobStatus::Awarded)];
        state.received_bids = Some((
            "j-1".into(),
            vec![
                bid("bid-1", "j-1", "s-1", BidStatus::Rejected),
                bid("bid-2", "j-1", "s-2", BidStatus::Awarded),
            ],
        ));
        assert_eq!(
            press(&mut state, KeyCode::Char('c')),
            Some(UserCommand::ChatAboutJob {
                job_id: "j-1".into()
            })
        );
        assert_eq!(state.open_chat.as_deref(), Some("j-1"));

        // The route switch keeps the conversation open for incoming messages.
        apply_ui_update(&mut state, UiUpdate::Route(Route::Chat));
        assert_eq!(state.open_chat.as_deref(), Some("j-1"));
    }

    #[test]
    fn chat_stays_locked_before_award() {
        let mut state = signed_in(Role::Buyer, Route::Bids);
        state.my_jobs = vec![job("j-1", "u-1", JobStatus::Open)];
        state.received_bids = Some((
            "j-1".into(),
            vec![bid("bid-1", "j-1", "s-1", BidStatus::Submitted)],
        ));
        assert_eq!(press(&mut state, KeyCode::Char('c')), None);
        assert!(state.open_chat.is_none());
        assert_eq!(
            state.banner.as_ref().map(|b| b.text.as_str()),
            Some("Chat opens once a bid is awarded")
        );
    }

    #[test]
    fn someone_elses_awarded_job_is_not_a_chat() {
        let mut state = signed_in(Role::Buyer, Route::Bids);
        state.my_jobs = vec![job("j-1", "other-buyer", JobStatus::Awarded)];
        state.received_bids = Some((
            "j-1".into(),
            vec![bid("bid-1", "j-1", "s-1", BidStatus::Awarded)],
        ));
        assert_eq!(press(&mut state, KeyCode::Char('c')), None);
    }

    #[test]
    fn supplier_chats_from_own_awarded_bid() {
        let mut state = signed_in(Role::Supplier, Route::Bids);
        state.my_bids = vec![
            bid("bid-1", "j-1", "u-1", BidStatus::Rejected),
            bid("bid-2", "j-2", "u-1", BidStatus::Awarded),
        ];
        assert_eq!(press(&mut state, KeyCode::Char('c')), None);
        press(&mut state, KeyCode::Down);
        assert_eq!(
            press(&mut state, KeyCode::Char('c')),
            Some(UserCommand::ChatAboutJob {
                job_id: "j-2".into()
            })
        );
    }

    fn message_from(id: &str, sender: &str, files: Vec<FileAttachment>) -> Message {
        Message {
            id: id.to_string(),
            job_id: "j-1".to_string(),
            sender_id: sender.to_string(),
            receiver_id: None,
            sender_name: None,
            message: "see attached".to_string(),
            file_attachments: files,
            created_at: None,
        }
    }

    fn attachment(id: &str, filename: &str) -> FileAttachment {
        FileAttachment {
            id: id.to_string(),
            filename: filename.to_string(),
            content_type: "application/pdf".to_string(),
            size: 2048,
            uploaded_at: None,
        }
    }

    #[test]
    fn chat_open_download_and_delete() {
        let mut state = signed_in(Role::Buyer, Route::Chat);
        apply_ui_update(
            &mut state,
            UiUpdate::Chats(vec![serde_json::from_value(serde_json::json!({
                "job_id": "j-1",
                "job_title": "Cement",
                "job_status": "awarded"
            }))
            .unwrap()]),
        );
        assert_eq!(
            press(&mut state, KeyCode::Enter),
            Some(UserCommand::OpenChat {
                job_id: "j-1".into()
            })
        );

        apply_ui_update(
            &mut state,
            UiUpdate::Messages {
                job_id: "j-1".into(),
                messages: vec![
                    message_from("m-1", "s-1", vec![]),
                    message_from(
                        "m-2",
                        "u-1",
                        vec![attachment("f-1", "a.pdf"), attachment("f-2", "b.pdf")],
                    ),
                ],
            },
        );
        assert_eq!(state.message_selected, 1);

        press(&mut state, KeyCode::Right);
        assert_eq!(
            press(&mut state, KeyCode::Char('d')),
            Some(UserCommand::DownloadAttachment {
                file: attachment("f-2", "b.pdf")
            })
        );

        assert_eq!(press(&mut state, KeyCode::Char('x')), None);
        assert_eq!(
            press(&mut state, KeyCode::Char('y')),
            Some(UserCommand::DeleteMessage {
                job_id: "j-1".into(),
                message_id: "m-2".into(),
            })
        );

        press(&mut state, KeyCode::Up);
        assert_eq!(press(&mut state, KeyCode::Char('x')), None);
        assert!(state.confirm_delete.is_none());

        assert_eq!(press(&mut state, KeyCode::Esc), Some(UserCommand::CloseChat));
        assert!(state.open_chat.is_none());
    }

    #[test]
    fn admin_delete_needs_confirmation() {
        let mut state = signed_in(Role::Admin, Route::Dashboard);
        apply_ui_update(
            &mut state,
            UiUpdate::AdminUsers(vec![user("u-7", Role::Supplier)]),
        );
        press(&mut state, KeyCode::Char('x'));
        assert_eq!(state.confirm_delete.as_ref().unwrap().what, "user u-7");
        assert_eq!(press(&mut state, KeyCode::Char('n')), None);
        assert!(state.confirm_delete.is_none());

        press(&mut state, KeyCode::Char('x'));
        assert_eq!(
            press(&mut state, KeyCode::Char('y')),
            Some(UserCommand::AdminDelete {
                table: AdminTable::Users,
                id: "u-7".into(),
            })
        );
    }

    #[test]
    fn admin_tab_cycles_tables() {
        let mut state = signed_in(Role::Admin, Route::Dashboard);
        assert_eq!(
            press(&mut state, KeyCode::Tab),
            Some(UserCommand::AdminLoad(AdminTable::Jobs))
        );
        assert_eq!(
            press(&mut state, KeyCode::Tab),
            Some(UserCommand::AdminLoad(AdminTable::Bids))
        );
        assert_eq!(
            press(&mut state, KeyCode::Tab),
            Some(UserCommand::AdminLoad(AdminTable::Users))
        );
        assert_eq!(
            press(&mut state, KeyCode::Char('e')),
            Some(UserCommand::AdminExport(AdminTable::Users))
        );
    }

    #[test]
    fn subscription_keys_are_for_buyers() {
        let mut buyer = signed_in(Role::Buyer, Route::Subscription);
        assert_eq!(
            press(&mut buyer, KeyCode::Char('s')),
            Some(UserCommand::CreateSubscriptionOrder)
        );
        press(&mut buyer, KeyCode::Char('v'));
        assert_eq!(
            buyer.form.as_ref().unwrap().kind,
            FormKind::PaymentConfirmation
        );
    }

    #[test]
    fn notifications_overlay_loads_and_closes() {
        let mut state = signed_in(Role::Supplier, Route::Dashboard);
        assert_eq!(
            press(&mut state, KeyCode::Char('n')),
            Some(UserCommand::LoadNotifications)
        );
        assert!(state.show_notifications);
        press(&mut state, KeyCode::Esc);
        assert!(!state.show_notifications);
    }
}
