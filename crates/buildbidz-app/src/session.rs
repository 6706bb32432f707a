// Sign-in, restore and sign-out.
//
// The bearer token lives in two places: the shared `ApiClient` (for
// requests) and the local store (so a restart picks the session back up).
// Every transition here keeps the two in step and tells the front end.

use buildbidz_core::access::Route;
use buildbidz_core::model::{AuthResponse, User};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::{navigate, AppState};
use crate::protocol::{Banner, UiUpdate};

/// Restore a stored session. Returns `true` when a user is signed in
/// afterwards.
///
/// The stored token is checked with `GET /profile`; any failure clears it
/// and leaves the user on Landing.
pub async fn restore(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> bool {
    let stored = match state.db.load_session() {
        Ok(stored) => stored,
        Err(e) => {
            warn!("Failed to read stored session: {e:#}");
            None
        }
    };
    let Some((token, _cached_user)) = stored else {
        return false;
    };

    state.api.set_token(Some(token.clone()));
    match state.api.profile().await {
        Ok(user) => {
            info!(user_id = %user.id, role = %user.role, "session restored");
            let last = state
                .db
                .load_last_route()
                .unwrap_or_else(|e| {
                    warn!("Failed to read last route: {e:#}");
                    None
                })
                .and_then(|r| Route::parse(&r))
                .unwrap_or(Route::Dashboard);
            establish(state, token, user, ui_tx).await;
            navigate(state, last, ui_tx).await;
            true
        }
        Err(e) => {
            warn!(error = %e, "stored session rejected");
            clear(state);
            let _ = ui_tx.send(UiUpdate::Session(None)).await;
            navigate(state, Route::Landing, ui_tx).await;
            false
        }
    }
}

/// Sign in with the account from `credentials.toml`, if one is configured.
pub async fn auto_login(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> bool {
    let Some((email, password)) = state
        .config
        .credentials
        .login()
        .map(|(e, p)| (e.to_string(), p.to_string()))
    else {
        return false;
    };
    info!(%email, "auto-login from credentials file");
    match state.api.login(&email, &password).await {
        Ok(auth) => {
            start(state, auth, ui_tx).await;
            true
        }
        Err(e) => {
            warn!(error = %e, "auto-login failed");
            let _ = ui_tx
                .send(UiUpdate::Banner(Banner::failure("sign in", &e)))
                .await;
            false
        }
    }
}

/// A login or registration succeeded: store the session and open the
/// dashboard.
pub async fn start(state: &mut AppState, auth: AuthResponse, ui_tx: &mpsc::Sender<UiUpdate>) {
    info!(user_id = %auth.user.id, role = %auth.user.role, "signed in");
    state.api.set_token(Some(auth.access_token.clone()));
    establish(state, auth.access_token, auth.user, ui_tx).await;
    navigate(state, Route::Dashboard, ui_tx).await;
}

async fn establish(
    state: &mut AppState,
    token: String,
    user: User,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if let Err(e) = state.db.save_session(&token, &user) {
        warn!("Failed to persist session: {e:#}");
    }
    state.user = Some(user.clone());
    state.poller.start_notifications();
    let _ = ui_tx.send(UiUpdate::Session(Some(user))).await;
}

/// Replace the signed-in user after a profile change.
pub async fn update_user(state: &mut AppState, user: User, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Some(token) = state.api.token() {
        if let Err(e) = state.db.save_session(&token, &user) {
            warn!("Failed to persist session: {e:#}");
        }
    }
    state.user = Some(user.clone());
    let _ = ui_tx.send(UiUpdate::Session(Some(user))).await;
}

/// Sign out on request.
pub async fn end(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    info!("signed out");
    clear(state);
    let _ = ui_tx.send(UiUpdate::Session(None)).await;
    navigate(state, Route::Landing, ui_tx).await;
    let _ = ui_tx
        .send(UiUpdate::Banner(Banner::info("You have been signed out")))
        .await;
}

/// The server rejected the token (401).
pub async fn expire(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    warn!("session expired");
    clear(state);
    let _ = ui_tx.send(UiUpdate::Session(None)).await;
    navigate(state, Route::Landing, ui_tx).await;
    let _ = ui_tx
        .send(UiUpdate::Banner(Banner::warning(
            "Your session has expired. Please sign in again.",
        )))
        .await;
}

fn clear(state: &mut AppState) {
    state.poller.stop_all();
    state.api.set_token(None);
    state.user = None;
    state.reset_caches();
    if let Err(e) = state.db.clear_session() {
        warn!("Failed to clear stored session: {e:#}");
    }
}
