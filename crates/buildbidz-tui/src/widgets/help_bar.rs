// Help bar: key hints for the active route and mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use buildbidz_core::access::{self, BidsTab, Capability, Route};

use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = format!(" {}", hints(state));
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Hint line for the current mode.
pub fn hints(state: &ViewState) -> String {
    if state.form.is_some() {
        return "Tab/↓:Next field | Shift+Tab/↑:Previous | Enter:Submit | Esc:Cancel".into();
    }
    if state.filter_mode {
        return "Type to search | Enter:Keep | Esc:Clear".into();
    }
    if state.show_notifications {
        return "r:Reload | n/Esc:Close".into();
    }
    let Some(user) = &state.user else {
        return "l:Sign in | r:Register | f:Forgot password | p:Reset password | a:About | q:Quit"
            .into();
    };

    let view = match state.route {
        Route::Dashboard if state.is_admin() => {
            "Tab:Table | ↑↓:Select | Enter:User details | x:Delete | e:Export CSV | y:Chat analytics"
        }
        Route::Jobs => {
            if access::permits(user, Capability::PostJob) {
                "Tab:Browse/Mine | /:Search | g:Category | c:Post job"
            } else {
                "/:Search | g:Category | b:Bid on job"
            }
        }
        Route::Bids if state.bids_tab == BidsTab::Received => {
            if state.picking_job_for_bids() {
                "↑↓:Select job | Enter:View bids"
            } else {
                "↑↓:Select | w:Award bid | c:Chat | Esc:Back to jobs"
            }
        }
        Route::Chat if state.open_chat.is_some() => {
            "↑↓:Message | ←→:Attachment | m:Write | d:Download | x:Delete | Esc:Close"
        }
        Route::Chat => "↑↓:Select | Enter:Open conversation",
        Route::Settings => "e:Edit profile | w:Change password",
        Route::Subscription => "s:Create order | v:Confirm payment",
        _ => "",
    };

    let mut parts = Vec::new();
    if !view.is_empty() {
        parts.push(view);
    }
    parts.extend(["R:Refresh", "n:Notifications", "o:Sign out", "q:Quit"]);
    parts.join(" | ")
}
