//! API Routes
//!
//! Route handlers organized by functionality.

pub mod analytics;
pub mod export;
pub mod gamification;
pub mod health;
pub mod items;
pub mod outfits;
pub mod profile;

use crate::api::state::AppState;
use crate::gamification::GamificationOutcome;
use crate::websocket::WsEvent;

/// Push toast notifications for what an action earned
pub(crate) fn notify(state: &AppState, user_id: &str, reason: &str, outcome: &GamificationOutcome) {
    state
        .ws_hub
        .publish_all(WsEvent::from_outcome(user_id, reason, outcome));
}
