//! WebSocket Message Types
//!
//! Defines the messages exchanged between browser clients and the
//! wardrobe server. Server messages drive the toast notifications shown
//! after gamified actions.

use serde::{Deserialize, Serialize};

use crate::gamification::{badges, challenges, xp::level_title, BadgeId, GamificationOutcome};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics (`user.{id}` for the connection's own user, `system`)
    Subscribe { topics: Vec<String> },
    /// Unsubscribe from topics
    Unsubscribe { topics: Vec<String> },
    /// Ping for keepalive
    Ping,
}

/// Toast severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// XP was granted
    XpAwarded {
        amount: u64,
        total_xp: u64,
        reason: String,
    },
    /// The user reached a new level
    LevelUp { level: u32, title: String },
    /// A badge was earned
    BadgeUnlocked {
        badge: BadgeId,
        name: String,
        description: String,
    },
    /// A challenge reached its target
    ChallengeCompleted {
        challenge_id: String,
        title: String,
        xp_reward: u64,
    },
    /// Free-form notification
    Toast { level: ToastLevel, message: String },
    /// Subscription confirmed
    Subscribed { topics: Vec<String> },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
    /// Connection established
    Connected {
        connection_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "user.abc")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

/// Topic carrying one user's notifications
pub fn user_topic(user_id: &str) -> String {
    format!("user.{}", user_id)
}

impl WsEvent {
    /// Event addressed to one user
    pub fn for_user(user_id: &str, message: ServerMessage) -> Self {
        Self {
            topic: user_topic(user_id),
            message,
        }
    }

    /// Toast for one user
    pub fn toast(user_id: &str, level: ToastLevel, message: impl Into<String>) -> Self {
        Self::for_user(
            user_id,
            ServerMessage::Toast {
                level,
                message: message.into(),
            },
        )
    }

    /// Create a system event
    pub fn system(message: &str) -> Self {
        Self {
            topic: "system".to_string(),
            message: ServerMessage::Toast {
                level: ToastLevel::Info,
                message: message.to_string(),
            },
        }
    }

    /// Notifications for everything a gamified action earned, in display order
    pub fn from_outcome(user_id: &str, reason: &str, outcome: &GamificationOutcome) -> Vec<Self> {
        let mut events = Vec::new();

        if outcome.xp_gained > 0 {
            events.push(Self::for_user(
                user_id,
                ServerMessage::XpAwarded {
                    amount: outcome.xp_gained,
                    total_xp: outcome.total_xp,
                    reason: reason.to_string(),
                },
            ));
        }

        if outcome.leveled_up() {
            events.push(Self::for_user(
                user_id,
                ServerMessage::LevelUp {
                    level: outcome.level_after,
                    title: level_title(outcome.level_after).to_string(),
                },
            ));
        }

        for id in &outcome.badges_unlocked {
            if let Some(badge) = badges::badge(*id) {
                events.push(Self::for_user(
                    user_id,
                    ServerMessage::BadgeUnlocked {
                        badge: *id,
                        name: badge.name.to_string(),
                        description: badge.description.to_string(),
                    },
                ));
            }
        }

        for id in &outcome.challenges_completed {
            if let Some(challenge) = challenges::challenge(id) {
                events.push(Self::for_user(
                    user_id,
                    ServerMessage::ChallengeCompleted {
                        challenge_id: challenge.id.to_string(),
                        title: challenge.title.to_string(),
                        xp_reward: challenge.xp_reward,
                    },
                ));
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize_subscribe() {
        let json = r#"{"type": "subscribe", "topics": ["user.u1", "system"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Subscribe { topics } => {
                assert_eq!(topics.len(), 2);
                assert_eq!(topics[0], "user.u1");
            }
            _ => panic!("Expected Subscribe"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_serialize_badge() {
        let msg = ServerMessage::BadgeUnlocked {
            badge: BadgeId::FirstItem,
            name: "First Piece".to_string(),
            description: "Add your first item".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"badge_unlocked\""));
        assert!(json.contains("\"badge\":\"first_item\""));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
            user_id: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"connected","connection_id":"abc-123"}"#);
    }

    #[test]
    fn test_events_from_outcome() {
        let outcome = GamificationOutcome {
            xp_gained: 110,
            total_xp: 110,
            level_before: 1,
            level_after: 2,
            streak: 1,
            badges_unlocked: vec![BadgeId::FirstItem],
            challenges_completed: vec!["outfit-diary".to_string()],
        };

        let events = WsEvent::from_outcome("u1", "item_added", &outcome);
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.topic == "user.u1"));
        assert!(matches!(events[0].message, ServerMessage::XpAwarded { amount: 110, .. }));
        assert!(matches!(events[1].message, ServerMessage::LevelUp { level: 2, .. }));
        assert!(matches!(events[3].message, ServerMessage::ChallengeCompleted { .. }));
    }

    #[test]
    fn test_no_events_for_empty_outcome() {
        let events = WsEvent::from_outcome("u1", "noop", &GamificationOutcome::default());
        assert!(events.is_empty());
    }
}
