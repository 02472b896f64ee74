//! WebSocket Notifications
//!
//! Pushes gamification toasts (XP, level-ups, badges, completed challenges)
//! to browser clients via WebSocket.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages all active connections and subscriptions
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Usage
//!
//! Clients connect to `/api/v1/ws` through the identity gateway, which sets
//! `X-User-Id` on the upgrade request, and can subscribe to:
//! - `user.{id}` - Notifications for the connection's own user
//! - `system` - Server-wide announcements
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! // Through the gateway, which adds X-User-Id: abc
//! const ws = new WebSocket('wss://wardrobe.example/api/v1/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['user.abc', 'system']}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'badge_unlocked') showToast(msg.name);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError, SYSTEM_TOPIC};
pub use messages::{user_topic, ClientMessage, ServerMessage, ToastLevel, WsEvent};
