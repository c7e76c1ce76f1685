// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared per-process interaction state. Everything here lives in the bot
//! state [TypeMap] behind an RwLock; entries are keyed by cuid and removed by
//! their expire tasks or by the interaction that consumes them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Instant, sleep_until};
use twilight_http::client::Client;
use twilight_model::channel::message::Embed;
use twilight_model::channel::message::component::Component;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker, UserMarker};
use type_map::concurrent::TypeMap;

/// A multi-page result someone is currently paging through. The embeds are
/// rendered once when the command runs; navigation only swaps which one is
/// shown.
pub struct PageSession {
	pub owner: Id<UserMarker>,
	/// Token of the interaction whose response carries the pages; used to
	/// strip the buttons when the session expires.
	pub interaction_token: String,
	pub embeds: Vec<Embed>,
	pub current_page: usize,
	/// Rows shown below the pagination buttons, re-sent on every transition.
	pub extra_rows: Vec<Component>,
	pub expires_at: Instant,
}

#[derive(Default)]
pub struct PageSessions {
	pub sessions: HashMap<String, PageSession>,
}

/// A pending character or vehicle selection prompt.
pub struct SelectionSession {
	pub owner: Id<UserMarker>,
	pub interaction_token: String,
	pub expires_at: Instant,
}

#[derive(Default)]
pub struct SelectionSessions {
	pub sessions: HashMap<String, SelectionSession>,
}

/// An open support ticket channel.
pub struct TicketData {
	pub ticket_id: String,
	pub opener: Id<UserMarker>,
	pub category_id: String,
	pub opened_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ActiveTickets {
	pub by_channel: HashMap<Id<ChannelMarker>, TicketData>,
}

impl ActiveTickets {
	/// Users get one open ticket at a time.
	pub fn channel_for_user(&self, user: Id<UserMarker>) -> Option<Id<ChannelMarker>> {
		self.by_channel
			.iter()
			.find(|(_, ticket)| ticket.opener == user)
			.map(|(channel, _)| *channel)
	}
}

/// Removes a page session once its deadline passes and strips the buttons
/// from the message. Transitions push the deadline forward, so the task
/// re-sleeps until it finds the deadline actually elapsed.
pub async fn expire_page_session(
	bot_state: Arc<RwLock<TypeMap>>,
	http_client: Arc<Client>,
	application_id: Id<ApplicationMarker>,
	session_id: String,
) {
	let token = loop {
		let deadline = {
			let state = bot_state.read().await;
			let Some(session) = state
				.get::<PageSessions>()
				.and_then(|sessions| sessions.sessions.get(&session_id))
			else {
				return;
			};
			session.expires_at
		};
		sleep_until(deadline).await;

		let mut state = bot_state.write().await;
		let Some(sessions) = state.get_mut::<PageSessions>() else {
			return;
		};
		let Some(session) = sessions.sessions.remove(&session_id) else {
			return;
		};
		if session.expires_at > Instant::now() {
			sessions.sessions.insert(session_id.clone(), session);
			continue;
		}
		break session.interaction_token;
	};

	let interaction_client = http_client.interaction(application_id);
	let strip_result = interaction_client.update_response(&token).components(None).await;
	if let Err(error) = strip_result {
		tracing::debug!(source = ?error, "failed to strip components from an expired page session");
	}
}

/// Removes a selection prompt once its deadline passes, replacing the prompt
/// with an expiry notice.
pub async fn expire_selection_session(
	bot_state: Arc<RwLock<TypeMap>>,
	http_client: Arc<Client>,
	application_id: Id<ApplicationMarker>,
	session_id: String,
) {
	let token = loop {
		let deadline = {
			let state = bot_state.read().await;
			let Some(session) = state
				.get::<SelectionSessions>()
				.and_then(|sessions| sessions.sessions.get(&session_id))
			else {
				return;
			};
			session.expires_at
		};
		sleep_until(deadline).await;

		let mut state = bot_state.write().await;
		let Some(sessions) = state.get_mut::<SelectionSessions>() else {
			return;
		};
		let Some(session) = sessions.sessions.remove(&session_id) else {
			return;
		};
		if session.expires_at > Instant::now() {
			sessions.sessions.insert(session_id.clone(), session);
			continue;
		}
		break session.interaction_token;
	};

	let interaction_client = http_client.interaction(application_id);
	let strip_result = interaction_client
		.update_response(&token)
		.content(Some("This selection timed out. Run the command again."))
		.components(None)
		.await;
	if let Err(error) = strip_result {
		tracing::debug!(source = ?error, "failed to strip components from an expired selection");
	}
}
