// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only access to the moderation log file maintained by the game
//! server's admin panel. The file is a JSON document with an `actions` array;
//! the admin panel owns the file, so the bot re-reads it on every lookup
//! rather than caching.

use chrono::{DateTime, Local};
use miette::{IntoDiagnostic, Result, bail};
use serde::{Deserialize, Deserializer};
use tokio::fs::read_to_string;

#[derive(Debug, Deserialize)]
pub struct ModerationLog {
	#[serde(default)]
	pub actions: Vec<ModerationAction>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModerationAction {
	pub id: String,
	#[serde(rename = "type")]
	pub action_type: ActionType,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(default)]
	pub reason: Option<String>,
	/// Unix seconds.
	pub timestamp: i64,
	/// Unix seconds; the admin panel writes `false` for permanent bans.
	#[serde(default, deserialize_with = "number_or_false")]
	pub expiration: Option<i64>,
	#[serde(default, rename = "playerName")]
	pub player_name: Option<String>,
	#[serde(default)]
	pub ids: Vec<String>,
	#[serde(default)]
	pub revocation: Option<Revocation>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Revocation {
	#[serde(default, deserialize_with = "number_or_false")]
	pub timestamp: Option<i64>,
	#[serde(default)]
	pub author: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
	Ban,
	Warn,
	Kick,
}

fn number_or_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum NumberOrFalse {
		Number(i64),
		Other(serde_json::Value),
	}

	match Option::<NumberOrFalse>::deserialize(deserializer)? {
		Some(NumberOrFalse::Number(value)) => Ok(Some(value)),
		_ => Ok(None),
	}
}

impl ModerationAction {
	pub fn is_revoked(&self) -> bool {
		self.revocation.as_ref().is_some_and(|revocation| revocation.timestamp.is_some())
	}

	/// Matches the admin panel's identifier search: a substring match against
	/// the recorded player name or any of the recorded identifiers, case
	/// insensitively.
	pub fn matches_identifier(&self, identifier: &str) -> bool {
		let identifier = identifier.to_lowercase();
		let name_matches = self
			.player_name
			.as_ref()
			.is_some_and(|name| name.to_lowercase().contains(&identifier));
		name_matches || self.ids.iter().any(|id| id.to_lowercase().contains(&identifier))
	}

	/// Ban expiry as shown to users: permanent bans have no expiration, past
	/// expirations read "Expired", future ones the local timestamp.
	pub fn expiry_display(&self, now: DateTime<Local>) -> String {
		match self.expiration.and_then(|seconds| DateTime::from_timestamp(seconds, 0)) {
			Some(expiry) => {
				let expiry = expiry.with_timezone(&Local);
				if expiry < now {
					String::from("Expired")
				} else {
					expiry.format("%Y-%m-%d %H:%M:%S").to_string()
				}
			}
			None => String::from("Permanent"),
		}
	}

	pub fn timestamp_display(&self) -> String {
		match DateTime::from_timestamp(self.timestamp, 0) {
			Some(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
			None => String::from("Unknown"),
		}
	}
}

/// The records that matched one identifier, split by action type, each list
/// newest first.
pub struct PlayerHistory {
	pub bans: Vec<ModerationAction>,
	pub warns: Vec<ModerationAction>,
	pub kicks: Vec<ModerationAction>,
}

impl PlayerHistory {
	pub fn total(&self) -> usize {
		self.bans.len() + self.warns.len() + self.kicks.len()
	}

	/// The most recent ban that has not been revoked, if any.
	pub fn active_ban(&self) -> Option<&ModerationAction> {
		self.bans.iter().find(|ban| !ban.is_revoked())
	}
}

pub async fn load_moderation_log(path: &str) -> Result<ModerationLog> {
	let contents = read_to_string(path).await.into_diagnostic()?;
	let log: ModerationLog = match serde_json::from_str(&contents) {
		Ok(log) => log,
		Err(error) => bail!("moderation log at {} is not valid JSON: {}", path, error),
	};
	Ok(log)
}

pub fn history_for_identifier(log: &ModerationLog, identifier: &str) -> PlayerHistory {
	let mut history = PlayerHistory {
		bans: Vec::new(),
		warns: Vec::new(),
		kicks: Vec::new(),
	};
	for action in &log.actions {
		if !action.matches_identifier(identifier) {
			continue;
		}
		match action.action_type {
			ActionType::Ban => history.bans.push(action.clone()),
			ActionType::Warn => history.warns.push(action.clone()),
			ActionType::Kick => history.kicks.push(action.clone()),
		}
	}
	history.bans.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
	history.warns.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
	history.kicks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
	history
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn sample_log() -> ModerationLog {
		serde_json::from_str(
			r#"{
				"actions": [
					{"id": "A1-B2", "type": "ban", "author": "admin", "reason": "RDM", "timestamp": 100,
					 "expiration": false, "playerName": "Joe", "ids": ["discord:123", "license:abc"]},
					{"id": "C3-D4", "type": "warn", "author": "admin", "reason": "language", "timestamp": 300,
					 "playerName": "Joe", "ids": ["discord:123"]},
					{"id": "E5-F6", "type": "warn", "timestamp": 200, "playerName": "Joe", "ids": ["discord:123"],
					 "revocation": {"timestamp": 250, "author": "admin"}},
					{"id": "G7-H8", "type": "kick", "timestamp": 50, "playerName": "Someone Else",
					 "ids": ["discord:999"]}
				]
			}"#,
		)
		.expect("sample log parses")
	}

	#[test]
	fn identifier_matching_is_substring_and_case_insensitive() {
		let log = sample_log();
		let history = history_for_identifier(&log, "DISCORD:123");
		assert_eq!(history.bans.len(), 1);
		assert_eq!(history.warns.len(), 2);
		assert!(history.kicks.is_empty());
		assert_eq!(history.total(), 3);

		let by_name = history_for_identifier(&log, "someone");
		assert_eq!(by_name.kicks.len(), 1);
	}

	#[test]
	fn records_sort_newest_first() {
		let log = sample_log();
		let history = history_for_identifier(&log, "discord:123");
		assert_eq!(history.warns[0].id, "C3-D4");
		assert_eq!(history.warns[1].id, "E5-F6");
	}

	#[test]
	fn false_expiration_means_permanent() {
		let log = sample_log();
		let ban = &history_for_identifier(&log, "discord:123").bans[0];
		assert_eq!(ban.expiration, None);
		let now = Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
		assert_eq!(ban.expiry_display(now), "Permanent");
	}

	#[test]
	fn past_expiration_reads_expired() {
		let action: ModerationAction = serde_json::from_str(
			r#"{"id": "X", "type": "ban", "timestamp": 100, "expiration": 1000, "ids": []}"#,
		)
		.unwrap();
		let now = Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
		assert_eq!(action.expiry_display(now), "Expired");
	}

	#[test]
	fn revocation_without_timestamp_is_not_revoked() {
		let action: ModerationAction = serde_json::from_str(
			r#"{"id": "X", "type": "warn", "timestamp": 100, "ids": [],
			    "revocation": {"timestamp": null, "author": null}}"#,
		)
		.unwrap();
		assert!(!action.is_revoked());
	}

	#[test]
	fn active_ban_skips_revoked_bans() {
		let log: ModerationLog = serde_json::from_str(
			r#"{"actions": [
				{"id": "NEW", "type": "ban", "timestamp": 300, "ids": ["discord:1"],
				 "revocation": {"timestamp": 400, "author": "admin"}},
				{"id": "OLD", "type": "ban", "timestamp": 100, "ids": ["discord:1"]}
			]}"#,
		)
		.unwrap();
		let history = history_for_identifier(&log, "discord:1");
		assert_eq!(history.active_ban().map(|ban| ban.id.as_str()), Some("OLD"));
	}
}
