// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use knus::Decode;
use miette::{IntoDiagnostic, Result};
use tokio::fs::read_to_string;

pub async fn parse_config(config_path: &str) -> Result<ConfigDocument> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	let config = knus::parse(config_path, &config_file_contents)?;
	Ok(config)
}

#[derive(Debug, Decode)]
pub struct ConfigDocument {
	#[knus(child, unwrap(argument))]
	pub discord_token: String,
	/// The color used for all embeds the bot sends, as a 24-bit RGB value.
	#[knus(child, unwrap(argument), default = 0x00e8_1d1d)]
	pub embed_color: u32,
	#[knus(child)]
	pub roles: RolesConfig,
	#[knus(child)]
	pub database: DatabaseArgs,
	/// Path to the moderation log file maintained by the game server's admin
	/// panel.
	#[knus(child, unwrap(argument))]
	pub moderation_log: String,
	#[knus(child)]
	pub tickets: TicketsConfig,
	#[knus(child)]
	pub sessions: SessionsConfig,
}

#[derive(Debug, Decode)]
pub struct RolesConfig {
	#[knus(child, unwrap(argument))]
	pub staff: u64,
	#[knus(child, unwrap(argument))]
	pub admin: u64,
	/// Role pinged when a new ticket channel is created.
	#[knus(child, unwrap(argument))]
	pub ticket_ping: Option<u64>,
}

#[derive(Debug, Decode)]
pub struct DatabaseArgs {
	#[knus(child, unwrap(argument))]
	pub host: String,
	#[knus(child, unwrap(argument))]
	pub port: Option<u16>,
	#[knus(child, unwrap(argument))]
	pub username: String,
	#[knus(child, unwrap(argument))]
	pub password: String,
	#[knus(child, unwrap(argument))]
	pub database: String,
}

#[derive(Debug, Decode)]
pub struct TicketsConfig {
	/// Category channel under which ticket channels are created, one entry
	/// per ticket category.
	#[knus(children(name = "category"))]
	pub categories: Vec<TicketCategoryConfig>,
	/// Channel that receives the plain-text transcript when a ticket closes.
	#[knus(child, unwrap(argument))]
	pub transcript_channel: u64,
}

#[derive(Debug, Decode)]
pub struct TicketCategoryConfig {
	#[knus(argument)]
	pub id: String,
	#[knus(child, unwrap(argument))]
	pub label: String,
	#[knus(child, unwrap(argument))]
	pub description: String,
	#[knus(child, unwrap(argument))]
	pub parent_channel: u64,
}

#[derive(Debug, Decode)]
pub struct SessionsConfig {
	/// How long a character or vehicle selection prompt stays interactive.
	#[knus(child, unwrap(argument), default = 60)]
	pub select_timeout_seconds: u64,
	/// How long pagination buttons stay interactive after the last use.
	#[knus(child, unwrap(argument), default = 300)]
	pub page_timeout_seconds: u64,
}
