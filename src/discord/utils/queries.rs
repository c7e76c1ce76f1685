// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only lookups against the game database, shared by the lookup
//! commands.

use crate::model::{Character, Player, PlayerVehicle, User, Vehicle};
use crate::schema::{player_vehicles, players, users};
use diesel::prelude::*;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Finds the game account linked to a Discord user. The game server records
/// the Discord identifier either as `discord:<id>` or as the bare id, so both
/// are tried.
pub fn find_game_account(db_connection: &mut MysqlConnection, discord_id: Id<UserMarker>) -> QueryResult<Option<User>> {
	let prefixed = format!("discord:{}", discord_id);
	let account: Option<User> = users::table
		.filter(users::discord.eq(&prefixed))
		.first(db_connection)
		.optional()?;
	if account.is_some() {
		return Ok(account);
	}
	users::table
		.filter(users::discord.eq(discord_id.to_string()))
		.first(db_connection)
		.optional()
}

/// All characters belonging to an account. The character table keys on the
/// game license, preferring the newer license format when the account has
/// both.
pub fn characters_for_account(db_connection: &mut MysqlConnection, account: &User) -> QueryResult<Vec<Character>> {
	let license = account.license2.as_ref().or(account.license.as_ref());
	let Some(license) = license else {
		return Ok(Vec::new());
	};
	let rows: Vec<Player> = players::table
		.filter(players::license.eq(license))
		.order(players::cid.asc())
		.load(db_connection)?;
	Ok(rows.into_iter().map(Character::from).collect())
}

pub fn character_by_citizenid(db_connection: &mut MysqlConnection, citizenid: &str) -> QueryResult<Option<Character>> {
	let row: Option<Player> = players::table.find(citizenid).first(db_connection).optional()?;
	Ok(row.map(Character::from))
}

pub fn vehicles_for_characters(db_connection: &mut MysqlConnection, citizenids: &[String]) -> QueryResult<Vec<Vehicle>> {
	if citizenids.is_empty() {
		return Ok(Vec::new());
	}
	let rows: Vec<PlayerVehicle> = player_vehicles::table
		.filter(player_vehicles::citizenid.eq_any(citizenids))
		.order(player_vehicles::id.asc())
		.load(db_connection)?;
	Ok(rows.into_iter().map(Vehicle::from).collect())
}

pub fn vehicle_by_plate(db_connection: &mut MysqlConnection, plate: &str) -> QueryResult<Option<Vehicle>> {
	let row: Option<PlayerVehicle> = player_vehicles::table
		.filter(player_vehicles::plate.eq(plate))
		.first(db_connection)
		.optional()?;
	Ok(row.map(Vehicle::from))
}
