// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::schema::*;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// The result of decoding a denormalized JSON column. Every column is decoded
/// exactly once, when the row is read; malformed or absent JSON yields the
/// type's documented default rather than an error, and the variant records
/// which happened so rendering code can tell real data from filler.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decoded<T> {
	Parsed(T),
	Defaulted(T),
}

impl<T> Decoded<T> {
	pub fn value(&self) -> &T {
		match self {
			Self::Parsed(value) => value,
			Self::Defaulted(value) => value,
		}
	}

	pub fn is_defaulted(&self) -> bool {
		matches!(self, Self::Defaulted(_))
	}
}

fn decode_column<T: DeserializeOwned + Default>(raw: Option<&str>) -> Decoded<T> {
	match raw {
		Some(text) => match serde_json::from_str(text) {
			Ok(value) => Decoded::Parsed(value),
			Err(_) => Decoded::Defaulted(T::default()),
		},
		None => Decoded::Defaulted(T::default()),
	}
}

/// A row of the game server's account table, linking a Discord user to game
/// licenses.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
	pub user_id: i32,
	pub username: String,
	pub license: Option<String>,
	pub license2: Option<String>,
	pub fivem: Option<String>,
	pub discord: Option<String>,
}

/// A raw row of the character table. The JSON text columns are decoded into a
/// [Character] immediately after the query; nothing downstream touches the raw
/// text again.
#[derive(Queryable, Selectable)]
#[diesel(table_name = players)]
pub struct Player {
	pub citizenid: String,
	pub cid: i32,
	pub license: String,
	pub name: String,
	pub money: String,
	pub charinfo: String,
	pub job: String,
	pub gang: String,
	pub position: String,
	pub inventory: Option<String>,
	pub phone_number: Option<String>,
	pub last_updated: NaiveDateTime,
}

/// A character with all of its JSON columns decoded.
pub struct Character {
	pub citizenid: String,
	pub cid: i32,
	pub license: String,
	pub charinfo: Decoded<CharInfo>,
	pub money: Decoded<Money>,
	pub job: Decoded<Job>,
	pub gang: Decoded<Gang>,
	pub position: Decoded<Position>,
	pub inventory: Decoded<Vec<InventoryItem>>,
	pub phone_number: Option<String>,
	pub last_updated: NaiveDateTime,
}

impl From<Player> for Character {
	fn from(row: Player) -> Self {
		Self {
			charinfo: decode_column(Some(&row.charinfo)),
			money: decode_column(Some(&row.money)),
			job: decode_column(Some(&row.job)),
			gang: decode_column(Some(&row.gang)),
			position: decode_column(Some(&row.position)),
			inventory: decode_column(row.inventory.as_deref()),
			citizenid: row.citizenid,
			cid: row.cid,
			license: row.license,
			phone_number: row.phone_number,
			last_updated: row.last_updated,
		}
	}
}

impl Character {
	pub fn display_name(&self) -> String {
		let info = self.charinfo.value();
		format!("{} {}", info.firstname, info.lastname)
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct CharInfo {
	pub firstname: String,
	pub lastname: String,
	pub birthdate: String,
	pub gender: i64,
	pub nationality: String,
	pub phone: String,
}

impl Default for CharInfo {
	fn default() -> Self {
		Self {
			firstname: String::from("Unknown"),
			lastname: String::from("Unknown"),
			birthdate: String::from("Unknown"),
			gender: 0,
			nationality: String::from("Unknown"),
			phone: String::from("Unknown"),
		}
	}
}

impl CharInfo {
	pub fn gender_display(&self) -> &'static str {
		match self.gender {
			0 => "Male",
			1 => "Female",
			_ => "Unknown",
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Money {
	pub cash: f64,
	pub bank: f64,
	pub crypto: f64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Job {
	pub name: String,
	pub label: String,
	pub grade: JobGrade,
	pub onduty: bool,
}

impl Default for Job {
	fn default() -> Self {
		Self {
			name: String::from("unemployed"),
			label: String::from("Civilian"),
			grade: JobGrade::default(),
			onduty: false,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct JobGrade {
	pub name: String,
	pub level: i64,
}

impl Default for JobGrade {
	fn default() -> Self {
		Self {
			name: String::from("Freelancer"),
			level: 0,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Gang {
	pub name: String,
	pub label: String,
}

impl Default for Gang {
	fn default() -> Self {
		Self {
			name: String::from("none"),
			label: String::from("None"),
		}
	}
}

impl Gang {
	pub fn display(&self) -> String {
		if self.name == "none" {
			String::from("None")
		} else {
			format!("{} ({})", self.label, self.name)
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Position {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct InventoryItem {
	pub name: String,
	#[serde(default = "default_item_amount", alias = "count")]
	pub amount: i64,
	#[serde(default)]
	pub slot: i64,
	#[serde(default, rename = "type")]
	pub item_type: Option<String>,
}

fn default_item_amount() -> i64 {
	1
}

/// A raw row of the vehicle table. Trunk and glovebox JSON is decoded into a
/// [Vehicle] right after the query.
#[derive(Queryable, Selectable)]
#[diesel(table_name = player_vehicles)]
pub struct PlayerVehicle {
	pub id: i32,
	pub citizenid: Option<String>,
	pub vehicle: Option<String>,
	pub plate: String,
	pub garage: Option<String>,
	pub fuel: i32,
	pub engine: f32,
	pub body: f32,
	pub state: i32,
	pub drivingdistance: Option<i32>,
	pub trunk: Option<String>,
	pub glovebox: Option<String>,
}

pub struct Vehicle {
	pub citizenid: Option<String>,
	pub model: String,
	pub plate: String,
	pub garage: Option<String>,
	pub fuel: i32,
	pub engine: f32,
	pub body: f32,
	pub state: i32,
	pub drivingdistance: Option<i32>,
	pub trunk: Decoded<Vec<InventoryItem>>,
	pub glovebox: Decoded<Vec<InventoryItem>>,
}

impl From<PlayerVehicle> for Vehicle {
	fn from(row: PlayerVehicle) -> Self {
		Self {
			trunk: decode_column(row.trunk.as_deref()),
			glovebox: decode_column(row.glovebox.as_deref()),
			citizenid: row.citizenid,
			model: row.vehicle.unwrap_or_else(|| String::from("Unknown")),
			plate: row.plate,
			garage: row.garage,
			fuel: row.fuel,
			engine: row.engine,
			body: row.body,
			state: row.state,
			drivingdistance: row.drivingdistance,
		}
	}
}

impl Vehicle {
	pub fn state_display(&self) -> &'static str {
		match self.state {
			0 => "Out",
			1 => "Garaged",
			2 => "Impounded",
			_ => "Unknown",
		}
	}
}

/// Formats a currency amount with thousands separators, dropping fractional
/// cents the way the game UI does.
pub fn format_money(amount: f64) -> String {
	let negative = amount < 0.0;
	let whole = amount.abs().trunc() as u64;
	let digits = whole.to_string();
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
	for (index, digit) in digits.chars().enumerate() {
		if index > 0 && (digits.len() - index) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}
	if negative {
		format!("-${grouped}")
	} else {
		format!("${grouped}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn charinfo_decodes_well_formed_json() {
		let decoded: Decoded<CharInfo> = decode_column(Some(
			r#"{"firstname":"Avery","lastname":"Cole","birthdate":"1990-04-01","gender":1,"nationality":"USA","phone":"5551234"}"#,
		));
		assert!(!decoded.is_defaulted());
		let info = decoded.value();
		assert_eq!(info.firstname, "Avery");
		assert_eq!(info.gender_display(), "Female");
	}

	#[test]
	fn malformed_json_defaults_instead_of_erroring() {
		let decoded: Decoded<CharInfo> = decode_column(Some("not json"));
		assert!(decoded.is_defaulted());
		assert_eq!(decoded.value().firstname, "Unknown");

		let decoded: Decoded<Money> = decode_column(Some("{"));
		assert!(decoded.is_defaulted());
		assert_eq!(decoded.value().cash, 0.0);
	}

	#[test]
	fn absent_column_defaults() {
		let decoded: Decoded<Vec<InventoryItem>> = decode_column(None);
		assert!(decoded.is_defaulted());
		assert!(decoded.value().is_empty());
	}

	#[test]
	fn partial_json_fills_field_defaults() {
		let decoded: Decoded<Job> = decode_column(Some(r#"{"name":"police","label":"Police"}"#));
		assert!(!decoded.is_defaulted());
		let job = decoded.value();
		assert_eq!(job.label, "Police");
		assert_eq!(job.grade.name, "Freelancer");
		assert!(!job.onduty);
	}

	#[test]
	fn inventory_item_amount_accepts_count_alias() {
		let items: Decoded<Vec<InventoryItem>> =
			decode_column(Some(r#"[{"name":"water","count":3,"slot":1},{"name":"bread","slot":2}]"#));
		let items = items.value();
		assert_eq!(items[0].amount, 3);
		assert_eq!(items[1].amount, 1);
	}

	#[test]
	fn gang_display_hides_placeholder_gang() {
		assert_eq!(Gang::default().display(), "None");
		let gang = Gang {
			name: String::from("ballas"),
			label: String::from("Ballas"),
		};
		assert_eq!(gang.display(), "Ballas (ballas)");
	}

	#[test]
	fn money_formatting_groups_thousands() {
		assert_eq!(format_money(0.0), "$0");
		assert_eq!(format_money(999.0), "$999");
		assert_eq!(format_money(1000.0), "$1,000");
		assert_eq!(format_money(1234567.89), "$1,234,567");
		assert_eq!(format_money(-4500.0), "-$4,500");
	}
}
