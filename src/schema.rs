// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Hand-written declarations for the game server's tables. The game server
// owns this schema, so there are no migrations and no Diesel CLI output here.

diesel::table! {
	users (user_id) {
		#[sql_name = "userId"]
		user_id -> Integer,
		username -> Text,
		license -> Nullable<Text>,
		license2 -> Nullable<Text>,
		fivem -> Nullable<Text>,
		discord -> Nullable<Text>,
	}
}

diesel::table! {
	players (citizenid) {
		citizenid -> Text,
		cid -> Integer,
		license -> Text,
		name -> Text,
		money -> Text,
		charinfo -> Text,
		job -> Text,
		gang -> Text,
		position -> Text,
		inventory -> Nullable<Text>,
		phone_number -> Nullable<Text>,
		last_updated -> Timestamp,
	}
}

diesel::table! {
	player_vehicles (id) {
		id -> Integer,
		citizenid -> Nullable<Text>,
		vehicle -> Nullable<Text>,
		plate -> Text,
		garage -> Nullable<Text>,
		fuel -> Integer,
		engine -> Float,
		body -> Float,
		state -> Integer,
		drivingdistance -> Nullable<Integer>,
		trunk -> Nullable<Text>,
		glovebox -> Nullable<Text>,
	}
}
