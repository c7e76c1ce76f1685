// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::IntoDiagnostic;

/// Connects to the game server's MySQL database. The game server owns the
/// schema; the bot only ever reads from it.
pub fn connect_db(config: &ConfigDocument) -> miette::Result<Pool<ConnectionManager<MysqlConnection>>> {
	let url = db_url(config);
	let manager: ConnectionManager<MysqlConnection> = ConnectionManager::new(url);
	Pool::builder().test_on_check_out(true).build(manager).into_diagnostic()
}

fn db_url(config: &ConfigDocument) -> String {
	let db_config = &config.database;
	match db_config.port {
		Some(port) => format!(
			"mysql://{}:{}@{}:{}/{}",
			db_config.username, db_config.password, db_config.host, port, db_config.database
		),
		None => format!(
			"mysql://{}:{}@{}/{}",
			db_config.username, db_config.password, db_config.host, db_config.database
		),
	}
}
