// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use copper_badge::config::parse_config;
use copper_badge::database::connect_db;
use copper_badge::discord::{run_bot, set_up_client};
use std::env::args;
use std::sync::Arc;

#[tokio::main]
async fn main() -> miette::Result<()> {
	tracing_subscriber::fmt::init();

	let config_path = args().nth(1).unwrap_or_else(|| String::from("config.kdl"));
	let config = Arc::new(parse_config(&config_path).await?);

	let db_connection_pool = connect_db(&config)?;
	let http_client = set_up_client(&config);

	run_bot(db_connection_pool, config, http_client).await
}
