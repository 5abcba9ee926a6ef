mod app;
mod cli;
mod color;
mod config;
mod db;
mod duration;
mod event;
mod export;
mod forms;
mod logging;
mod report;
mod tui;
mod types;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::config::AppConfig;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    let config_path = cli_opts.config.clone().or_else(AppConfig::default_path);
    let config = AppConfig::load(config_path.as_deref())?;

    let db_path = cli_opts
        .db
        .clone()
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(db::default_db_path);
    let level = cli_opts
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());

    if let Some(command) = cli_opts.command {
        logging::init(&level, None)?;
        let store = db::init(&db_path)?;
        return cli::run(command, &store, &config);
    }

    // The dashboard owns the terminal, so logs go to a file next to the database.
    let log_path = db_path.with_file_name("shiftbook.log");
    logging::init(&level, Some(&log_path))?;
    info!(db = %db_path.display(), "starting dashboard");

    let store = db::init(&db_path)?;
    let mut app = app::App::new(store)?;
    let mut terminal = tui::init()?;
    let result = event::run(&mut app, &mut terminal);

    tui::restore()?;

    result
}
