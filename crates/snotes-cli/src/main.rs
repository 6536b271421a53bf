//! snotes - command-line client for Secure Notes
//!
//! Notes, trash, sharing and realtime updates against a Secure Notes backend,
//! with sessions kept in the OS keychain per profile.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::{CommandFactory, Parser};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::Context;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::download::run_download;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::{run_list, run_search};
use crate::commands::pin::run_pin;
use crate::commands::profile::run_profile;
use crate::commands::requests::run_requests;
use crate::commands::share::run_share;
use crate::commands::show::run_show;
use crate::commands::trash::run_trash;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if let Some(hint) = error.hint() {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "snotes=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::Add { title, content }) => {
            run_add(title.as_deref(), &content, &Context::load(profile)?).await?;
        }
        Some(Commands::List {
            query,
            sort,
            limit,
            json,
        }) => {
            run_list(query.as_deref(), sort, limit, json, &Context::load(profile)?).await?;
        }
        Some(Commands::Search {
            query,
            sort,
            limit,
            json,
        }) => {
            run_search(&query, sort, limit, json, &Context::load(profile)?).await?;
        }
        Some(Commands::Show { id, json }) => run_show(&id, json, &Context::load(profile)?).await?,
        Some(Commands::Edit { id, title, content }) => {
            run_edit(&id, title.as_deref(), &content, &Context::load(profile)?).await?;
        }
        Some(Commands::Delete { id, scope }) => {
            run_delete(&id, scope, &mut Context::load(profile)?).await?;
        }
        Some(Commands::Pin { id }) => run_pin(&id, &mut Context::load(profile)?).await?,
        Some(Commands::Download { id, output }) => {
            run_download(&id, output.as_deref(), &Context::load(profile)?).await?;
        }
        Some(Commands::Trash { command }) => run_trash(command, &Context::load(profile)?).await?,
        Some(Commands::Requests { command }) => {
            run_requests(command, &Context::load(profile)?).await?;
        }
        Some(Commands::Share { command }) => run_share(command, &Context::load(profile)?).await?,
        Some(Commands::Profile { command }) => {
            run_profile(command, &Context::load(profile)?).await?;
        }
        Some(Commands::Watch { json }) => run_watch(json, &Context::load(profile)?).await?,
        Some(Commands::Export { format, output }) => {
            run_export(format, output.as_deref(), &Context::load(profile)?).await?;
        }
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Auth { command }) => run_auth(command, profile).await?,
        None => {
            // Quick capture mode: snotes "my thought"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_add(None, &cli.note, &Context::load(profile)?).await?;
            }
        }
    }

    Ok(())
}
