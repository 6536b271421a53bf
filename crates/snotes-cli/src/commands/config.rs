use std::env;

use snotes_core::config::{API_BASE_URL_ENV, DEFAULT_API_BASE_URL, SOCKET_URL_ENV};

use crate::cli::ConfigCommands;
use crate::config_profiles::{is_http_url, normalize_text_option, CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_base_url,
            socket_url,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            api_base_url,
            socket_url,
            no_activate,
        ),
        ConfigCommands::Show { profile } => run_config_show(profile.as_deref().or(global_profile)),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    socket_url: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing_profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged_api_base_url = normalize_text_option(api_base_url)
        .or_else(|| normalize_text_option(env::var(API_BASE_URL_ENV).ok()))
        .or_else(|| existing_profile.api_base_url())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let merged_socket_url = normalize_text_option(socket_url)
        .or_else(|| normalize_text_option(env::var(SOCKET_URL_ENV).ok()))
        .or_else(|| existing_profile.socket_url());

    let profile = config.profile_mut_or_default(&profile_name);
    profile.api_base_url = Some(merged_api_base_url);
    profile.socket_url = merged_socket_url;
    validate_profile_urls(profile)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    println!(
        "Run `snotes auth login --email <email> --password <password>` to sign in."
    );
    Ok(())
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };

    let client_config = profile.client_config()?;
    let active = config.active_profile.as_deref() == Some(profile_name.as_str());
    println!("profile:      {profile_name}{}", if active { " (active)" } else { "" });
    println!("api_base_url: {}", client_config.api_base_url);
    println!("socket_url:   {}", client_config.socket_base_url()?);
    println!("pinned notes: {}", profile.pinned_notes.len());
    Ok(())
}

pub fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.api_base_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "api_base_url must include http:// or https://".to_string(),
            ));
        }
    }
    if let Some(url) = profile.socket_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "socket_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
