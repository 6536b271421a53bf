use snotes_core::validation::SignupForm;

use crate::cli::AuthCommands;
use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            let context = Context::load(profile.as_deref().or(global_profile))?;
            let state = context.auth().login(&email, &password).await?;
            let email_label = state
                .user
                .as_ref()
                .map_or_else(|| email.trim().to_string(), |user| user.email.clone());
            println!(
                "Signed in profile '{}' as {}",
                context.profile_name, email_label
            );
            Ok(())
        }
        AuthCommands::Signup {
            profile,
            first_name,
            last_name,
            email,
            password,
            confirm_password,
            accept_terms,
        } => {
            let context = Context::load(profile.as_deref().or(global_profile))?;
            let form = SignupForm {
                first_name,
                last_name,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                email,
                password,
                agree_to_terms: accept_terms,
            };
            let created = context.auth().signup(&form).await?;
            println!("Account created for {}", created.email);
            println!(
                "Run `snotes auth login --email {} --password <password>` to sign in.",
                created.email
            );
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let context = Context::load(profile.as_deref().or(global_profile))?;
            let state = context.auth().state();
            if state.is_authenticated {
                let label = state
                    .user
                    .as_ref()
                    .map_or("(profile not loaded)", |user| user.email.as_str());
                println!(
                    "Profile '{}' is signed in as {} ({})",
                    context.profile_name,
                    label,
                    context.api.config().api_base_url
                );
            } else {
                println!("Profile '{}' is not signed in.", context.profile_name);
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let context = Context::load(profile.as_deref().or(global_profile))?;
            context.auth().logout()?;
            println!("Signed out profile '{}'", context.profile_name);
            Ok(())
        }
    }
}
