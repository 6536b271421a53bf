use crate::cli::ProfileCommands;
use crate::commands::common::{format_timestamp, Context};
use crate::error::CliError;

pub async fn run_profile(
    command: Option<ProfileCommands>,
    context: &Context,
) -> Result<(), CliError> {
    context.require_session()?;
    let auth = context.auth();

    match command.unwrap_or(ProfileCommands::Show { json: false }) {
        ProfileCommands::Show { json } => {
            let profile = auth.load_profile().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("name:    {}", profile.name);
                println!("email:   {}", profile.email);
                println!("user id: {}", profile.user_id);
                if let Some(created_at) = profile.created_at {
                    println!("joined:  {}", format_timestamp(created_at));
                }
            }
        }
        ProfileCommands::Update { name } => {
            let profile = auth.update_profile(&name).await?;
            println!("Display name set to {}", profile.name);
        }
    }
    Ok(())
}
