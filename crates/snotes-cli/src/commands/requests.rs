use snotes_core::stores::RequestsStore;
use snotes_core::models::ShareAction;
use snotes_core::ShareRequest;

use crate::cli::RequestCommands;
use crate::commands::common::{format_timestamp, Context};
use crate::error::CliError;

pub async fn run_requests(
    command: Option<RequestCommands>,
    context: &Context,
) -> Result<(), CliError> {
    context.require_session()?;
    let store = RequestsStore::new(context.api.clone());
    store.fetch().await?;

    match command.unwrap_or(RequestCommands::List {
        status: None,
        json: false,
    }) {
        RequestCommands::List { status, json } => {
            let list = store.snapshot().await;
            let requests = match status {
                Some(status) => list.with_status(status.into()),
                None => list.all().to_vec(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&requests)?);
            } else if requests.is_empty() {
                println!("No share requests.");
            } else {
                for line in format_request_lines(&requests) {
                    println!("{line}");
                }
                println!("{} pending", list.pending_count());
            }
        }
        RequestCommands::Accept { id } => {
            respond(&store, &id, ShareAction::Accept).await?;
        }
        RequestCommands::Reject { id } => {
            respond(&store, &id, ShareAction::Reject).await?;
        }
    }
    Ok(())
}

async fn respond(store: &RequestsStore, id: &str, action: ShareAction) -> Result<(), CliError> {
    let id = id.trim();
    if store.snapshot().await.get(id).is_none() {
        return Err(CliError::RequestNotFound(id.to_string()));
    }
    match action {
        ShareAction::Accept => store.accept(id).await?,
        ShareAction::Reject => store.reject(id).await?,
    }
    println!("{id} {}", action.resulting_status().label());
    Ok(())
}

pub fn format_request_lines(requests: &[ShareRequest]) -> Vec<String> {
    requests
        .iter()
        .map(|request| {
            let sender = if request.sender.email.is_empty() {
                request.sender.name.clone()
            } else {
                format!("{} <{}>", request.sender.name, request.sender.email)
            };
            format!(
                "{}  {:<8}  {:<9}  {}  wants \"{}\" ({})",
                request.id,
                request.status.label(),
                request.permission.label(),
                sender.trim(),
                request.note.title,
                format_timestamp(request.created_at)
            )
        })
        .collect()
}
