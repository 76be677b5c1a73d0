use anyhow::Result;
use colored::Colorize;

use super::{Context, confirm};
use crate::board::workspace::NEW_WORKSPACE_TITLE;
use crate::cli::WorkspaceCommands;
use crate::store::{self, open_workspaces};

pub fn run(ctx: &Context, command: WorkspaceCommands) -> Result<()> {
    ctx.runtime.block_on(async {
        match command {
            WorkspaceCommands::List => list(ctx).await,
            WorkspaceCommands::Create { title } => {
                let title = title.as_deref().unwrap_or(NEW_WORKSPACE_TITLE);
                let workspace = ctx.store().create_workspace(title).await?;
                ctx.say(format!(
                    "{} {} ({})",
                    "Created".green().bold(),
                    workspace.title,
                    workspace.id.dimmed()
                ));
                Ok(())
            }
            WorkspaceCommands::Rename { workspace, title } => {
                let mut workspaces = open_workspaces(ctx.store(), None).await?;
                let Some(id) = workspaces.find(&workspace).map(|w| w.id.clone()) else {
                    anyhow::bail!("No workspace matches '{workspace}'");
                };
                workspaces.rename(&id, &title);
                ctx.store().save_workspace_list(workspaces.list()).await?;
                let renamed = workspaces.get(&id).map(|w| w.title.as_str()).unwrap_or_default();
                ctx.say(format!("{} {renamed}", "Renamed to".green().bold()));
                Ok(())
            }
            WorkspaceCommands::Delete { workspace, yes } => {
                let mut workspaces = open_workspaces(ctx.store(), None).await?;
                let Some(target) = workspaces.find(&workspace).cloned() else {
                    anyhow::bail!("No workspace matches '{workspace}'");
                };
                let question = format!(
                    "Delete workspace '{}' with all of its cards and tasks?",
                    target.title
                );
                if !confirm(&question, yes)? {
                    ctx.say("Cancelled.".yellow());
                    return Ok(());
                }
                store::delete_workspace(ctx.store(), &mut workspaces, &target.id).await?;
                ctx.say(format!("{} {}", "Deleted".green().bold(), target.title));
                Ok(())
            }
        }
    })
}

async fn list(ctx: &Context) -> Result<()> {
    let workspaces = open_workspaces(ctx.store(), None).await?;
    for workspace in workspaces.list() {
        let data = ctx.store().load_workspace_data(&workspace.id).await?;
        let open = data.tasks.iter().filter(|t| !t.completed).count();
        let created = chrono::DateTime::from_timestamp_millis(workspace.created_at)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let marker = if workspace.id == workspaces.active_id() {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{marker} {:<24} {:>4} cards {:>4} open tasks  {}  {}",
            workspace.title.bold(),
            data.nodes.len(),
            open,
            created.dimmed(),
            workspace.id.dimmed()
        );
    }
    Ok(())
}
