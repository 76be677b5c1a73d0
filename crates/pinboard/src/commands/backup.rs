use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use colored::Colorize;

use super::{Context, confirm};
use crate::store::backup::{self, Backup};

pub fn export(ctx: &Context, file: Option<PathBuf>, workspace: Option<&str>) -> Result<()> {
    let path = file.unwrap_or_else(|| PathBuf::from(backup::default_file_name()));
    let document = ctx.runtime.block_on(async {
        let document = backup::export(ctx.store(), workspace).await?;
        document.write(&path).await?;
        anyhow::Ok(document)
    })?;
    ctx.say(format!(
        "{} {} to {}",
        "Exported".green().bold(),
        document.counts(),
        path.display()
    ));
    Ok(())
}

pub fn import(ctx: &Context, file: &Path, merge: bool, yes: bool) -> Result<()> {
    let document = ctx
        .runtime
        .block_on(Backup::read(file))
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let counts = document.counts();
    let question = if merge {
        format!("Merge {counts} into the existing data? Records with existing ids are skipped.")
    } else {
        format!("Import {counts}? This replaces ALL current data.")
    };
    if !confirm(&question, yes)? {
        ctx.say("Import cancelled.".yellow());
        return Ok(());
    }

    let summary = ctx.runtime.block_on(async {
        if merge {
            backup::import_merge(ctx.store(), &document).await
        } else {
            backup::import_replace(ctx.store(), &document).await
        }
    })?;
    let verb = if merge { "Merged" } else { "Imported" };
    ctx.say(format!("{} {summary}", verb.green().bold()));
    Ok(())
}
