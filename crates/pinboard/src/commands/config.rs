use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(ctx: &Context, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(ctx),
        ConfigCommands::Set { key, value } => set(ctx, &key, &value),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let path = Config::path()?;
    let config = &ctx.config;
    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    println!("  {:<28} {}", "defaults.data_dir", config.data_dir()?.display());
    println!(
        "  {:<28} {}",
        "defaults.autosave_delay_ms",
        config.autosave_delay().as_millis()
    );
    println!("  {:<28} {}", "defaults.windowed", config.windowed());
    println!(
        "  {:<28} {}",
        "defaults.start_workspace",
        config.start_workspace().unwrap_or("(last used)")
    );
    println!("  {:<28} {}", "defaults.theme", config.theme());
    Ok(())
}

fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config.clone();
    config.set(key, value)?;
    let path = config.save()?;
    ctx.say(format!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    ));
    Ok(())
}
