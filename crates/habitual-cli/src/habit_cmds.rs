//! CLI handlers for `habitual habit` subcommands.

use anyhow::Result;

use habitual_core::Tracker;

use crate::{HabitCommands, parse_id};

/// Dispatch a `HabitCommands` variant to the appropriate handler.
pub async fn run_habit_command(command: HabitCommands, tracker: &Tracker) -> Result<()> {
    match command {
        HabitCommands::Add { name, category } => {
            let habit = tracker.habits.create(&name, &category).await?;
            println!("Habit created.");
            println!();
            println!("  ID:       {}", habit.id);
            println!("  Name:     {}", habit.name);
            println!("  Category: {}", habit.category);
            Ok(())
        }
        HabitCommands::List => cmd_list(tracker).await,
        HabitCommands::Remove { habit_id } => {
            let id = parse_id("habit", &habit_id)?;
            let deletion = tracker.habits.delete(id).await?;
            println!(
                "Habit {id} deleted ({} plan entries, {} completions removed).",
                deletion.plan_entries, deletion.executions
            );
            Ok(())
        }
    }
}

async fn cmd_list(tracker: &Tracker) -> Result<()> {
    let habits = tracker.habits.list().await?;
    if habits.is_empty() {
        println!("No habits found. Use `habitual habit add <name>` to create one.");
        return Ok(());
    }

    let name_w = habits.iter().map(|h| h.name.len()).max().unwrap_or(4).max(4);
    println!("{:<36}  {:<name_w$}  CATEGORY", "ID", "NAME");
    for habit in &habits {
        println!("{:<36}  {:<name_w$}  {}", habit.id, habit.name, habit.category);
    }
    Ok(())
}
