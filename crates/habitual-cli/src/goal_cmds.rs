//! CLI handlers for `habitual goal` subcommands.

use anyhow::Result;

use habitual_core::{CalendarDay, Tracker};

use crate::{GoalCommands, parse_id};

pub async fn run_goal_command(command: GoalCommands, tracker: &Tracker) -> Result<()> {
    match command {
        GoalCommands::Add {
            title,
            category,
            date,
        } => {
            let date = date.as_deref().map(str::parse::<CalendarDay>).transpose()?;
            let goal = tracker.goals.create(&title, &category, date).await?;
            println!("Goal created.");
            println!();
            println!("  ID:        {}", goal.id);
            println!("  Title:     {}", goal.title);
            println!("  Category:  {}", goal.category);
            println!("  Scheduled: {}", goal.scheduled_for.format("%Y-%m-%d %H:%M UTC"));
            Ok(())
        }
        GoalCommands::List { date } => {
            let date = date.as_deref().map(str::parse::<CalendarDay>).transpose()?;
            let goals = tracker.goals.list_by_day(date).await?;
            if goals.is_empty() {
                println!("No goals for {}.", date.unwrap_or_else(CalendarDay::today));
                return Ok(());
            }
            for goal in &goals {
                let mark = if goal.completed { "x" } else { " " };
                println!("[{mark}] {} ({}) {}", goal.title, goal.category, goal.id);
            }
            Ok(())
        }
        GoalCommands::Done { goal_id } => set_completed(tracker, &goal_id, true).await,
        GoalCommands::Undo { goal_id } => set_completed(tracker, &goal_id, false).await,
        GoalCommands::Remove { goal_id } => {
            let id = parse_id("goal", &goal_id)?;
            tracker.goals.delete(id).await?;
            println!("Goal {id} deleted.");
            Ok(())
        }
    }
}

async fn set_completed(tracker: &Tracker, goal_id: &str, completed: bool) -> Result<()> {
    let id = parse_id("goal", goal_id)?;
    let goal = tracker.goals.set_completed(id, completed).await?;
    let state = if goal.completed { "completed" } else { "open" };
    println!("Goal {:?} is now {state}.", goal.title);
    Ok(())
}
