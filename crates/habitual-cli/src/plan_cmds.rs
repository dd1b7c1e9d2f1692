//! CLI handlers for `habitual plan` subcommands.
//!
//! - `habitual plan show`                      -- print the weekly grid
//! - `habitual plan toggle <weekday> <habit>`  -- add/remove one entry
//! - `habitual plan replicate [--from <day>]`  -- copy one day onto the rest

use std::collections::HashMap;

use anyhow::Result;
use uuid::Uuid;

use habitual_core::{Tracker, Weekday};

use crate::{PlanCommands, parse_id};

pub async fn run_plan_command(
    command: PlanCommands,
    tracker: &Tracker,
    default_source: Weekday,
) -> Result<()> {
    match command {
        PlanCommands::Show => cmd_show(tracker).await,
        PlanCommands::Toggle { weekday, habit_id } => {
            let weekday: Weekday = weekday.parse()?;
            let id = parse_id("habit", &habit_id)?;
            let toggle = tracker.plan.toggle(weekday, id).await?;
            println!("Habit {id} {} on {weekday}.", toggle.action);
            Ok(())
        }
        PlanCommands::Replicate { from } => {
            let source = match from {
                Some(raw) => raw.parse::<Weekday>()?,
                None => default_source,
            };
            let created = tracker.plan.replicate_from(source).await?;
            println!("Copied {source} onto the other six days ({created} entries).");
            Ok(())
        }
    }
}

async fn cmd_show(tracker: &Tracker) -> Result<()> {
    let (habits, snapshot) = tokio::try_join!(tracker.habits.list(), tracker.plan.snapshot())?;
    let names: HashMap<Uuid, &str> = habits.iter().map(|h| (h.id, h.name.as_str())).collect();

    for (weekday, ids) in snapshot.iter() {
        let labels: Vec<&str> = ids
            .iter()
            .map(|id| names.get(id).copied().unwrap_or("?"))
            .collect();
        if labels.is_empty() {
            println!("{weekday}  -");
        } else {
            println!("{weekday}  {}", labels.join(", "));
        }
    }
    Ok(())
}
