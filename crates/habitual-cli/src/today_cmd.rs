//! `habitual today` and `habitual done`.

use anyhow::Result;

use habitual_core::{CalendarDay, Tracker};

use crate::parse_id;

fn parse_day(raw: Option<&str>) -> Result<Option<CalendarDay>> {
    Ok(raw.map(str::parse::<CalendarDay>).transpose()?)
}

/// Print the agenda for a day.
pub async fn run_today(tracker: &Tracker, date: Option<&str>) -> Result<()> {
    let agenda = tracker.reconciler.agenda(parse_day(date)?).await?;

    println!("{} ({})", agenda.date, agenda.weekday);
    if agenda.items.is_empty() {
        println!("  Nothing scheduled.");
        return Ok(());
    }
    for item in &agenda.items {
        let mark = if item.done { "x" } else { " " };
        println!("  [{mark}] {} ({})", item.habit.name, item.habit.id);
    }
    println!();
    println!("{} of {} remaining", agenda.remaining(), agenda.items.len());
    Ok(())
}

/// Toggle a habit's completion for a day.
pub async fn run_done(tracker: &Tracker, habit_id: &str, date: Option<&str>) -> Result<()> {
    let id = parse_id("habit", habit_id)?;
    let day = parse_day(date)?.unwrap_or_else(CalendarDay::today);
    let toggle = tracker.executions.toggle(id, day).await?;
    if toggle.done {
        println!("Habit {id} marked done on {day}.");
    } else {
        println!("Habit {id} marked not done on {day}.");
    }
    Ok(())
}
