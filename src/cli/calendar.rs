//! Working calendar queries

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{days_between, WorkCalendar};
use crate::storage::Config;

#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Check whether a date is a working day
    IsWorkday { date: NaiveDate },

    /// Find the date a task of N workdays starting on START ends on
    Add {
        start: NaiveDate,

        /// Workdays, counting START itself if it is a workday
        days: u32,
    },

    /// Count workdays and calendar days between two dates (inclusive)
    Between { from: NaiveDate, to: NaiveDate },
}

pub fn run(cmd: CalendarCommands, output: &Output) -> Result<()> {
    // Outside a workspace the default calendar applies
    let config = Config::load()?;
    let calendar = config.calendar()?;
    tracing::debug!(preset = config.workspace.calendar.preset.as_str(), "calendar loaded");

    match cmd {
        CalendarCommands::IsWorkday { date } => {
            let workday = calendar.is_workday(date);
            if output.is_json() {
                output.data(&serde_json::json!({ "date": date, "workday": workday }));
            } else if workday {
                println!("{} is a workday", date);
            } else {
                println!("{} is not a workday", date);
            }
        }
        CalendarCommands::Add { start, days } => {
            let end = calendar.add_workdays(start, days);
            if output.is_json() {
                output.data(&serde_json::json!({ "start": start, "days": days, "end": end }));
            } else {
                println!("{}", end);
            }
        }
        CalendarCommands::Between { from, to } => {
            let workdays = calendar.workdays_between(from, to);
            let days = days_between(from, to);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "from": from,
                    "to": to,
                    "workdays": workdays,
                    "days": days,
                }));
            } else {
                println!("{} workdays ({} calendar days apart)", workdays, days);
            }
        }
    }

    Ok(())
}
