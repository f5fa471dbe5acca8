//! Energy management (WHO 18) commands.
//!
//! Actuators with metering (`7N`) are addressed as `7N#0`.

use chrono::{Datelike, Local, Months, NaiveDate};

use super::Command;

fn meter(where_: &str) -> String {
    if where_.starts_with('7') {
        format!("{where_}#0")
    } else {
        where_.to_owned()
    }
}

/// Ask the meter to push its active power every minute for `minutes`
/// minutes (at most 255).
pub fn start_sending_instant_power(where_: &str, minutes: u32) -> Command {
    let where_ = meter(where_);
    let minutes = minutes.min(255);
    Command::new(
        format!("*#18*{where_}*#1200#1*{minutes}##"),
        format!("Requesting instant power draw update from sensor {where_} for {minutes} minutes."),
    )
}

pub fn hourly_consumption(where_: &str, date: NaiveDate) -> Option<Command> {
    hourly_consumption_on(where_, date, Local::now().date_naive())
}

/// Hourly history only reaches one year back from `today`.
pub fn hourly_consumption_on(where_: &str, date: NaiveDate, today: NaiveDate) -> Option<Command> {
    let one_year_ago = today.checked_sub_months(Months::new(12))?;
    if date < one_year_ago {
        return None;
    }
    let where_ = meter(where_);
    Some(Command::new(
        format!("*#18*{where_}*511#{}#{}##", date.month(), date.day()),
        format!("Requesting hourly power consumption from sensor {where_} for {date}."),
    ))
}

pub fn partial_daily_consumption(where_: &str) -> Command {
    let where_ = meter(where_);
    Command::new(
        format!("*#18*{where_}*54##"),
        format!("Requesting today's partial power consumption from sensor {where_}."),
    )
}

pub fn daily_consumption(where_: &str, year: i32, month: u32) -> Option<Command> {
    daily_consumption_on(where_, year, month, Local::now().date_naive())
}

/// Daily history of a month within the last two years.
pub fn daily_consumption_on(
    where_: &str,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Option<Command> {
    let target = NaiveDate::from_ymd_opt(year, month, 1)?;
    let one_year_ago = today.checked_sub_months(Months::new(12))?;
    let two_years_ago = today.checked_sub_months(Months::new(24))?;
    let where_ = meter(where_);
    let frame = if target > today {
        return None;
    } else if target > one_year_ago {
        format!("*18*59#{month}*{where_}##")
    } else if target > two_years_ago {
        format!("*18*510#{month}*{where_}##")
    } else {
        return None;
    };
    Some(Command::new(
        frame,
        format!("Requesting daily power consumption for {year}-{month} from sensor {where_}."),
    ))
}

pub fn partial_monthly_consumption(where_: &str) -> Command {
    let where_ = meter(where_);
    Command::new(
        format!("*#18*{where_}*53##"),
        format!("Requesting this month's partial power consumption from sensor {where_}."),
    )
}

pub fn monthly_consumption(where_: &str, year: i32, month: u32) -> Command {
    let where_ = meter(where_);
    Command::new(
        format!("*#18*{where_}*52#{:02}#{month}##", year.rem_euclid(100)),
        format!("Requesting monthly power consumption for {year}-{month} from sensor {where_}."),
    )
}

pub fn total_consumption(where_: &str) -> Command {
    let where_ = meter(where_);
    Command::new(
        format!("*#18*{where_}*51##"),
        format!("Requesting total power consumption from sensor {where_}."),
    )
}
