//! Gateway (WHO 13) clock commands.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Offset, TimeZone};

use super::Command;

/// `0HH` east of UTC, `1HH` west of it.
fn timezone_field<Tz: TimeZone>(when: &DateTime<Tz>) -> String {
    let seconds = when.offset().fix().local_minus_utc();
    let hours = seconds.abs() / 3600;
    if seconds >= 0 {
        format!("0{hours:02}")
    } else {
        format!("1{hours:02}")
    }
}

/// Set the gateway clock and calendar.
pub fn set_datetime(when: DateTime<FixedOffset>) -> Command {
    Command::new(
        format!(
            "*#13**#22*{}*{}*0{}##",
            when.format("%H*%M*%S"),
            timezone_field(&when),
            when.format("%w*%d*%m*%Y")
        ),
        format!("Setting gateway time to: {when}."),
    )
}

pub fn set_date(date: NaiveDate) -> Command {
    Command::new(
        format!("*#13**#1*0{}##", date.format("%w*%d*%m*%Y")),
        format!("Setting gateway date to: {date}."),
    )
}

pub fn set_time(when: DateTime<FixedOffset>) -> Command {
    Command::new(
        format!(
            "*#13**#0*{}*{}*##",
            when.format("%H*%M*%S"),
            timezone_field(&when)
        ),
        format!("Setting gateway time to: {}.", when.format("%H:%M:%S%:z")),
    )
}

pub fn set_datetime_to_now() -> Command {
    set_datetime(Local::now().fixed_offset())
}

pub fn set_date_to_today() -> Command {
    set_date(Local::now().date_naive())
}

pub fn set_time_to_now() -> Command {
    set_time(Local::now().fixed_offset())
}

/// Weekday as the gateway counts it, Sunday being 0.
pub fn weekday_number(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}
