//! Energy management (WHO 18): power meters and consumption counters.
//!
//! Only WHERE values starting with `5` (stop&go / meters) or `7`
//! (actuators with metering) are decoded; anything else stays generic.
//! Historical readings carry a month and day but no year, so the year is
//! inferred relative to today.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use super::{Payload, parse, parse_param, parse_value};
use crate::dispatch::Decoded;
use crate::error::DecodeError;
use crate::frame::ClassifiedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnergyReading {
    ActivePower,
    EnergyTotalizer,
    HourlyConsumption,
    DailyConsumption,
    MonthlyConsumption,
    CurrentDayConsumption,
    CurrentMonthConsumption,
}

impl EnergyReading {
    /// Readings that feed their own entity on the same meter.
    pub fn entity_suffix(self) -> Option<&'static str> {
        match self {
            Self::ActivePower => Some("power"),
            Self::EnergyTotalizer => Some("total-energy"),
            Self::CurrentMonthConsumption => Some("monthly-energy"),
            Self::CurrentDayConsumption => Some("daily-energy"),
            Self::HourlyConsumption | Self::DailyConsumption | Self::MonthlyConsumption => None,
        }
    }
}

/// Consumption in Wh for one hour of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyConsumption {
    pub date: NaiveDate,
    pub hour: u32,
    pub value: u64,
}

/// Consumption in Wh over a day or a month starting at `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodConsumption {
    pub date: NaiveDate,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnergyEvent {
    pub sensor: String,
    pub reading: Option<EnergyReading>,
    /// Watts.
    pub active_power: Option<u64>,
    /// Wh since the meter was installed.
    pub total_consumption: Option<u64>,
    pub hourly: Option<HourlyConsumption>,
    pub daily: Option<PeriodConsumption>,
    pub monthly: Option<PeriodConsumption>,
    /// Wh so far today.
    pub current_day: Option<u64>,
    /// Wh so far this month.
    pub current_month: Option<u64>,
}

pub(crate) fn decode(msg: &ClassifiedMessage) -> Result<Decoded, DecodeError> {
    decode_at(msg, Local::now().date_naive())
}

fn date(msg: &ClassifiedMessage, year: i32, month: u32, day: u32) -> Result<NaiveDate, DecodeError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DecodeError::InvalidDate {
        who: msg.who(),
        frame: msg.raw().to_owned(),
    })
}

fn decode_at(msg: &ClassifiedMessage, today: NaiveDate) -> Result<Decoded, DecodeError> {
    let Some(sensor) = msg
        .where_()
        .strip_prefix('5')
        .or_else(|| msg.where_().strip_prefix('7'))
    else {
        return Ok(Decoded::new(Payload::Generic, None));
    };

    let mut event = EnergyEvent {
        sensor: sensor.to_owned(),
        ..EnergyEvent::default()
    };
    let label = format!("Sensor {sensor} is reporting");
    let params = msg.dimension_params();
    let mut summary = None;

    match msg.dimension() {
        Some(113) => {
            let watts: u64 = parse_value(msg, 0)?;
            event.reading = Some(EnergyReading::ActivePower);
            event.active_power = Some(watts);
            summary = Some(format!("{label} an active power draw of {watts} W."));
        }
        Some(511) => {
            let month: u32 = parse_param(msg, "month", params, 0)?;
            let day: u32 = parse_param(msg, "day", params, 1)?;
            let mut when = date(msg, today.year(), month, day)?;
            if when > today {
                when = date(msg, today.year() - 1, month, day)?;
            }
            let slot: u32 = parse_value(msg, 0)?;
            let value: u64 = parse_value(msg, 1)?;
            if slot == 25 {
                event.reading = Some(EnergyReading::DailyConsumption);
                event.daily = Some(PeriodConsumption { date: when, value });
                summary = Some(format!("{label} a power consumption of {value} Wh for {when}."));
            } else {
                let hour = slot.checked_sub(1).ok_or(DecodeError::InvalidField {
                    who: msg.who(),
                    field: "hour",
                    value: slot.to_string(),
                })?;
                event.reading = Some(EnergyReading::HourlyConsumption);
                event.hourly = Some(HourlyConsumption {
                    date: when,
                    hour,
                    value,
                });
                summary = Some(format!(
                    "{label} a power consumption of {value} Wh for {when} at {hour}."
                ));
            }
        }
        Some(dimension @ (513 | 514)) => {
            let month: u32 = parse_param(msg, "month", params, 0)?;
            let day: u32 = parse_value(msg, 0)?;
            let value: u64 = parse_value(msg, 1)?;
            let month_start = date(msg, today.year(), month, 1)?;
            let in_future = month_start > today;
            let year = match (dimension, in_future) {
                (513, false) => today.year(),
                (513, true) | (_, false) => today.year() - 1,
                (_, true) => today.year() - 2,
            };
            let when = date(msg, year, month, day)?;
            event.reading = Some(EnergyReading::DailyConsumption);
            event.daily = Some(PeriodConsumption { date: when, value });
            summary = Some(format!("{label} a power consumption of {value} Wh for {when}."));
        }
        Some(51) => {
            let total: u64 = parse_value(msg, 0)?;
            event.reading = Some(EnergyReading::EnergyTotalizer);
            event.total_consumption = Some(total);
            summary = Some(format!("{label} a total power consumption of {total} Wh."));
        }
        Some(54) => {
            let partial: u64 = parse_value(msg, 0)?;
            event.reading = Some(EnergyReading::CurrentDayConsumption);
            event.current_day = Some(partial);
            summary = Some(format!(
                "{label} a power consumption of {partial} Wh up to now today."
            ));
        }
        Some(52) => {
            let year_suffix = params.first().ok_or(DecodeError::MissingField {
                who: msg.who(),
                field: "year",
            })?;
            let year: i32 = parse(msg, "year", &format!("20{year_suffix}"))?;
            let month: u32 = parse_param(msg, "month", params, 1)?;
            let when = date(msg, year, month, 1)?;
            let value: u64 = parse_value(msg, 0)?;
            event.reading = Some(EnergyReading::MonthlyConsumption);
            event.monthly = Some(PeriodConsumption { date: when, value });
            summary = Some(format!(
                "{label} a power consumption of {value} Wh for {}.",
                when.format("%B %Y")
            ));
        }
        Some(53) => {
            let partial: u64 = parse_value(msg, 0)?;
            event.reading = Some(EnergyReading::CurrentMonthConsumption);
            event.current_month = Some(partial);
            summary = Some(format!(
                "{label} a power consumption of {partial} Wh up to now this month."
            ));
        }
        _ => {}
    }

    Ok(Decoded::new(Payload::Energy(event), summary))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::frame::{Parsed, classify};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
    }

    fn energy(raw: &str) -> (EnergyEvent, Option<String>) {
        let Ok(Parsed::Message(msg)) = classify(raw) else {
            panic!("{raw} does not classify");
        };
        let decoded = decode_at(&msg, today()).expect("decodes");
        match decoded.payload {
            Payload::Energy(event) => (event, decoded.summary),
            other => panic!("expected energy, got {other:?}"),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn active_power() {
        let (event, summary) = energy("*#18*51*113*1250##");
        assert_eq!(event.sensor, "1");
        assert_eq!(event.active_power, Some(1250));
        assert_eq!(
            summary.as_deref(),
            Some("Sensor 1 is reporting an active power draw of 1250 W.")
        );
    }

    #[test]
    fn hourly_consumption_in_the_past_keeps_the_year() {
        let (event, _) = energy("*#18*51*511#6#14*12*210##");
        assert_eq!(
            event.hourly,
            Some(HourlyConsumption {
                date: ymd(2024, 6, 14),
                hour: 11,
                value: 210,
            })
        );
    }

    #[test]
    fn future_dates_roll_back_a_year() {
        let (event, _) = energy("*#18*51*511#7#1*25*4200##");
        assert_eq!(event.reading, Some(EnergyReading::DailyConsumption));
        assert_eq!(
            event.daily,
            Some(PeriodConsumption {
                date: ymd(2023, 7, 1),
                value: 4200,
            })
        );
    }

    #[test]
    fn daily_history_years() {
        let (current, _) = energy("*#18*51*513#5*20*900##");
        assert_eq!(current.daily.map(|d| d.date), Some(ymd(2024, 5, 20)));

        let (rolled, _) = energy("*#18*51*513#9*20*900##");
        assert_eq!(rolled.daily.map(|d| d.date), Some(ymd(2023, 9, 20)));

        let (previous, _) = energy("*#18*51*514#5*20*900##");
        assert_eq!(previous.daily.map(|d| d.date), Some(ymd(2023, 5, 20)));

        let (older, _) = energy("*#18*51*514#9*20*900##");
        assert_eq!(older.daily.map(|d| d.date), Some(ymd(2022, 9, 20)));
    }

    #[test]
    fn monthly_consumption() {
        let (event, summary) = energy("*#18*51*52#23#11*31000##");
        assert_eq!(
            event.monthly,
            Some(PeriodConsumption {
                date: ymd(2023, 11, 1),
                value: 31000,
            })
        );
        assert_eq!(
            summary.as_deref(),
            Some("Sensor 1 is reporting a power consumption of 31000 Wh for November 2023.")
        );
    }

    #[test]
    fn partial_counters_and_totalizer() {
        assert_eq!(energy("*#18*71*51*123456##").0.total_consumption, Some(123_456));
        assert_eq!(energy("*#18*51*54*800##").0.current_day, Some(800));
        assert_eq!(energy("*#18*51*53*9000##").0.current_month, Some(9000));
    }

    #[test]
    fn other_where_values_stay_generic() {
        let Ok(Parsed::Message(msg)) = classify("*#18*31*113*10##") else {
            panic!("classify");
        };
        let decoded = decode_at(&msg, today()).expect("decodes");
        assert_eq!(decoded.payload, Payload::Generic);
    }

    #[test]
    fn impossible_dates_are_decode_errors() {
        let Ok(Parsed::Message(msg)) = classify("*#18*51*511#2#30*1*10##") else {
            panic!("classify");
        };
        assert!(matches!(
            decode_at(&msg, today()),
            Err(DecodeError::InvalidDate { .. })
        ));
    }
}
