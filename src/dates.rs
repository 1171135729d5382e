use anyhow::Context;
use time::{util::days_in_year_month, Date, Month};

/// Serde adapter for `YYYY-MM-DD` calendar dates.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let text = String::deserialize(d)?;
        Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(serde::de::Error::custom)
    }
}

/// First and last day of a calendar month, both inclusive.
pub fn month_bounds(year: i32, month: u8) -> anyhow::Result<(Date, Date)> {
    let month = Month::try_from(month).context("month must be between 1 and 12")?;
    let first = Date::from_calendar_date(year, month, 1).context("year out of range")?;
    let last = Date::from_calendar_date(year, month, days_in_year_month(year, month))
        .context("year out of range")?;
    Ok((first, last))
}

/// The `n` calendar months ending with the month of `today`, oldest first.
pub fn trailing_months(today: Date, n: usize) -> Vec<(i32, Month)> {
    let mut months = Vec::with_capacity(n);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..n {
        months.push((year, month));
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    months.reverse();
    months
}
