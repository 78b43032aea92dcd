use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One calendar day of the Tempo feed as it appears on the wire.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TempoDay {
    pub date: NaiveDate,
    pub color_code: u8,
    /// Tariff period label returned by the feed; accepted but unused.
    pub period: String,
}

/// A calendar date paired with its tariff color code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayColor {
    pub date: NaiveDate,
    pub color_code: u8,
}

impl From<TempoDay> for DayColor {
    fn from(day: TempoDay) -> Self {
        Self {
            date: day.date,
            color_code: day.color_code,
        }
    }
}

/// A half-open absolute-time interval `[valid_from, valid_to)` with the
/// price that applies throughout it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PricedInterval {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub price: Decimal,
}

#[cfg(test)]
#[ctor::ctor]
fn init() {
    env_logger::init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_tempo_days() {
        let response_body = r#"[
          {"date":"2024-01-14","colorCode":0,"period":"2023-2024"},
          {"date":"2024-01-15","colorCode":2,"period":"2023-2024"}
        ]"#;

        let days: Vec<TempoDay> =
            serde_json::from_str(response_body).expect("Failed parsing json");

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(days[0].color_code, 0);
        assert_eq!(days[1].color_code, 2);
    }

    #[test]
    fn day_color_from_tempo_day_drops_period() {
        let day = TempoDay {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            color_code: 1,
            period: "2023-2024".to_string(),
        };

        let day_color = DayColor::from(day);

        assert_eq!(
            day_color,
            DayColor {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                color_code: 1,
            }
        );
    }
}
