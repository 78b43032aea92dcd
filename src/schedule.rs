use crate::error::Error;
use crate::types::{DayColor, PricedInterval};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Number of peak classes per tariff color; price keys are laid out as
/// `color_code * PEAK_CLASSES + peak`.
pub const PEAK_CLASSES: u8 = 2;

pub fn price_key(color_code: u8, peak: u8) -> u16 {
    u16::from(color_code) * u16::from(PEAK_CLASSES) + u16::from(peak)
}

/// Which day of the (previous, current) pair a segment takes its color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    PreviousDay,
    CurrentDay,
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentTemplate {
    pub start_minute: u32,
    pub end_minute: u32,
    pub color_source: ColorSource,
    pub peak: u8,
}

/// The fixed clock-time partition of a tariff day. The pre-dawn off-peak
/// segment belongs to the previous day's color because a Tempo day runs
/// from 06:00 to 06:00.
pub const DAY_SEGMENTS: [SegmentTemplate; 3] = [
    SegmentTemplate {
        start_minute: 0,
        end_minute: 6 * 60,
        color_source: ColorSource::PreviousDay,
        peak: 0,
    },
    SegmentTemplate {
        start_minute: 6 * 60,
        end_minute: 22 * 60,
        color_source: ColorSource::CurrentDay,
        peak: 1,
    },
    SegmentTemplate {
        start_minute: 22 * 60,
        end_minute: 24 * 60,
        color_source: ColorSource::CurrentDay,
        peak: 0,
    },
];

/// One concrete segment of a calendar day, ready for price lookup. Minute
/// offsets are relative to the day's local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    pub date: NaiveDate,
    pub start_minute: u32,
    pub end_minute: u32,
    pub price_key: u16,
}

/// Price lookup keyed by `(color, peak)` price keys.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: HashMap<u16, Decimal>,
}

impl PriceTable {
    /// Builds the table from the six named Tempo prices, covering every
    /// reachable key of the three-color domain.
    pub fn new(
        blue_off_peak: Decimal,
        blue_peak: Decimal,
        white_off_peak: Decimal,
        white_peak: Decimal,
        red_off_peak: Decimal,
        red_peak: Decimal,
    ) -> Self {
        Self::from_entries([
            (price_key(0, 0), blue_off_peak),
            (price_key(0, 1), blue_peak),
            (price_key(1, 0), white_off_peak),
            (price_key(1, 1), white_peak),
            (price_key(2, 0), red_off_peak),
            (price_key(2, 1), red_peak),
        ])
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (u16, Decimal)>) -> Self {
        Self {
            prices: entries.into_iter().collect(),
        }
    }

    /// An absent key means the table was sized for fewer colors or peak
    /// classes than the feed uses; that is a configuration defect and
    /// never silently defaults.
    pub fn price(&self, key: u16) -> Result<Decimal, Error> {
        self.prices.get(&key).copied().ok_or_else(|| {
            Error::Configuration(format!("price table has no entry for price key {}", key))
        })
    }
}

/// Converts the requested instants to civil dates in the tariff
/// authority's zone. Tariff days are defined in that zone, not in UTC.
pub fn local_day_range(from: DateTime<Utc>, to: DateTime<Utc>, zone: Tz) -> (NaiveDate, NaiveDate) {
    (
        from.with_timezone(&zone).date_naive(),
        to.with_timezone(&zone).date_naive(),
    )
}

/// Expands each day into its priced segments. The input must carry one
/// leading day before the first day of interest, because each day's
/// pre-dawn segment is priced with the previous day's color.
pub fn build_segments(day_colors: &[DayColor]) -> Result<Vec<DaySegment>, Error> {
    if day_colors.len() < 2 {
        return Err(Error::Data(format!(
            "need at least two day colors (leading day plus target day), got {}",
            day_colors.len()
        )));
    }

    let mut segments = Vec::with_capacity((day_colors.len() - 1) * DAY_SEGMENTS.len());
    for pair in day_colors.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        for template in &DAY_SEGMENTS {
            let color_code = match template.color_source {
                ColorSource::PreviousDay => previous.color_code,
                ColorSource::CurrentDay => current.color_code,
            };

            segments.push(DaySegment {
                date: current.date,
                start_minute: template.start_minute,
                end_minute: template.end_minute,
                price_key: price_key(color_code, template.peak),
            });
        }
    }

    Ok(segments)
}

/// Resolves segment bounds to UTC instants, drops segments outside the
/// requested `[from, to)` window and prices the rest. Surviving segments
/// keep their full bounds; they are not clamped to the window.
pub fn clip_schedule(
    segments: &[DaySegment],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    zone: Tz,
    prices: &PriceTable,
) -> Result<Vec<PricedInterval>, Error> {
    let mut intervals = Vec::new();
    for segment in segments {
        let valid_from = local_instant(segment.date, segment.start_minute, zone)?;
        let valid_to = local_instant(segment.date, segment.end_minute, zone)?;

        if valid_from >= to || valid_to <= from {
            continue;
        }

        intervals.push(PricedInterval {
            valid_from,
            valid_to,
            price: prices.price(segment.price_key)?,
        });
    }

    Ok(intervals)
}

/// Resolves a minute-of-day on a calendar date as a civil time in the zone
/// and converts it to a UTC instant, so consecutive days stay contiguous
/// across DST transitions. Minute 1440 is the next day's midnight. An
/// ambiguous civil time resolves to its first occurrence; a nonexistent
/// one (skipped by a transition) is an error, which the fixed segment
/// boundaries never hit in zones that shift mid-night.
fn local_instant(date: NaiveDate, minute: u32, zone: Tz) -> Result<DateTime<Utc>, Error> {
    const MINUTES_PER_DAY: u32 = 24 * 60;

    let (date, minute) = if minute >= MINUTES_PER_DAY {
        let next = date
            .succ_opt()
            .ok_or_else(|| Error::Data(format!("calendar overflows after {}", date)))?;
        (next, minute - MINUTES_PER_DAY)
    } else {
        (date, minute)
    };

    let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
        .ok_or_else(|| Error::Data(format!("invalid minute of day {}", minute)))?;

    zone.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| {
            Error::Data(format!(
                "local time {} {} does not exist in zone {}",
                date, time, zone
            ))
        })
}
