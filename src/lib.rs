mod error;
mod price_service;
mod schedule;
mod tempo_client;
mod types;

pub use error::Error;
pub use price_service::{PriceService, PriceServiceConfig};
pub use schedule::{
    build_segments, clip_schedule, local_day_range, price_key, ColorSource, DaySegment,
    PriceTable, SegmentTemplate, DAY_SEGMENTS, PEAK_CLASSES,
};
pub use tempo_client::{TempoClient, TempoClientConfig};
pub use types::{DayColor, PricedInterval, TempoDay};
