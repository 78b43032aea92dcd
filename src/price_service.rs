use crate::error::Error;
use crate::schedule::{build_segments, clip_schedule, local_day_range, PriceTable};
use crate::tempo_client::TempoClient;
use crate::types::PricedInterval;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use rust_decimal::Decimal;
use std::env;

pub struct PriceServiceConfig {
    tempo_client: TempoClient,
    local_time_zone: Tz,
    price_table: PriceTable,
}

impl PriceServiceConfig {
    pub fn new(
        tempo_client: TempoClient,
        local_time_zone: &str,
        price_table: PriceTable,
    ) -> Result<Self, Error> {
        let local_time_zone = local_time_zone.parse::<Tz>().map_err(|_| {
            Error::Configuration(format!("unknown time zone {}", local_time_zone))
        })?;

        Ok(Self {
            tempo_client,
            local_time_zone,
            price_table,
        })
    }

    pub fn from_env(tempo_client: TempoClient) -> Result<Self, Error> {
        let local_time_zone =
            env::var("LOCAL_TIME_ZONE").unwrap_or_else(|_| "Europe/Paris".to_string());

        let price_table = PriceTable::new(
            price_from_env("TEMPO_BLUE_OFF_PEAK")?,
            price_from_env("TEMPO_BLUE_PEAK")?,
            price_from_env("TEMPO_WHITE_OFF_PEAK")?,
            price_from_env("TEMPO_WHITE_PEAK")?,
            price_from_env("TEMPO_RED_OFF_PEAK")?,
            price_from_env("TEMPO_RED_PEAK")?,
        );

        Self::new(tempo_client, &local_time_zone, price_table)
    }
}

fn price_from_env(name: &str) -> Result<Decimal, Error> {
    env::var(name)
        .map_err(|_| Error::Configuration(format!("{} is not set", name)))?
        .parse::<Decimal>()
        .map_err(|err| Error::Configuration(format!("{} is not a decimal: {}", name, err)))
}

pub struct PriceService {
    config: PriceServiceConfig,
}

impl PriceService {
    pub fn new(config: PriceServiceConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(PriceServiceConfig::from_env(
            TempoClient::from_env()?,
        )?))
    }

    /// Returns the priced schedule overlapping `[from, to)`. Bounds of the
    /// returned intervals are full segment bounds, not clamped to the
    /// request window.
    pub async fn get_price_data(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricedInterval>, Error> {
        if from >= to {
            debug!("empty window {} -> {}, nothing to price", from, to);
            return Ok(Vec::new());
        }

        let zone = self.config.local_time_zone;
        let (local_from, local_to) = local_day_range(from, to, zone);
        debug!(
            "range {} -> {} resolves to local days {} -> {}",
            from, to, local_from, local_to
        );

        let leading_day = local_from
            .pred_opt()
            .ok_or_else(|| Error::Data(format!("no day precedes {}", local_from)))?;

        let day_colors = self
            .config
            .tempo_client
            .get_day_colors(leading_day, local_to)
            .await?;
        info!("retrieved {} day colors", day_colors.len());

        let segments = build_segments(&day_colors)?;
        clip_schedule(&segments, from, to, zone, &self.config.price_table)
    }
}
