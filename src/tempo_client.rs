use crate::error::Error;
use crate::types::{DayColor, TempoDay};
use chrono::NaiveDate;
use log::debug;
use std::env;

pub struct TempoClientConfig {
    base_url: String,
}

impl TempoClientConfig {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        let base_url = env::var("BASE_URL")
            .map_err(|_| Error::Configuration("BASE_URL is not set".to_string()))?;

        Self::new(&base_url)
    }
}

pub struct TempoClient {
    config: TempoClientConfig,
}

impl TempoClient {
    pub fn new(config: TempoClientConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(TempoClientConfig::from_env()?))
    }

    /// Fetches one color code per calendar day for `from_date..=to_date`.
    /// Callers must extend their range one day backward: the first day of
    /// interest needs the previous day's color for its pre-dawn segment.
    pub async fn get_day_colors(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Vec<DayColor>, Error> {
        let mut query_params: Vec<String> = Vec::new();
        let mut date = from_date;
        while date <= to_date {
            query_params.push(format!("date[]={}", date.format("%Y-%m-%d")));
            date = date
                .succ_opt()
                .ok_or_else(|| Error::Data(format!("calendar overflows after {}", date)))?;
        }

        let url = format!("{}?{}", self.config.base_url, query_params.join("&"));
        debug!("request url: {}", url);

        let response = reqwest::Client::new().get(&url).send().await?;

        let status_code = response.status();
        debug!("response status: {}", status_code);

        let response_body = response.text().await?;
        debug!("response body:\n{}", response_body);

        if !status_code.is_success() {
            return Err(Error::Fetch(format!(
                "status code {} indicates failure",
                status_code
            )));
        }

        let days = serde_json::from_str::<Vec<TempoDay>>(&response_body)?;
        for day in &days {
            debug!("tempo day {} has color code {}", day.date, day.color_code);
        }

        into_day_colors(days)
    }
}

/// Enforces the feed contract: strictly increasing gap-free dates, and at
/// least the leading day plus one target day.
fn into_day_colors(days: Vec<TempoDay>) -> Result<Vec<DayColor>, Error> {
    if days.len() < 2 {
        return Err(Error::Data(format!(
            "feed returned {} day(s), need the requested range plus one leading day",
            days.len()
        )));
    }

    let day_colors: Vec<DayColor> = days.into_iter().map(DayColor::from).collect();
    for pair in day_colors.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(Error::Data(format!(
                "duplicate or out-of-order date {} in feed",
                pair[1].date
            )));
        }
        if Some(pair[1].date) != pair[0].date.succ_opt() {
            return Err(Error::Data(format!(
                "gap in feed between {} and {}",
                pair[0].date, pair[1].date
            )));
        }
    }

    Ok(day_colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn get_day_colors_requests_one_date_param_per_day() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::Regex(
                r"date\[\]=2024-01-14&date\[\]=2024-01-15".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"date":"2024-01-14","colorCode":0,"period":"2023-2024"},
                    {"date":"2024-01-15","colorCode":2,"period":"2023-2024"}]"#,
            )
            .create_async()
            .await;

        let client = TempoClient::new(TempoClientConfig::new(&server.url()).unwrap());

        // act
        let day_colors = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 15))
            .await
            .unwrap();

        assert_eq!(day_colors.len(), 2);
        assert_eq!(day_colors[0].date, date(2024, 1, 14));
        assert_eq!(day_colors[0].color_code, 0);
        assert_eq!(day_colors[1].color_code, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_day_colors_fails_on_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = TempoClient::new(TempoClientConfig::new(&server.url()).unwrap());

        let result = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 15))
            .await;

        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn get_day_colors_fails_on_malformed_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"unexpected":"shape"}"#)
            .create_async()
            .await;

        let client = TempoClient::new(TempoClientConfig::new(&server.url()).unwrap());

        let result = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 15))
            .await;

        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn get_day_colors_rejects_gapped_feed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[{"date":"2024-01-14","colorCode":0,"period":"2023-2024"},
                    {"date":"2024-01-16","colorCode":1,"period":"2023-2024"}]"#,
            )
            .create_async()
            .await;

        let client = TempoClient::new(TempoClientConfig::new(&server.url()).unwrap());

        let result = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 16))
            .await;

        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[tokio::test]
    async fn get_day_colors_rejects_duplicate_dates() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[{"date":"2024-01-14","colorCode":0,"period":"2023-2024"},
                    {"date":"2024-01-14","colorCode":1,"period":"2023-2024"}]"#,
            )
            .create_async()
            .await;

        let client = TempoClient::new(TempoClientConfig::new(&server.url()).unwrap());

        let result = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 15))
            .await;

        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[tokio::test]
    async fn get_day_colors_rejects_missing_leading_day() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"date":"2024-01-15","colorCode":2,"period":"2023-2024"}]"#)
            .create_async()
            .await;

        let client = TempoClient::new(TempoClientConfig::new(&server.url()).unwrap());

        let result = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 15))
            .await;

        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn get_day_colors_against_live_api() -> Result<(), Error> {
        let client = TempoClient::from_env().expect("Failed creating TempoClient");

        // act
        let day_colors = client
            .get_day_colors(date(2024, 1, 14), date(2024, 1, 15))
            .await?;

        assert_eq!(day_colors.len(), 2);
        Ok(())
    }
}
