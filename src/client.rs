use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::load_config;
use crate::envelope::ApiReply;
use crate::error::{Error, Result};
use crate::routes;
use crate::time::{format_time, parse_time};

/// Query options: query-parameter name to JSON value.
///
/// Values are JSON so structured filters (geometry arrays, numeric bounds,
/// variable lists) can be passed as-is; the client serializes them for the
/// wire. The caller's map is never mutated.
pub type QueryOptions = BTreeMap<String, Value>;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-argokey";

/// Width of one time slice for unscoped data-route queries.
const SLICE_WIDTH_DAYS: i64 = 30;

/// Safety margin applied to the server's suggested rate-limit wait.
const RATE_LIMIT_MARGIN: f64 = 1.1;

/// Share of the suggested latency slept between consecutive slices; the
/// synchronous request itself is assumed to supply the rest.
const PACING_FACTOR: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, typically `https://argovis-api.colorado.edu/`.
    pub url: String,
    /// API key, sent in the `x-argokey` header; empty for anonymous access.
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    key: String,

    now: fn() -> DateTime<Utc>,
    http: HttpClient,
}

impl Client {
    /// Creates a client using environment variables and/or crate defaults.
    ///
    /// This is equivalent to `Client::new(None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `url`/`key` arguments
    /// - environment variables `ARGOVIS_API_URL` / `ARGOVIS_API_KEY`
    /// - the public API root and an empty key
    pub fn new(url: Option<String>, key: Option<String>) -> Result<Self> {
        let cfg = load_config(url, key);

        Ok(Self {
            url: cfg.url,
            key: cfg.key,
            now: Utc::now,
            http: build_http(Duration::from_secs(60))?,
        })
    }

    /// Replaces the per-request timeout (default 60 s). Broad queries on slow
    /// routes may need more.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    /// Replaces the clock used to default `endDate` when slicing.
    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Issues one GET against `{url}{route}` with `options` as query
    /// parameters, absorbing the server's rate-limit protocol.
    ///
    /// Returns the result documents together with the server's current
    /// suggested latency for pacing follow-up requests. A 429 answer sleeps
    /// for the suggested wait plus a 10% margin and repeats the identical
    /// request, unconditionally and without a retry cap; a 404 is normalized
    /// to an empty result list. Neither surfaces as an error.
    pub fn fetch(
        &self,
        route: &str,
        options: &QueryOptions,
        suggested_latency: f64,
    ) -> Result<(Vec<Value>, f64)> {
        let params = encode_params(options);
        let url = format!("{}{}", self.url, route);
        let mut latency = suggested_latency;

        loop {
            // The server carries its error protocol in the body, whatever the
            // HTTP status; parse unconditionally.
            let text = self
                .http
                .get(&url)
                .query(&params)
                .header(API_KEY_HEADER, &self.key)
                .send()?
                .text()?;
            let body: Value = serde_json::from_str(&text)?;

            match ApiReply::decode(body)? {
                ApiReply::Results(docs) => return Ok((docs, latency)),
                ApiReply::NotFound => return Ok((Vec::new(), latency)),
                ApiReply::RateLimited {
                    wait,
                    latency: hint,
                } => {
                    let pause = wait * RATE_LIMIT_MARGIN;
                    debug!("rate limited on {route}; retrying in {pause:.1}s");
                    sleep_secs(pause);
                    latency = hint;
                }
                ApiReply::Error { code, message } => {
                    return Err(Error::Remote { code, message });
                }
            }
        }
    }

    /// Fetches all documents matching `options` on `route`, slicing unscoped
    /// data-route queries into 30-day windows so no single request asks the
    /// server for an unbounded amount of data.
    ///
    /// Simple routes, and data routes carrying one of their recognized
    /// scoping parameters, go out as a single request with the caller's
    /// options untouched. Slices run strictly sequentially in boundary
    /// order; each slice's suggested latency is forwarded to the next, with
    /// 80% of it slept before the following request. A failure on any slice
    /// aborts the whole call.
    pub fn query(&self, route: &str, options: &QueryOptions) -> Result<Vec<Value>> {
        let Some(data_route) = routes::lookup(route.trim_matches('/')) else {
            return Ok(self.fetch(route, options, 0.0)?.0);
        };

        // A scoping filter already bounds the response; no need to slice.
        if data_route
            .scoping_params
            .iter()
            .any(|p| options.contains_key(*p))
        {
            return Ok(self.fetch(route, options, 0.0)?.0);
        }

        let start = match options.get("startDate") {
            Some(value) => time_option(value)?,
            None => parse_time(data_route.earliest_record)?,
        };
        let end = match options.get("endDate") {
            Some(value) => time_option(value)?,
            None => (self.now)(),
        };
        if end <= start {
            warn!(
                "degenerate time range on {route}: endDate {} is not after startDate {}",
                format_time(end),
                format_time(start)
            );
        }

        let boundaries = slice_boundaries(start, end);
        debug!("slicing {route} into {} window(s)", boundaries.len() - 1);

        let mut sliced = options.clone();
        let mut results = Vec::new();
        let mut latency = 0.0;

        for (i, window) in boundaries.windows(2).enumerate() {
            if i > 0 {
                sleep_secs(latency * PACING_FACTOR);
            }
            sliced.insert(
                "startDate".to_string(),
                Value::String(format_time(window[0])),
            );
            sliced.insert("endDate".to_string(), Value::String(format_time(window[1])));

            let (docs, hint) = self.fetch(route, &sliced, latency)?;
            results.extend(docs);
            latency = hint;
        }
        Ok(results)
    }
}

/// Builds the slice boundaries: `start`, then 30-day steps while the next
/// boundary stays strictly more than 30 days before `end`, then `end`
/// itself.
///
/// `end <= start` yields the single degenerate window `[start, end]`; the
/// caller flags it and lets the server answer.
pub(crate) fn slice_boundaries(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let width = TimeDelta::days(SLICE_WIDTH_DAYS);
    let mut boundaries = vec![start];
    let mut cursor = start;
    while cursor + width < end {
        cursor += width;
        boundaries.push(cursor);
    }
    boundaries.push(end);
    boundaries
}

fn build_http(timeout: Duration) -> Result<HttpClient> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("argovis-rs/{}", env!("CARGO_PKG_VERSION")))
            .unwrap_or(HeaderValue::from_static("argovis-rs")),
    );

    Ok(HttpClient::builder()
        .default_headers(default_headers)
        .timeout(timeout)
        .build()?)
}

/// Encodes options as wire query parameters, working on borrowed values so
/// the caller's map stays untouched.
fn encode_params(options: &QueryOptions) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(options.len());
    for (key, value) in options {
        match value {
            // Geometry filters travel as their encoded string form.
            _ if key == "polygon" || key == "multipolygon" => {
                params.push((key.clone(), scalar(value)));
            }
            // Other list values become repeated query parameters.
            Value::Array(items) => {
                for item in items {
                    params.push((key.clone(), scalar(item)));
                }
            }
            _ => params.push((key.clone(), scalar(value))),
        }
    }
    params
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn time_option(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_time(s),
        other => Err(Error::InvalidTime(other.to_string())),
    }
}

fn sleep_secs(seconds: f64) {
    if seconds > 0.0 {
        thread::sleep(Duration::from_secs_f64(seconds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn boundaries_cover_range_in_30_day_steps() {
        let start = utc(2023, 1, 1);
        let end = start + TimeDelta::days(100);
        let boundaries = slice_boundaries(start, end);

        assert_eq!(boundaries.first(), Some(&start));
        assert_eq!(boundaries.last(), Some(&end));
        assert_eq!(boundaries.len(), 5);
        for pair in boundaries.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] <= TimeDelta::days(30));
        }
    }

    #[test]
    fn single_window_when_range_fits() {
        let start = utc(2023, 1, 1);
        let end = start + TimeDelta::days(30);
        assert_eq!(slice_boundaries(start, end), vec![start, end]);
    }

    #[test]
    fn final_window_takes_the_remainder() {
        let start = utc(2023, 1, 1);
        let end = start + TimeDelta::days(31);
        assert_eq!(
            slice_boundaries(start, end),
            vec![start, start + TimeDelta::days(30), end]
        );
    }

    #[test]
    fn degenerate_range_passes_through() {
        let start = utc(2023, 1, 1);
        assert_eq!(slice_boundaries(start, start), vec![start, start]);

        let earlier = utc(2022, 1, 1);
        assert_eq!(slice_boundaries(start, earlier), vec![start, earlier]);
    }

    #[test]
    fn geometry_options_are_serialized() {
        let mut options = QueryOptions::new();
        options.insert("polygon".to_string(), json!([[0, 0], [1, 1], [0, 1]]));

        let params = encode_params(&options);
        assert_eq!(
            params,
            vec![("polygon".to_string(), "[[0,0],[1,1],[0,1]]".to_string())]
        );
        // The caller's map still holds the structured value.
        assert!(options["polygon"].is_array());
    }

    #[test]
    fn string_geometry_passes_through() {
        let mut options = QueryOptions::new();
        options.insert("multipolygon".to_string(), json!("[[[0,0],[1,1]]]"));

        let params = encode_params(&options);
        assert_eq!(params[0].1, "[[[0,0],[1,1]]]");
    }

    #[test]
    fn list_options_repeat_the_parameter() {
        let mut options = QueryOptions::new();
        options.insert("data".to_string(), json!(["temperature", "salinity"]));

        let params = encode_params(&options);
        assert_eq!(
            params,
            vec![
                ("data".to_string(), "temperature".to_string()),
                ("data".to_string(), "salinity".to_string()),
            ]
        );
    }

    #[test]
    fn scalar_options_encode_bare() {
        let mut options = QueryOptions::new();
        options.insert("platform".to_string(), json!("4902911"));
        options.insert("presRange".to_string(), json!(50));

        let params = encode_params(&options);
        assert_eq!(
            params,
            vec![
                ("platform".to_string(), "4902911".to_string()),
                ("presRange".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn non_string_dates_are_rejected() {
        assert!(matches!(
            time_option(&json!(17)),
            Err(Error::InvalidTime(_))
        ));
        assert!(time_option(&json!("2023-01-01T00:00:00Z")).is_ok());
    }
}
