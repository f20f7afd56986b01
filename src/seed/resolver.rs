use std::time::Duration;

use serde::Deserialize;

use crate::foundation::error::FractimeResult;

/// Hard timeout for the time-source call. A slow upstream degrades to the
/// fallback constants instead of stalling the pipeline.
const SEED_TIMEOUT: Duration = Duration::from_secs(15);

/// Local-time observation for a location, as reported by the time source.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LocalTime {
    /// Local calendar date, e.g. `2024-01-01`.
    pub date: String,
    /// Local wall-clock time, e.g. `00:00:00`.
    pub time: String,
}

/// Fetches a local-time seed for a (region, city) pair.
///
/// Pure I/O with graceful degradation: any failure (timeout, non-2xx,
/// malformed body) yields `None` and the caller falls back to fixed fractal
/// constants. No retries; a miss only costs visual variety, never
/// availability.
#[derive(Clone, Debug)]
pub struct SeedResolver {
    client: reqwest::Client,
    base_url: String,
}

impl SeedResolver {
    /// Build a resolver against a time-source base URL.
    ///
    /// The request URL is `<base><region>%2F<city>` and must answer JSON
    /// `{date, time}`.
    pub fn new(base_url: impl Into<String>) -> FractimeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEED_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("build http client: {e}"))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Resolve the current local time for a location, or `None` on any
    /// failure. Never errors to the caller.
    pub async fn resolve(&self, region: &str, city: &str) -> Option<LocalTime> {
        let url = self.seed_url(region, city);
        match self.fetch(&url).await {
            Ok(t) => {
                tracing::debug!(%region, %city, date = %t.date, time = %t.time, "seed resolved");
                Some(t)
            }
            Err(e) => {
                tracing::warn!(%region, %city, error = %e, "time source unavailable, using fallback");
                None
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<LocalTime, reqwest::Error> {
        let res = self.client.get(url).send().await?.error_for_status()?;
        res.json::<LocalTime>().await
    }

    fn seed_url(&self, region: &str, city: &str) -> String {
        // The upstream route takes an IANA zone, percent-encoded as one path
        // segment: <base>Australia%2FBrisbane.
        format!("{}{}%2F{}", self.base_url, region, city)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/seed/resolver.rs"]
mod tests;
