use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Deserializer};

use super::{Platform, PlatformDetails};
use crate::config::SteamConfig;
use crate::mutex::RequestGate;
use crate::ratelimit::RateLimitBackoff;


pub const IGDB_PLATFORM_ID: i64 = 6;
pub const IGDB_WEBSITE_CATEGORY: i64 = 13;

const STORE_HOSTS: &[&str] = &["store.steampowered.com", "steamcommunity.com"];
const LEGACY_HOSTS: &[&str] = &["steampowered.com", "www.steampowered.com"];

/// Cloud saves category.
const CATEGORY_CLOUD: i64 = 23;
/// Cloud saves disclaimer; overrides `CATEGORY_CLOUD`.
const CATEGORY_CLOUD_DISCLAIMER: i64 = 35;

/// Labels Steam has used in the minimum requirements text, tried in this order.
const STORAGE_LABELS: &[&str] = &[
    "<strong>Storage:</strong> ",
    "<strong>Hard Drive:</strong> ",
    "<strong>Hard Disk Space:</strong> ",
];

#[derive(Debug, Deserialize)]
struct AppDetailsEntry {
    #[serde(default)]
    data: Option<AppDetails>,
}

#[derive(Debug, Deserialize, Default)]
struct AppDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    steam_appid: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    publishers: Vec<String>,
    /// An object with `minimum`, or `[]` when the store has nothing.
    #[serde(default)]
    pc_requirements: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(default, deserialize_with = "null_as_default")]
    id: i64,
}

/// The store sends `null` for some fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Steam Store `appdetails` API.
pub struct Steam {
    http_client: reqwest::Client,
    store_api_url: String,
    cooldown: Duration,
    backoff_base: Duration,
    gate: RequestGate,
}

impl Steam {
    pub fn new(http_client: reqwest::Client, config: &SteamConfig) -> Self {
        Self {
            http_client,
            store_api_url: config.store_api_url.clone(),
            cooldown: Duration::from_millis(config.cooldown_ms),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            gate: RequestGate::new("steam"),
        }
    }

    async fn request_details(&self, id: &str) -> anyhow::Result<Vec<u8>> {
        tokio::time::sleep(self.cooldown).await;
        tracing::info!(id, "getting data");

        let mut backoff = RateLimitBackoff::new(self.backoff_base);
        loop {
            let resp = self
                .http_client
                .get(&self.store_api_url)
                .query(&[("appids", id)])
                .send()
                .await
                .context("steam store request")?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = backoff.next_wait();
                tracing::warn!(
                    id,
                    wait_secs = wait.as_secs_f64(),
                    "rate limited by steam store api, waiting before trying again"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let body = resp.bytes().await.context("steam store response body")?;
            return Ok(body.to_vec());
        }
    }
}

#[async_trait]
impl Platform for Steam {
    fn name(&self) -> &'static str {
        "Steam"
    }

    fn igdb_platform_id(&self) -> i64 {
        IGDB_PLATFORM_ID
    }

    fn igdb_website_category(&self) -> i64 {
        IGDB_WEBSITE_CATEGORY
    }

    fn extract_id(&self, url: &str) -> Option<String> {
        extract_app_id(url)
    }

    #[tracing::instrument(name = "steam", skip(self))]
    async fn fetch_raw(&self, id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.gate
            .acquire(|| async { self.request_details(id).await.map(Some) })
            .await
    }

    fn decode(&self, raw: &[u8]) -> PlatformDetails {
        decode_app_details(raw)
    }
}

/// `https://store.steampowered.com/app/570/Dota_2/` -> `570`
pub fn extract_app_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    if LEGACY_HOSTS.contains(&host) {
        tracing::warn!(
            url,
            "found a legacy steampowered.com URL from IGDB, consider updating it to store.steampowered.com"
        );
    } else if !STORE_HOSTS.contains(&host) {
        return None;
    }

    parsed
        .path_segments()?
        .find(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_owned)
}

pub fn decode_app_details(raw: &[u8]) -> PlatformDetails {
    let entries: HashMap<String, AppDetailsEntry> = match serde_json::from_slice(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable steam app details");
            return PlatformDetails::default();
        }
    };

    let Some(details) = entries.into_values().next().and_then(|entry| entry.data) else {
        return PlatformDetails::default();
    };

    let category_ids: Vec<i64> = details.categories.iter().map(|c| c.id).collect();
    let cloud_save = category_ids.contains(&CATEGORY_CLOUD)
        && !category_ids.contains(&CATEGORY_CLOUD_DISCLAIMER);

    if details.publishers.len() > 1 {
        tracing::warn!(
            game = %details.name,
            app_id = details.steam_appid,
            publishers = %details.publishers.join(", "),
            "multiple publishers found, only returning the first one"
        );
    }

    let install_size = details
        .pc_requirements
        .get("minimum")
        .and_then(|minimum| minimum.as_str())
        .map(parse_install_size)
        .unwrap_or(0);

    PlatformDetails {
        publisher: details.publishers.into_iter().next().unwrap_or_default(),
        cloud_save,
        install_size,
    }
}

/// Install size in bytes from the minimum requirements text, or 0.
///
/// `<strong>Storage:</strong> 1.5 GB available space` -> `1500000000`
pub fn parse_install_size(requirements: &str) -> u64 {
    let Some(rest) = STORAGE_LABELS
        .iter()
        .find_map(|label| requirements.find(label).map(|i| &requirements[i + label.len()..]))
    else {
        return 0;
    };

    let compact = rest
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '+')
        .collect::<String>()
        .to_lowercase();

    let Some(b) = compact.find('b') else {
        return 0;
    };
    let amount = &compact[..=b];

    let (number, zeros) = if let Some(number) = amount.strip_suffix("gb") {
        (number, 9)
    } else if let Some(number) = amount.strip_suffix("mb") {
        (number, 6)
    } else {
        return 0;
    };

    scale_decimal(number, zeros).unwrap_or(0)
}

/// Shifts the decimal point of `number` right by `zeros` places, truncating
/// whatever is left of the fraction.
fn scale_decimal(number: &str, zeros: usize) -> Option<u64> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits = String::with_capacity(whole.len() + zeros);
    digits.push_str(whole);
    digits.extend(fraction.chars().chain(std::iter::repeat('0')).take(zeros));

    digits.parse().ok()
}
