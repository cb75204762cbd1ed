use async_trait::async_trait;
use reqwest::Url;
use tokio::process::Command;

use super::{Platform, PlatformDetails};
use crate::config::GooglePlayConfig;
use crate::mutex::RequestGate;
use crate::ratelimit::AttemptBudget;


pub const IGDB_PLATFORM_ID: i64 = 34;
pub const IGDB_WEBSITE_CATEGORY: i64 = 12;

const STORE_HOST: &str = "play.google.com";
const LEGACY_HOST: &str = "market.android.com";

const HELPER_ATTEMPTS: u32 = 3;
const ITEM_NOT_FOUND: &[u8] = b"Connection error: Item not found.\n";

const CREATOR_LABEL: &[u8] = b"\n  creator: \"";
const SIZE_LABEL: &[u8] = b"\n        totalApkSize: ";
const SAVED_GAMES_MARKER: &[u8] = b"\n        1: \"Saved Games\"";

/// Google Play, queried through the Raccoon command-line client.
pub struct GooglePlay {
    program: String,
    args: Vec<String>,
    gate: RequestGate,
}

impl GooglePlay {
    pub fn new(config: &GooglePlayConfig) -> Self {
        Self::with_command(
            config.java_path.clone(),
            vec!["-jar".into(), config.raccoon_path.clone()],
        )
    }

    /// Runs `program args.. --gpa-details <id>` for each lookup.
    pub fn with_command(program: String, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            gate: RequestGate::new("google_play"),
        }
    }

    async fn run_helper(&self, id: &str) -> Option<Vec<u8>> {
        tracing::info!(id, "getting data");

        let mut budget = AttemptBudget::new(HELPER_ATTEMPTS);
        while budget.next_attempt().is_some() {
            let output = Command::new(&self.program)
                .args(&self.args)
                .arg("--gpa-details")
                .arg(id)
                .kill_on_drop(true)
                .output()
                .await;

            match output {
                Ok(output) if !output.stdout.is_empty() => return Some(output.stdout),
                Ok(output) if output.stderr == ITEM_NOT_FOUND => {
                    tracing::info!(id, "not found on google play");
                    return None;
                }
                Ok(output) if !output.stderr.is_empty() => {
                    tracing::warn!(
                        id,
                        error = %String::from_utf8_lossy(&output.stderr).trim(),
                        tries_remaining = budget.remaining(),
                        "raccoon error"
                    );
                }
                Ok(_) => {
                    tracing::warn!(id, tries_remaining = budget.remaining(), "raccoon gave no output");
                }
                Err(e) => {
                    tracing::warn!(
                        id,
                        error = %e,
                        tries_remaining = budget.remaining(),
                        "failed to run raccoon"
                    );
                }
            }
        }

        tracing::warn!(id, attempts = HELPER_ATTEMPTS, "giving up on raccoon lookup");
        None
    }
}

#[async_trait]
impl Platform for GooglePlay {
    fn name(&self) -> &'static str {
        "Google Play"
    }

    fn igdb_platform_id(&self) -> i64 {
        IGDB_PLATFORM_ID
    }

    fn igdb_website_category(&self) -> i64 {
        IGDB_WEBSITE_CATEGORY
    }

    fn extract_id(&self, url: &str) -> Option<String> {
        extract_package_id(url)
    }

    #[tracing::instrument(name = "google_play", skip(self))]
    async fn fetch_raw(&self, id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.gate.acquire(|| self.run_helper(id)).await)
    }

    fn decode(&self, raw: &[u8]) -> PlatformDetails {
        decode_details(raw)
    }
}

/// `https://play.google.com/store/apps/details?id=com.example.game` -> `com.example.game`
pub fn extract_package_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    match parsed.host_str()? {
        STORE_HOST => {}
        LEGACY_HOST => {
            tracing::warn!(
                url,
                "found a market.android.com URL from IGDB, consider updating it to a play.google.com URL"
            );
        }
        _ => return None,
    }

    parsed
        .query_pairs()
        .find(|(key, value)| *key == "id" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Reads the creator, saved games marker and total APK size out of Raccoon's
/// `--gpa-details` text dump.
pub fn decode_details(raw: &[u8]) -> PlatformDetails {
    let publisher = find_bytes(raw, CREATOR_LABEL, 0)
        .map(|label| label + CREATOR_LABEL.len())
        .map(|start| {
            let end = find_bytes(raw, b"\"", start).unwrap_or(raw.len());
            String::from_utf8_lossy(&raw[start..end]).into_owned()
        })
        .unwrap_or_default();

    let install_size = find_bytes(raw, SIZE_LABEL, 0)
        .map(|label| label + SIZE_LABEL.len())
        .and_then(|start| {
            let end = find_bytes(raw, b"\n", start).unwrap_or(raw.len());
            std::str::from_utf8(&raw[start..end]).ok()?.trim().parse().ok()
        })
        .unwrap_or(0);

    PlatformDetails {
        publisher,
        cloud_save: find_bytes(raw, SAVED_GAMES_MARKER, 0).is_some(),
        install_size,
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}
