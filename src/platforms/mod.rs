use std::sync::Arc;

use async_trait::async_trait;

use crate::global::Global;

pub mod googleplay;
pub mod steam;

/// What a platform says about one game once its raw payload is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformDetails {
    pub publisher: String,
    pub cloud_save: bool,
    pub install_size: u64,
}

/// A storefront whose games' cloud save support and install size can be queried.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Display name, also used in report column headers.
    fn name(&self) -> &'static str;

    /// IGDB platform id used to build the discovery filter.
    fn igdb_platform_id(&self) -> i64;

    /// IGDB website category that marks a link as this platform's store page.
    fn igdb_website_category(&self) -> i64;

    /// The platform's id for a game, if `url` is a store page this platform recognizes.
    fn extract_id(&self, url: &str) -> Option<String>;

    /// Raw payload for `id`, or `None` when the platform says the game does not exist
    /// or its retry policy gave up.
    async fn fetch_raw(&self, id: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Never fails; unrecognized payloads decode to `PlatformDetails::default()`.
    fn decode(&self, raw: &[u8]) -> PlatformDetails;
}

/// One adapter per platform, created once for the whole run.
pub fn all(global: &Arc<Global>) -> Vec<Arc<dyn Platform>> {
    vec![
        Arc::new(steam::Steam::new(
            global.http_client.clone(),
            &global.config.steam,
        )),
        Arc::new(googleplay::GooglePlay::new(&global.config.google_play)),
    ]
}
