use std::sync::Arc;

use crate::config::{GooglePlayConfig, IgdbConfig, LoggingConfig, ReportConfig, Settings, SteamConfig};
use crate::global::Global;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Settings pointing every external service at `base_url`, with no waiting.
pub fn settings(base_url: &str) -> Settings {
    Settings {
        igdb: IgdbConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            auth_url: format!("{}/oauth2/token", base_url),
            api_url: format!("{}/v4/games/", base_url),
        },
        steam: SteamConfig {
            store_api_url: format!("{}/api/appdetails", base_url),
            cooldown_ms: 0,
            backoff_base_ms: 1,
        },
        google_play: GooglePlayConfig {
            raccoon_path: "raccoon.jar".into(),
            java_path: "java".into(),
        },
        logging: LoggingConfig::default(),
        report: ReportConfig::default(),
        user_agent: "cloudsave-report-tests".into(),
    }
}

pub fn global(base_url: &str) -> Arc<Global> {
    Global::init(settings(base_url)).unwrap()
}
