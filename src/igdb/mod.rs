use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::games::{CandidateGame, PlatformGameRef};
use crate::global::Global;
use crate::platforms::Platform;
use crate::util::pairs;


pub const PAGE_SIZE: usize = 500;

/// IGDB game category for main games (no DLC, expansions, bundles...).
const MAIN_GAME_CATEGORY: i64 = 0;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct IgdbGame {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub websites: Option<Vec<Website>>,
}

#[derive(Debug, Deserialize)]
pub struct Website {
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub url: String,
}

/// Lists every main game IGDB knows on at least two of `platforms`, keeping the
/// ones whose store links resolve to at least two platform ids.
#[tracing::instrument(skip_all)]
pub async fn list_games(
    global: &Arc<Global>,
    platforms: &[Arc<dyn Platform>],
) -> Result<Vec<CandidateGame>, CatalogError> {
    let mut by_category: HashMap<i64, Arc<dyn Platform>> = HashMap::new();
    let mut platform_ids = BTreeSet::new();
    for platform in platforms {
        by_category.insert(platform.igdb_website_category(), platform.clone());
        platform_ids.insert(platform.igdb_platform_id());
    }

    let Some(filter) = platform_filter(&platform_ids) else {
        tracing::warn!("fewer than two distinct IGDB platforms, nothing to compare");
        return Ok(Vec::new());
    };

    let token = authenticate(global).await?;

    let mut games = Vec::new();
    let mut offset = 0;
    loop {
        let page = query_page(global, &token, &filter, offset).await?;
        let page_len = page.len();

        games.extend(
            page.into_iter()
                .filter_map(|game| candidate_from(game, &by_category)),
        );

        tracing::info!(offset, page_len, candidates = games.len(), "fetched IGDB page");

        if page_len < PAGE_SIZE {
            break;
        }
        offset += PAGE_SIZE;
    }

    Ok(games)
}

async fn authenticate(global: &Arc<Global>) -> Result<String, CatalogError> {
    let config = &global.config.igdb;

    let resp = global
        .http_client
        .post(&config.auth_url)
        .query(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ])
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(CatalogError::Auth)?
        .json::<TokenResponse>()
        .await
        .map_err(CatalogError::Auth)?;

    Ok(resp.access_token)
}

async fn query_page(
    global: &Arc<Global>,
    token: &str,
    filter: &str,
    offset: usize,
) -> Result<Vec<IgdbGame>, CatalogError> {
    let query = games_query(filter, offset);
    tracing::debug!(query = %query, "querying IGDB");

    global
        .http_client
        .post(&global.config.igdb.api_url)
        .header("Client-ID", &global.config.igdb.client_id)
        .bearer_auth(token)
        .body(query)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|source| CatalogError::Query { offset, source })?
        .json::<Vec<IgdbGame>>()
        .await
        .map_err(|source| CatalogError::Decode { offset, source })
}

/// `platforms = [6, 34] | platforms = [6, 48] | ...`
///
/// IGDB's containment test takes a fixed list, so each pair of platforms gets
/// its own clause. `None` when there is no pair to compare.
pub fn platform_filter(platform_ids: &BTreeSet<i64>) -> Option<String> {
    let ids: Vec<i64> = platform_ids.iter().copied().collect();
    let clauses: Vec<String> = pairs(&ids)
        .into_iter()
        .map(|(a, b)| format!("platforms = [{}, {}]", a, b))
        .collect();

    if clauses.is_empty() {
        return None;
    }
    Some(clauses.join(" | "))
}

pub fn games_query(filter: &str, offset: usize) -> String {
    format!(
        "fields name, websites.category, websites.url; where ({}) & category = {}; limit {}; offset {};",
        filter, MAIN_GAME_CATEGORY, PAGE_SIZE, offset
    )
}

/// Resolves a game's store links. Two links to the same platform both count.
pub fn candidate_from(
    game: IgdbGame,
    by_category: &HashMap<i64, Arc<dyn Platform>>,
) -> Option<CandidateGame> {
    let websites = game.websites?;

    let refs: Vec<PlatformGameRef> = websites
        .iter()
        .filter_map(|website| {
            let platform = by_category.get(&website.category?)?;
            let id = platform.extract_id(&website.url)?;
            Some(PlatformGameRef::new(platform.clone(), id))
        })
        .collect();

    CandidateGame::new(game.name, refs)
}
