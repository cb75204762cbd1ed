use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use futures_util::future::join_all;

use crate::error::CatalogError;
use crate::games::{EnrichedGame, PlatformListing};
use crate::global::Global;
use crate::igdb;
use crate::platforms::Platform;
use crate::util::pairs;

pub mod matching;

/// One game present with cloud saves on at least two platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub game: String,
    /// One entry per platform, in platform order.
    pub listings: Vec<Option<PlatformListing>>,
    /// One entry per platform pair, `None` unless both sides resolved.
    pub publisher_matches: Vec<Option<bool>>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub header: Vec<String>,
    pub rows: Vec<ReportRow>,
}

/// Discovers candidates, asks every platform about every game, and keeps the
/// games that still resolve on two or more platforms.
#[tracing::instrument(skip_all)]
pub async fn generate(
    global: &Arc<Global>,
    platforms: &[Arc<dyn Platform>],
) -> Result<Report, CatalogError> {
    let games = igdb::list_games(global, platforms).await?;
    tracing::info!(count = games.len(), "discovered candidate games");

    let enriched = join_all(games.iter().map(|game| game.enrich())).await;

    let rows = build_rows(platforms, enriched);
    tracing::info!(rows = rows.len(), "assembled report");

    Ok(Report {
        header: header(platforms),
        rows,
    })
}

/// `Game`, then publisher / install size / ID per platform, then one match
/// column per platform pair.
pub fn header(platforms: &[Arc<dyn Platform>]) -> Vec<String> {
    let mut header = vec!["Game".to_string()];

    for platform in platforms {
        let name = platform.name();
        header.push(format!("{} publisher", name));
        header.push(format!("{} install size", name));
        header.push(format!("{} ID", name));
    }

    for (a, b) in pairs(platforms) {
        header.push(format!("{} / {} publisher match", a.name(), b.name()));
    }

    header
}

pub fn build_rows(platforms: &[Arc<dyn Platform>], games: Vec<EnrichedGame>) -> Vec<ReportRow> {
    games
        .into_iter()
        .filter(|game| game.resolved_count() > 1)
        .map(|game| {
            let publisher_matches = pairs(platforms)
                .into_iter()
                .map(|(a, b)| {
                    let a = game.listing(a.as_ref())?;
                    let b = game.listing(b.as_ref())?;
                    Some(matching::same_name(&a.publisher, &b.publisher))
                })
                .collect();

            let listings = platforms
                .iter()
                .map(|platform| game.listing(platform.as_ref()).cloned())
                .collect();

            ReportRow {
                game: game.name,
                listings,
                publisher_matches,
            }
        })
        .collect()
}

impl ReportRow {
    /// Cells in header order; unresolved platforms and pairs are left empty.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.game.clone()];

        for listing in &self.listings {
            match listing {
                Some(listing) => {
                    cells.push(listing.publisher.clone());
                    cells.push(listing.install_size.to_string());
                    cells.push(listing.id.clone());
                }
                None => cells.extend(std::iter::repeat(String::new()).take(3)),
            }
        }

        cells.extend(
            self.publisher_matches
                .iter()
                .map(|matched| matched.map(|m| m.to_string()).unwrap_or_default()),
        );

        cells
    }
}

impl Report {
    pub fn write_to<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row.cells())?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;

        self.write_to(file)
            .with_context(|| format!("writing report file {}", path.display()))
    }
}
