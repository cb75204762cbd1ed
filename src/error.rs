/// Failures that abort the whole run.
///
/// Discovery is all-or-nothing: a truncated candidate list would silently
/// under-report cross-platform games, so none of these are retried or
/// downgraded to partial results.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog authentication failed: {0}")]
    Auth(#[source] reqwest::Error),
    #[error("catalog query at offset {offset} failed: {source}")]
    Query {
        offset: usize,
        #[source]
        source: reqwest::Error,
    },
    #[error("catalog response at offset {offset} could not be decoded: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: reqwest::Error,
    },
}
