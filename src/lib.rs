pub mod config;
pub mod error;
pub mod games;
pub mod global;
pub mod igdb;
pub mod mutex;
pub mod platforms;
pub mod ratelimit;
pub mod report;
pub mod util;

#[cfg(test)]
mod testing;
