#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use anyhow::Context;
use log_error::LogError;
use once_cell::sync::Lazy;

pub mod category;
pub mod control;
pub mod csv;
pub mod image;
pub mod normalize;
pub mod parser;
pub mod product;
pub mod product_import;
pub mod store;
pub mod xlsx;

#[cfg(test)]
pub(crate) mod testing;

pub static SELF_ADDR: Lazy<String> = Lazy::new(|| {
    envmnt::get_parse("SELF_ADDR")
        .context("SELF_ADDR not set")
        .log_error("Unable to get SELF_ADDR, binding to all interfaces")
        .unwrap_or("0.0.0.0".to_string())
});

pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x600.jpg";

pub fn format_duration(duration: &std::time::Duration) -> String {
    let minutes = duration.as_secs() / 60;
    let seconds = duration.as_secs() % 60;
    let millis = duration.subsec_millis();
    match (minutes, seconds) {
        (0, 0) => format!("{millis}ms"),
        (0, s) => format!("{s}.{:03}s", millis),
        (m, s) => format!("{m}m {s}s"),
    }
}
