//! Reconciles scraped IPTV channels with a Tvheadend configuration folder.

pub mod config;
pub mod configuration;
pub mod input;
pub mod store;
pub mod sync;
pub mod tvh;
