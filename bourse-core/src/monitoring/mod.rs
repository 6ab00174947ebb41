//! Venue monitoring

pub mod metrics;

pub use metrics::VenueMetrics;
