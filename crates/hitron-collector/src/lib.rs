// hitron-collector: scrape coordination and metric mapping
//
// Sits between the device client (`hitron-api`) and whatever serves the
// metrics: one `Collector::scrape()` call produces one self-contained
// `prometheus::Registry` for that pull.

pub mod collector;
pub mod metrics;
pub mod parse;

pub use collector::Collector;
pub use metrics::ScrapeMetrics;
