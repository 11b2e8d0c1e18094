pub mod registry;
pub mod traits;

// API provider implementations
pub mod coingecko;
pub mod metals_dev;
