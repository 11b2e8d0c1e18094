pub mod data_source;
pub mod deposit_summary;
pub mod derivation;
pub mod metal_summary;
pub mod net_worth;
pub mod quote_service;
pub mod reconciler;
pub mod staleness;
