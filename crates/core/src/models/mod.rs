pub mod aggregate;
pub mod holding;
pub mod loan;
pub mod net_worth;
pub mod query;
pub mod quote;
pub mod settings;
pub mod summary;
pub mod table;
pub mod trend;
