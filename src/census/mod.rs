pub mod types;
pub mod errors; // reexports da API de erro
pub mod guardrails;
pub mod sources;
pub mod oracle;
pub mod dust;
pub mod config;
pub mod price_view;
pub mod aggregator;
pub mod consistency;
pub mod memory;
pub mod ref_exact;

pub mod error_catalog;
pub mod error;
pub mod error_map;
