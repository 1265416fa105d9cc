//! Census de votação da governança SQUID.
//!
//! Poder de voto = saldo SQUID bruto + equivalente em SQUID das posições de LP nos
//! pools SQUID/ETH e SQUID/SQUILL, com piso de dust antes de qualquer cotação.

pub mod census;
pub mod obs;
pub mod telemetry;

pub use census::aggregator::{Census, VoterWeight, VotingBreakdown};
pub use census::config::CensusConfig;
pub use census::dust::DustGuard;
pub use census::errors::{CensusError, CensusErrorCode, Result};
pub use census::sources::{LpPool, PriceFeed, SourceError, SourceErrorKind, TokenLedger};
pub use census::types::{Address, Asset, PoolId, Wad, WAD};
