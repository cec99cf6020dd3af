//! Infrastructure layer: vendor adapters, file export, and wiring.

pub mod alpaca;
pub mod anthropic;
pub mod container;
pub mod export;
