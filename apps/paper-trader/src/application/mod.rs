//! Application layer: facades over the driven ports.

pub mod ports;
pub mod services;
