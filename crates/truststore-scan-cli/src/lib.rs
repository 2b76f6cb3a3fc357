//! # truststore-scan-cli
//!
//! Command-line front end for the `truststore-scan` engine.
//!
//! ## Features
//!
//! - **Host scan**: native stores, runtime CA bundle, process trust stores, keystore files
//! - **Inspect**: certificates, trust anchors and keys of a single store
//! - **Convert**: any readable store to PKCS#12
//! - **CRL check**: find the store entry that issued and signed a CRL
//! - **Output formats**: colored text or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
