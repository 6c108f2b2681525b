#![doc = "bricklink-backup-core: core pipeline library for bricklink-backup."]

//! This crate contains the transport-free logic of the backup tool: flattening
//! nested API records, joining category names onto inventories, and writing the
//! result to CSV or XML files.
//! Credential handling and HTTP live in the `bricklink-backup` CLI crate.
//!
//! # Usage
//! Implement [`contract::InventoryApi`] for a data source and hand it to
//! [`backup::backup`].

pub mod backup;
pub mod category;
pub mod contract;
pub mod csv_export;
pub mod error;
pub mod flatten;
pub mod output;
pub mod slugify;
pub mod xml_export;
