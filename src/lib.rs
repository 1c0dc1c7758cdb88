//! # Avales
//!
//! Activity planning and approval-request ("aval") workflow for the CAEDUC
//! committee. External parties submit avales; committee admins approve or
//! reject them, plan activities whose task checklists fan out to the role
//! holders, and generate payment and supplies letters.
//!
//! The pure core lives in [`expansion`] and [`lifecycle`]; [`storage`] is a
//! JSON-file store and [`commands`] wires both behind the CLI and the TUI.

pub mod auth;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod documents;
pub mod error;
pub mod expansion;
pub mod lifecycle;
pub mod models;
pub mod storage;
pub mod tui;
