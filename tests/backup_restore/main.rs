//! Backup and restore through the public facade, against real SQLite files
//!
//! These tests verify that:
//! 1. A full backup restores into an empty database with identical rows
//! 2. Structure and data can be restored in separate runs
//! 3. Every layout produces a snapshot the restore path can replay
//! 4. Versions are chosen newest-first unless pinned
//! 5. JSON configuration drives the same runs as the builders

#[path = "../common/mod.rs"]
mod common;

mod config;
mod end_to_end;
mod layouts;
mod versions;
