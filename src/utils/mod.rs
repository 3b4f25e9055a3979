//! Shared utilities
//!
//! This module provides the file system helpers the rest of the crate builds
//! on: atomic writes, JSON and TOML (de)serialization wrappers, checksums,
//! backups, and symlink creation.
//!
//! # Example
//!
//! ```rust,no_run
//! use aicfg_cli::utils::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("output/commands"))?;
//! atomic_write(Path::new("output/settings.json"), b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;

pub use fs::{
    atomic_write, backup_file, calculate_checksum, create_symlink, ensure_dir,
    ensure_parent_dir, read_json_file, read_text_file, read_toml_file, safe_write,
    write_json_file, write_text_file, write_toml_file,
};
