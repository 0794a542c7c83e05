//! # Vendor Sync Library
//!
//! This library provides the core functionality for vendoring external
//! content into destination directory trees with a reproducible lock
//! record. It is designed to be used by the `vendor-sync` command-line tool
//! but can also be integrated into other applications that need
//! reproducible content vendoring.
//!
//! ## Quick Example
//!
//! ```
//! use vendor_sync::config;
//!
//! let yaml = r#"
//! directories:
//!   - path: vendor
//!     contents:
//!       - path: widget
//!         git:
//!           url: https://github.com/acme/widget
//!           ref: v1.2.3
//!         include: ["src/**"]
//! "#;
//! let config = config::parse(yaml).unwrap();
//! config.validate().unwrap();
//! assert_eq!(config.directories[0].contents[0].path, "widget");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The schema for `.vendor-sync.yaml` -
//!   destination directories, their ordered content entries, and the
//!   mutually-exclusive source kinds (git, http, image, github-release,
//!   helm-chart, manual, directory).
//! - **Lock Records (`lock`)**: The resolved identity of everything a sync
//!   fetched (commit SHAs, digests, versions), serialized to
//!   `vendor-sync.lock.yaml` for reproducible re-fetching.
//! - **Sync Engine (`sync`)**: The staged, atomic assembly of a destination
//!   tree: staging area, source dispatch, per-entry syncers, path
//!   filtering, and the single-rename commit.
//!
//! ## Execution Flow
//!
//! For each configured directory, `sync::DirectorySync`:
//!
//! 1.  Validates every content entry before touching the filesystem.
//! 2.  Creates the ephemeral staging area next to the destination.
//! 3.  For each entry, in order: dispatches to the source kind's syncer,
//!     fetches into the staging tree, applies include/exclude filters, and
//!     appends the lock entry.
//! 4.  Commits the fully-assembled tree with one atomic rename.
//! 5.  Removes the staging area on every exit path, success or failure.
//!
//! External readers of the destination only ever observe the complete
//! pre-sync or the complete post-sync tree.

pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod path;
pub mod sync;
