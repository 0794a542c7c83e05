//! # Directory Orchestrator
//!
//! Drives one directory through the full sync pipeline. For each content
//! entry, in configuration order: dispatch to the matching syncer, fetch
//! into the staging tree, apply the entry's path filter, append the lock
//! entry. Once every entry has succeeded, the staging tree is committed to
//! the destination with a single rename.
//!
//! Failure at any entry aborts immediately: the commit is skipped, no
//! partial lock record is returned, and the staging root is removed by the
//! [`StagingArea`] guard. Everything that can fail without touching the
//! filesystem (source-kind selection, filter compilation, path validity) is
//! checked for all entries before the staging root is even created.

use std::path::Path;

use crate::config;
use crate::error::{Error, Result};
use crate::lock::{LockContents, LockDirectory};
use crate::sync::filter::FileFilter;
use crate::sync::staging::StagingArea;
use crate::sync::{syncer_for, SyncOpts, Syncer};

/// Orchestrator for syncing one configured directory
pub struct DirectorySync<'a> {
    opts: &'a config::Directory,
    sync_opts: &'a SyncOpts,
}

impl<'a> DirectorySync<'a> {
    pub fn new(opts: &'a config::Directory, sync_opts: &'a SyncOpts) -> Self {
        Self { opts, sync_opts }
    }

    /// Run the sync and return the directory's lock record.
    pub fn sync(&self) -> Result<LockDirectory> {
        let destination = Path::new(&self.opts.path);

        // Validate every entry up front: a configuration error anywhere in
        // the directory aborts before any filesystem mutation.
        self.opts.validate()?;
        let mut plan: Vec<(&config::Contents, FileFilter, Box<dyn Syncer + '_>)> = Vec::new();
        for contents in &self.opts.contents {
            let filter = FileFilter::from_contents(contents)?;
            let syncer = syncer_for(destination, contents, self.sync_opts)?;
            plan.push((contents, filter, syncer));
        }

        let staging = StagingArea::begin(destination)?;
        let mut lock = LockDirectory::new(&self.opts.path);

        for (contents, filter, syncer) in plan {
            let staged_dst = staging.stage_path_for(&contents.path)?;

            log::info!(
                "{} + {} ({})",
                self.opts.path,
                contents.path,
                syncer.desc()
            );

            let source = syncer
                .sync(&staged_dst, staging.incoming_dir())
                .map_err(|e| Error::syncing(&contents.path, e))?;

            filter
                .apply(&staged_dst)
                .map_err(|e| Error::filtering(&contents.path, e))?;

            // Appended only after both the fetch and the filter succeeded,
            // so the record stays aligned with the configured entries.
            lock.contents.push(LockContents {
                path: contents.path.clone(),
                source,
            });
        }

        staging.commit(destination)?;

        Ok(lock)
    }
}
