//! The cumulative notes document: newest release at the top, older content
//! untouched below.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::checkpoint::write_atomic;

pub struct NotesDocument {
    path: PathBuf,
}

pub fn render_block(tag: &str, body: &str) -> String {
    format!("# Release {}\n\n{}\n\n", tag, body)
}

impl NotesDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a rendered block before all existing content. Existing bytes
    /// are carried over unmodified; the replacement is atomic so a failure
    /// mid-write cannot truncate the document.
    pub fn prepend(&self, tag: &str, body: &str) -> Result<()> {
        let mut contents = render_block(tag, body);
        if self.path.exists() {
            let existing = fs::read_to_string(&self.path)
                .with_context(|| format!("read notes document {}", self.path.display()))?;
            contents.push_str(&existing);
        }
        write_atomic(&self.path, contents.as_bytes()).context("write notes document")
    }

    /// True if a block for `tag` is already present. Used to keep reruns
    /// after a partial failure from appending the same release twice.
    pub fn contains(&self, tag: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let existing = fs::read_to_string(&self.path)
            .with_context(|| format!("read notes document {}", self.path.display()))?;
        let heading = format!("# Release {}", tag);
        Ok(existing.lines().any(|line| line == heading))
    }
}
