//! Incremental sync: find releases newer than the checkpoint, translate
//! their notes, and prepend them to the notes document.

use anyhow::{Context, Result};

use crate::checkpoint::CheckpointStore;
use crate::feed::ReleaseFeed;
use crate::notes::NotesDocument;
use crate::translate::Translator;

/// Walks the feed newest-first, page by page, and returns every tag strictly
/// newer than `checkpoint` in oldest-to-newest order. The checkpoint itself
/// is excluded. With no checkpoint the walk only stops at the first empty
/// page, i.e. the full history is returned.
pub fn discover_new_releases(
    feed: &dyn ReleaseFeed,
    checkpoint: Option<&str>,
) -> Result<Vec<String>> {
    let mut new_tags = Vec::new();
    let mut page = 1u32;
    'pages: loop {
        let releases = feed.page(page)?;
        if releases.is_empty() {
            break;
        }
        for release in releases {
            if Some(release.tag_name.as_str()) == checkpoint {
                break 'pages;
            }
            new_tags.push(release.tag_name);
        }
        page += 1;
    }
    new_tags.reverse();
    Ok(new_tags)
}

/// What a completed run did.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Tags fetched, translated and written this run, oldest first.
    pub processed: Vec<String>,
    /// Tags discovered but already present in the notes document
    /// (left over from an earlier partially-failed run).
    pub skipped: Vec<String>,
}

pub struct SyncEngine<'a> {
    pub feed: &'a dyn ReleaseFeed,
    pub translator: &'a dyn Translator,
    pub checkpoint: &'a CheckpointStore,
    pub notes: &'a NotesDocument,
}

impl SyncEngine<'_> {
    /// One full sync pass. Any failure aborts the run and leaves the
    /// checkpoint at its pre-run value; the checkpoint only advances to the
    /// newest discovered tag after every tag has been handled.
    pub fn run(&self) -> Result<SyncOutcome> {
        let saved_tag = self.checkpoint.load()?;
        let new_tags = discover_new_releases(self.feed, saved_tag.as_deref())?;

        let mut outcome = SyncOutcome::default();
        for tag in &new_tags {
            if self.notes.contains(tag)? {
                outcome.skipped.push(tag.clone());
                continue;
            }
            println!("New release: {}", tag);
            self.write_release_notes(tag)
                .with_context(|| format!("process release {}", tag))?;
            outcome.processed.push(tag.clone());
        }

        if let Some(latest) = new_tags.last() {
            self.checkpoint.save(latest)?;
        }
        Ok(outcome)
    }

    fn write_release_notes(&self, tag: &str) -> Result<()> {
        let release = self.feed.by_tag(tag)?;
        let body = match release.body.as_deref() {
            // GitHub reports releases without notes as a null body; there
            // is nothing to translate.
            None | Some("") => String::new(),
            Some(body) => self.translator.translate(body)?,
        };
        self.notes.prepend(tag, &body)
    }
}
