use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result, bail};

use relnotes::checkpoint::CheckpointStore;
use relnotes::feed::{Release, ReleaseFeed, ReleaseSummary};
use relnotes::notes::NotesDocument;
use relnotes::sync::SyncEngine;
use relnotes::translate::Translator;

struct FakeFeed {
    pages: Vec<Vec<&'static str>>,
    bodies: HashMap<&'static str, Option<&'static str>>,
    missing_tags: Vec<&'static str>,
    detail_fetches: RefCell<usize>,
}

impl FakeFeed {
    fn new(pages: Vec<Vec<&'static str>>) -> Self {
        Self {
            pages,
            bodies: HashMap::new(),
            missing_tags: Vec::new(),
            detail_fetches: RefCell::new(0),
        }
    }

    fn with_body(mut self, tag: &'static str, body: Option<&'static str>) -> Self {
        self.bodies.insert(tag, body);
        self
    }

    fn with_missing_tag(mut self, tag: &'static str) -> Self {
        self.missing_tags.push(tag);
        self
    }
}

impl ReleaseFeed for FakeFeed {
    fn page(&self, page: u32) -> Result<Vec<ReleaseSummary>> {
        let idx = (page - 1) as usize;
        let tags = self.pages.get(idx).cloned().unwrap_or_default();
        Ok(tags
            .into_iter()
            .map(|t| ReleaseSummary {
                tag_name: t.to_string(),
            })
            .collect())
    }

    fn by_tag(&self, tag: &str) -> Result<Release> {
        *self.detail_fetches.borrow_mut() += 1;
        if self.missing_tags.iter().any(|t| *t == tag) {
            bail!("get release by tag status: 404 Not Found");
        }
        let body = self
            .bodies
            .get(tag)
            .copied()
            .unwrap_or(Some("release notes"));
        Ok(Release {
            tag_name: tag.to_string(),
            body: body.map(|b| b.to_string()),
        })
    }
}

struct FakeTranslator {
    replacements: HashMap<&'static str, &'static str>,
    calls: RefCell<usize>,
}

impl FakeTranslator {
    fn new() -> Self {
        Self {
            replacements: HashMap::new(),
            calls: RefCell::new(0),
        }
    }

    fn with(mut self, from: &'static str, to: &'static str) -> Self {
        self.replacements.insert(from, to);
        self
    }
}

impl Translator for FakeTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        *self.calls.borrow_mut() += 1;
        match self.replacements.get(text) {
            Some(out) => Ok(out.to_string()),
            None => Ok(format!("translated({})", text)),
        }
    }
}

struct Harness {
    _tmp: tempfile::TempDir,
    checkpoint: CheckpointStore,
    notes: NotesDocument,
}

impl Harness {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir().context("create tempdir")?;
        let checkpoint = CheckpointStore::new(tmp.path().join("last_tag"));
        let notes = NotesDocument::new(tmp.path().join("NOTES.md"));
        Ok(Self {
            _tmp: tmp,
            checkpoint,
            notes,
        })
    }

    fn engine<'a>(&'a self, feed: &'a FakeFeed, translator: &'a FakeTranslator) -> SyncEngine<'a> {
        SyncEngine {
            feed,
            translator,
            checkpoint: &self.checkpoint,
            notes: &self.notes,
        }
    }

    fn notes_contents(&self) -> Result<String> {
        fs::read_to_string(self.notes.path()).context("read notes document")
    }
}

#[test]
fn first_run_syncs_full_history_newest_on_top() -> Result<()> {
    let h = Harness::new()?;
    let feed = FakeFeed::new(vec![vec!["v2", "v1"], vec![]])
        .with_body("v1", Some("one"))
        .with_body("v2", Some("two"));
    let translator = FakeTranslator::new();

    let outcome = h.engine(&feed, &translator).run()?;

    assert_eq!(outcome.processed, vec!["v1", "v2"]);
    assert!(outcome.skipped.is_empty());
    assert_eq!(h.checkpoint.load()?, Some("v2".to_string()));
    assert_eq!(
        h.notes_contents()?,
        "# Release v2\n\ntranslated(two)\n\n# Release v1\n\ntranslated(one)\n\n"
    );
    Ok(())
}

#[test]
fn new_release_is_prepended_above_existing_content() -> Result<()> {
    let h = Harness::new()?;
    fs::write(h.notes.path(), "# Release v1\n\nHello\n\n").context("seed notes")?;
    h.checkpoint.save("v1")?;

    let feed =
        FakeFeed::new(vec![vec!["v2", "v1"], vec![]]).with_body("v2", Some("Good morning"));
    let translator = FakeTranslator::new().with("Good morning", "Bonjour");

    let outcome = h.engine(&feed, &translator).run()?;

    assert_eq!(outcome.processed, vec!["v2"]);
    assert_eq!(h.checkpoint.load()?, Some("v2".to_string()));
    assert_eq!(
        h.notes_contents()?,
        "# Release v2\n\nBonjour\n\n# Release v1\n\nHello\n\n"
    );
    Ok(())
}

#[test]
fn run_with_nothing_new_touches_nothing() -> Result<()> {
    let h = Harness::new()?;
    let feed = FakeFeed::new(vec![vec!["v2", "v1"], vec![]]);
    let translator = FakeTranslator::new();

    h.engine(&feed, &translator).run()?;
    let after_first = h.notes_contents()?;
    assert_eq!(*feed.detail_fetches.borrow(), 2);

    let outcome = h.engine(&feed, &translator).run()?;

    assert!(outcome.processed.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(*feed.detail_fetches.borrow(), 2);
    assert_eq!(*translator.calls.borrow(), 2);
    assert_eq!(h.notes_contents()?, after_first);
    assert_eq!(h.checkpoint.load()?, Some("v2".to_string()));
    Ok(())
}

#[test]
fn detail_fetch_failure_aborts_and_leaves_checkpoint() -> Result<()> {
    let h = Harness::new()?;
    h.checkpoint.save("v1")?;

    let feed = FakeFeed::new(vec![vec!["v2", "v1"], vec![]]).with_missing_tag("v2");
    let translator = FakeTranslator::new();

    let err = h.engine(&feed, &translator).run().unwrap_err();
    assert!(err.to_string().contains("process release v2"));

    assert_eq!(h.checkpoint.load()?, Some("v1".to_string()));
    assert!(!h.notes.path().exists());
    assert_eq!(*translator.calls.borrow(), 0);
    Ok(())
}

#[test]
fn failure_mid_run_keeps_earlier_blocks_but_not_checkpoint() -> Result<()> {
    let h = Harness::new()?;
    h.checkpoint.save("v1")?;

    let feed = FakeFeed::new(vec![vec!["v3", "v2", "v1"], vec![]])
        .with_body("v2", Some("two"))
        .with_missing_tag("v3");
    let translator = FakeTranslator::new();

    assert!(h.engine(&feed, &translator).run().is_err());

    // v2 made it into the document, but the checkpoint did not move.
    assert_eq!(h.checkpoint.load()?, Some("v1".to_string()));
    assert_eq!(h.notes_contents()?, "# Release v2\n\ntranslated(two)\n\n");
    Ok(())
}

#[test]
fn rerun_after_partial_failure_does_not_duplicate_blocks() -> Result<()> {
    let h = Harness::new()?;
    h.checkpoint.save("v1")?;

    let failing = FakeFeed::new(vec![vec!["v3", "v2", "v1"], vec![]])
        .with_body("v2", Some("two"))
        .with_missing_tag("v3");
    let translator = FakeTranslator::new();
    assert!(h.engine(&failing, &translator).run().is_err());

    let healthy = FakeFeed::new(vec![vec!["v3", "v2", "v1"], vec![]])
        .with_body("v2", Some("two"))
        .with_body("v3", Some("three"));

    let outcome = h.engine(&healthy, &translator).run()?;

    assert_eq!(outcome.skipped, vec!["v2"]);
    assert_eq!(outcome.processed, vec!["v3"]);
    assert_eq!(h.checkpoint.load()?, Some("v3".to_string()));
    assert_eq!(
        h.notes_contents()?,
        "# Release v3\n\ntranslated(three)\n\n# Release v2\n\ntranslated(two)\n\n"
    );
    Ok(())
}

#[test]
fn absent_body_is_recorded_without_calling_the_translator() -> Result<()> {
    let h = Harness::new()?;
    let feed = FakeFeed::new(vec![vec!["v1"], vec![]]).with_body("v1", None);
    let translator = FakeTranslator::new();

    let outcome = h.engine(&feed, &translator).run()?;

    assert_eq!(outcome.processed, vec!["v1"]);
    assert_eq!(*translator.calls.borrow(), 0);
    assert_eq!(h.notes_contents()?, "# Release v1\n\n\n\n");
    Ok(())
}
