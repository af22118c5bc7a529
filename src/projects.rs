//! Local project store.
//!
//! Reads a flat directory of plain-text project files, one project per
//! file. The filename stem is the project's identity, the first line of
//! the file is its summary, and the full body is its detail text.
//!
//! There is deliberately no caching: every operation re-lists the
//! directory, so adding or removing a file changes the corpus without a
//! restart.

use globset::{Glob, GlobSet, GlobSetBuilder};
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProjectsConfig;
use crate::error::{ToolError, ToolResult};
use crate::models::{ProjectRecord, ProjectSummary};

/// Handle on the on-disk project corpus.
pub struct ProjectStore {
    dir: PathBuf,
    include: GlobSet,
}

impl ProjectStore {
    pub fn new(config: &ProjectsConfig) -> anyhow::Result<Self> {
        Ok(Self {
            dir: config.dir.clone(),
            include: build_globset(&config.include_globs)?,
        })
    }

    /// All project names in sorted order.
    ///
    /// Sorting fixes the corpus iteration order, which makes the
    /// first-match semantics of [`detail`](Self::detail) deterministic
    /// for a given directory listing.
    pub fn list(&self) -> ToolResult<Vec<String>> {
        Ok(self.scan()?.into_iter().map(|(name, _)| name).collect())
    }

    /// Up to `n` distinct projects chosen uniformly at random from the
    /// corpus minus `exclude`.
    ///
    /// An empty corpus and a fully-excluded corpus are distinct
    /// conditions ([`ToolError::CorpusEmpty`] vs [`ToolError::Exhausted`]);
    /// callers must not conflate them.
    pub fn sample(&self, n: usize, exclude: &BTreeSet<String>) -> ToolResult<Vec<ProjectSummary>> {
        let entries = self.scan()?;
        if entries.is_empty() {
            return Err(ToolError::CorpusEmpty);
        }

        let available: Vec<&(String, PathBuf)> = entries
            .iter()
            .filter(|(name, _)| !exclude.contains(name))
            .collect();
        if available.is_empty() {
            return Err(ToolError::Exhausted);
        }

        let mut rng = rand::thread_rng();
        let chosen = available.choose_multiple(&mut rng, n.min(available.len()));

        let mut summaries = Vec::new();
        for (name, path) in chosen {
            let content = read_file(path)?;
            summaries.push(ProjectSummary {
                name: name.clone(),
                summary: first_line(&content),
            });
        }
        Ok(summaries)
    }

    /// Full record of the first project matching `query`.
    ///
    /// Matching is case- and separator-insensitive: both sides are
    /// normalized (lowercase, `-`/`_` to spaces) and match when either
    /// normalized string contains the other. The first match in sorted
    /// corpus order wins; there is no ranking by match quality, so a
    /// query shared by two project names resolves by name order.
    pub fn detail(&self, query: &str) -> ToolResult<ProjectRecord> {
        let query_norm = normalize(query);

        for (name, path) in self.scan()? {
            let name_norm = normalize(&name);
            if query_norm.contains(&name_norm) || name_norm.contains(&query_norm) {
                let content = read_file(&path)?;
                return Ok(ProjectRecord {
                    name,
                    summary: first_line(&content),
                    body: content,
                });
            }
        }

        Err(ToolError::NoMatch(query.to_string()))
    }

    /// List matching files as `(name, path)` pairs in sorted name order.
    fn scan(&self) -> ToolResult<Vec<(String, PathBuf)>> {
        if !self.dir.exists() {
            return Err(ToolError::CorpusMissing(self.dir.clone()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .flatten()
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !self.include.is_match(&file_name) {
                continue;
            }
            let name = entry
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or(file_name);
            entries.push((name, entry.path().to_path_buf()));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

/// Lowercase and fold `-`/`_` to spaces, for fuzzy name comparison.
pub fn normalize(name: &str) -> String {
    name.to_lowercase().replace(['-', '_'], " ")
}

fn first_line(content: &str) -> String {
    content.lines().next().unwrap_or("").trim().to_string()
}

fn read_file(path: &Path) -> ToolResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ToolError::Io(format!("{}: {}", path.display(), e)))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectsConfig;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &str)]) -> (TempDir, ProjectStore) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(tmp.path().join(name), content).unwrap();
        }
        let store = ProjectStore::new(&ProjectsConfig {
            dir: tmp.path().to_path_buf(),
            include_globs: vec!["*.txt".to_string()],
        })
        .unwrap();
        (tmp, store)
    }

    const CORPUS: &[(&str, &str)] = &[
        ("WoodStock.txt", "A festival lineup planner.\nBuilt with Rust and SQLite.\nHandles overlapping stage schedules."),
        ("akademika.txt", "A study-group matching platform.\nDjango backend."),
        ("beehive.txt", "Distributed task queue experiment.\nUses Redis streams."),
        ("stock-watcher.txt", "Price alert daemon.\nPolls market APIs."),
    ];

    #[test]
    fn normalize_folds_case_and_separators() {
        assert_eq!(normalize("Wood-Stock_2"), "wood stock 2");
        assert_eq!(normalize("WoodStock"), "woodstock");
    }

    #[test]
    fn list_is_sorted() {
        let (_tmp, store) = store_with(CORPUS);
        let names = store.list().unwrap();
        assert_eq!(names, vec!["WoodStock", "akademika", "beehive", "stock-watcher"]);
    }

    #[test]
    fn list_reflects_directory_changes() {
        let (tmp, store) = store_with(CORPUS);
        assert_eq!(store.list().unwrap().len(), 4);

        std::fs::write(tmp.path().join("new-one.txt"), "Fresh project.\n").unwrap();
        assert_eq!(store.list().unwrap().len(), 5);
    }

    #[test]
    fn include_globs_filter_extensions() {
        let (tmp, store) = store_with(CORPUS);
        std::fs::write(tmp.path().join("notes.md"), "not a project").unwrap();
        assert_eq!(store.list().unwrap().len(), 4);
    }

    #[test]
    fn sample_respects_exclusion() {
        let (_tmp, store) = store_with(CORPUS);
        let exclude: BTreeSet<String> =
            ["WoodStock".to_string(), "beehive".to_string()].into();

        let picked = store.sample(10, &exclude).unwrap();
        assert_eq!(picked.len(), 2); // min(n, corpus - excluded)
        for p in &picked {
            assert!(!exclude.contains(&p.name));
        }
    }

    #[test]
    fn sample_returns_exact_count() {
        let (_tmp, store) = store_with(CORPUS);
        let picked = store.sample(3, &BTreeSet::new()).unwrap();
        assert_eq!(picked.len(), 3);

        let names: BTreeSet<_> = picked.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names.len(), 3, "sampled projects must be distinct");
    }

    #[test]
    fn sample_summary_is_first_line() {
        let (_tmp, store) = store_with(&[("solo.txt", "Line one.\nLine two.")]);
        let picked = store.sample(1, &BTreeSet::new()).unwrap();
        assert_eq!(picked[0].summary, "Line one.");
    }

    #[test]
    fn sample_empty_corpus_is_distinct_condition() {
        let (_tmp, store) = store_with(&[]);
        let err = store.sample(3, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, ToolError::CorpusEmpty));
    }

    #[test]
    fn sample_fully_excluded_reports_exhaustion() {
        let (_tmp, store) = store_with(CORPUS);
        let exclude: BTreeSet<String> = store.list().unwrap().into_iter().collect();

        let err = store.sample(3, &exclude).unwrap_err();
        assert!(matches!(err, ToolError::Exhausted));
    }

    #[test]
    fn sample_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectStore::new(&ProjectsConfig {
            dir: tmp.path().join("does-not-exist"),
            include_globs: vec!["*.txt".to_string()],
        })
        .unwrap();
        let err = store.sample(3, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, ToolError::CorpusMissing(_)));
    }

    #[test]
    fn detail_is_case_and_separator_insensitive() {
        let (_tmp, store) = store_with(CORPUS);
        let record = store.detail("woodstock").unwrap();
        assert_eq!(record.name, "WoodStock");
        assert!(record.body.contains("overlapping stage schedules"));
    }

    #[test]
    fn detail_matches_inside_longer_utterance() {
        let (_tmp, store) = store_with(CORPUS);
        let record = store.detail("fale sobre o projeto WoodStock").unwrap();
        assert_eq!(record.name, "WoodStock");
    }

    #[test]
    fn detail_not_found() {
        let (_tmp, store) = store_with(CORPUS);
        let err = store.detail("nonexistent-xyz").unwrap_err();
        assert!(matches!(err, ToolError::NoMatch(_)));
    }

    #[test]
    fn detail_first_match_in_sorted_order() {
        let (_tmp, store) = store_with(&[
            ("alpha.txt", "Plain alpha.\n"),
            ("alpha-core.txt", "Core alpha.\n"),
        ]);
        // Both names contain "alpha"; sorted order puts "alpha" first.
        let record = store.detail("alpha").unwrap();
        assert_eq!(record.name, "alpha");
    }
}
