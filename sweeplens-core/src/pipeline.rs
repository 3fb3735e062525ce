// Orchestrator: Extract → Classify → Group → Render over one read-only
// store snapshot per call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::analyze::group_runs;
use crate::config::SweeplensConfig;
use crate::error::{Result, StoreError};
use crate::extract::extract_runs;
use crate::render::{RenderContext, fallback::render_missing_run, generator_for};
use crate::store::RunSource;
use crate::store::sqlite::SqliteRunStore;
use crate::types::{GroupKind, GroupOutline, RunId, RunRecord, SweepGroup, SweepKind};

/// One rendered group: its outline plus the code shared by its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSuggestion {
    #[serde(flatten)]
    pub outline: GroupOutline,
    pub code: String,
}

/// Counts over the full partition of the store's runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_groups: usize,
    pub total_runs: usize,
    pub by_group_kind: BTreeMap<String, usize>,
    /// Keyed by each group's sweep kind, so a batch counts once.
    pub by_sweep_kind: BTreeMap<String, usize>,
}

/// Result of a full analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub database_path: String,
    pub groups: Vec<GroupSuggestion>,
    pub summary: Summary,
    /// Every rendered run mapped to the code of its group.
    pub code_by_run_id: BTreeMap<RunId, String>,
}

impl Suggestions {
    pub fn code_for(&self, run_id: RunId) -> Option<&str> {
        self.code_by_run_id.get(&run_id).map(String::as_str)
    }
}

/// Runs the analysis with a fixed configuration. Holds no state between
/// calls; every call reads the store afresh.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    config: SweeplensConfig,
}

impl SuggestionEngine {
    pub fn new(config: SweeplensConfig) -> Self {
        Self { config }
    }

    /// Group every run in the store without rendering code.
    #[instrument(skip_all, name = "analyze_groups")]
    pub fn analyze_groups(&self, store_path: &Path) -> Result<Vec<GroupOutline>> {
        let start = Instant::now();
        let (_, runs) = self.load(store_path)?;
        let outlines: Vec<GroupOutline> = group_runs(&runs, &self.config.grouping)
            .iter()
            .map(SweepGroup::outline)
            .collect();
        info!(
            runs = runs.len(),
            groups = outlines.len(),
            duration = ?start.elapsed(),
            "Group analysis complete"
        );
        Ok(outlines)
    }

    /// Full analysis: groups, generated code, summary and per-run lookup.
    /// With `run_id` set, only the group containing it is rendered.
    #[instrument(skip_all, name = "generate_suggestions", fields(run_id = ?run_id))]
    pub fn generate_suggestions(
        &self,
        store_path: &Path,
        run_id: Option<RunId>,
        include_groups: bool,
    ) -> Result<Suggestions> {
        let start = Instant::now();
        let (database_path, runs) = self.load(store_path)?;
        let suggestions = self.suggest(&runs, &database_path, run_id, include_groups);
        info!(
            runs = suggestions.summary.total_runs,
            groups = suggestions.summary.total_groups,
            rendered = suggestions.code_by_run_id.len(),
            duration = ?start.elapsed(),
            "Suggestions complete"
        );
        Ok(suggestions)
    }

    /// Code for one run; the generic loader when the run is not in the store.
    #[instrument(skip_all, name = "generate_code_for_run", fields(run_id = %run_id))]
    pub fn generate_code_for_run(&self, store_path: &Path, run_id: RunId) -> Result<String> {
        let (database_path, runs) = self.load(store_path)?;
        Ok(self.code_for_run(&runs, &database_path, run_id))
    }

    /// Same as [`generate_suggestions`](Self::generate_suggestions) over an
    /// arbitrary source, with `database_path` embedded verbatim.
    pub fn suggestions_from_source(
        &self,
        source: &dyn RunSource,
        database_path: &str,
        run_id: Option<RunId>,
        include_groups: bool,
    ) -> Result<Suggestions> {
        let runs = extract_runs(source)?;
        Ok(self.suggest(&runs, database_path, run_id, include_groups))
    }

    /// Same as [`generate_code_for_run`](Self::generate_code_for_run) over an
    /// arbitrary source.
    pub fn code_from_source(
        &self,
        source: &dyn RunSource,
        database_path: &str,
        run_id: RunId,
    ) -> Result<String> {
        let runs = extract_runs(source)?;
        Ok(self.code_for_run(&runs, database_path, run_id))
    }

    /// Resolve the path, read every run and close the connection.
    fn load(&self, store_path: &Path) -> Result<(String, Vec<RunRecord>)> {
        let resolved = resolve(store_path)?;
        let store = SqliteRunStore::open(&resolved, &self.config.store.metadata_column)?;
        let runs = extract_runs(&store)?;
        drop(store);
        Ok((resolved.to_string_lossy().into_owned(), runs))
    }

    fn code_for_run(&self, runs: &[RunRecord], database_path: &str, run_id: RunId) -> String {
        let suggestions = self.suggest(runs, database_path, Some(run_id), false);
        match suggestions.code_by_run_id.get(&run_id) {
            Some(code) => code.clone(),
            None => {
                debug!(%run_id, "Run not found; rendering generic loader");
                let ctx = RenderContext { database_path, codegen: &self.config.codegen };
                render_missing_run(run_id, &ctx)
            }
        }
    }

    fn suggest(
        &self,
        runs: &[RunRecord],
        database_path: &str,
        run_id: Option<RunId>,
        include_groups: bool,
    ) -> Suggestions {
        let groups = group_runs(runs, &self.config.grouping);
        let summary = summarize(runs.len(), &groups);
        let ctx = RenderContext { database_path, codegen: &self.config.codegen };

        let mut rendered = Vec::new();
        let mut code_by_run_id = BTreeMap::new();
        for group in groups.iter().filter(|g| run_id.is_none_or(|id| g.contains(id))) {
            let generator = generator_for(group);
            debug!(
                generator = generator.name(),
                runs = group.run_ids.len(),
                "Rendering group"
            );
            let code = generator.generate(group, &ctx);
            for id in &group.run_ids {
                code_by_run_id.insert(*id, code.clone());
            }
            if include_groups {
                rendered.push(GroupSuggestion { outline: group.outline(), code });
            }
        }

        Suggestions {
            database_path: database_path.to_string(),
            groups: rendered,
            summary,
            code_by_run_id,
        }
    }
}

fn resolve(store_path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(store_path).map_err(|source| {
        StoreError::Path {
            path: store_path.display().to_string(),
            source,
        }
        .into()
    })
}

fn summarize(total_runs: usize, groups: &[SweepGroup<'_>]) -> Summary {
    let mut by_group_kind: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_sweep_kind: BTreeMap<String, usize> = BTreeMap::new();
    for group in groups {
        *by_group_kind.entry(group_key(group.group_kind)).or_default() += 1;
        *by_sweep_kind.entry(sweep_key(group.sweep_kind)).or_default() += 1;
    }
    Summary {
        total_groups: groups.len(),
        total_runs,
        by_group_kind,
        by_sweep_kind,
    }
}

fn group_key(kind: GroupKind) -> String {
    kind.as_str().to_string()
}

fn sweep_key(kind: SweepKind) -> String {
    kind.as_str().to_string()
}

// ── Default-config entry points ────────────────────────────────────

/// [`SuggestionEngine::analyze_groups`] with the default configuration.
pub fn analyze_groups(store_path: &Path) -> Result<Vec<GroupOutline>> {
    SuggestionEngine::default().analyze_groups(store_path)
}

/// [`SuggestionEngine::generate_suggestions`] with the default configuration.
pub fn generate_suggestions(
    store_path: &Path,
    run_id: Option<RunId>,
    include_groups: bool,
) -> Result<Suggestions> {
    SuggestionEngine::default().generate_suggestions(store_path, run_id, include_groups)
}

/// [`SuggestionEngine::generate_code_for_run`] with the default configuration.
pub fn generate_code_for_run(store_path: &Path, run_id: RunId) -> Result<String> {
    SuggestionEngine::default().generate_code_for_run(store_path, run_id)
}
