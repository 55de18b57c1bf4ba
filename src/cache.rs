// SPDX-License-Identifier: Apache-2.0

//! Two-level result cache keyed by query content hash.
//!
//! The first level holds decided outcomes and parsed models in memory. The
//! second level keeps raw solver output on disk as `<hash>.check` and
//! `<hash>.model`, so identical queries are not re-solved across processes.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use crate::bvsmt_error::BvsmtError;
use crate::decision_procedure::{DecisionProcedure, SolverConfig};
use crate::memo::ContentHash;
use crate::model::Model;
use crate::query::Query;

/// Environment variable naming the default artifact directory.
pub const CACHE_DIR_ENV: &str = "BVSMT_CACHE_DIR";

static GLOBAL: Lazy<Arc<SolverCache>> =
    Lazy::new(|| Arc::new(SolverCache::with_artifact_dir(default_artifact_dir())));

/// `$BVSMT_CACHE_DIR`, else `bvsmt-cache` under the system temp directory.
pub fn default_artifact_dir() -> PathBuf {
    std::env::var_os(CACHE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("bvsmt-cache"))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Answers served from memory.
    pub memory_hits: u64,
    /// Answers served from an on-disk artifact.
    pub artifact_hits: u64,
    /// Decision procedure invocations.
    pub invocations: u64,
}

/// Raw solver output plus how long the decision procedure took, if it ran.
#[derive(Debug)]
pub struct RawOutput {
    pub text: String,
    pub solve_time: Option<Duration>,
}

#[derive(Default)]
pub struct SolverCache {
    outcomes: Mutex<HashMap<ContentHash, bool>>,
    models: Mutex<HashMap<ContentHash, Option<Model>>>,
    stats: Mutex<CacheStats>,
    artifact_dir: Option<PathBuf>,
}

impl SolverCache {
    /// Caches in memory only; solver runs happen in a scratch directory.
    pub fn in_memory() -> Self {
        SolverCache::default()
    }

    pub fn with_artifact_dir(dir: impl Into<PathBuf>) -> Self {
        SolverCache {
            artifact_dir: Some(dir.into()),
            ..SolverCache::default()
        }
    }

    /// Keeps artifacts in `config.cache_dir`, falling back to
    /// [`default_artifact_dir`].
    pub fn for_config(config: &SolverConfig) -> Self {
        SolverCache::with_artifact_dir(
            config
                .cache_dir
                .clone()
                .unwrap_or_else(default_artifact_dir),
        )
    }

    /// Process-wide cache shared by sessions that do not bring their own.
    pub fn global() -> Arc<SolverCache> {
        Arc::clone(&GLOBAL)
    }

    pub fn artifact_dir(&self) -> Option<&Path> {
        self.artifact_dir.as_deref()
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().unwrap()
    }

    pub fn outcome(&self, hash: &ContentHash) -> Option<bool> {
        let cached = self.outcomes.lock().unwrap().get(hash).copied();
        if cached.is_some() {
            self.stats.lock().unwrap().memory_hits += 1;
        }
        cached
    }

    pub fn store_outcome(&self, hash: ContentHash, sat: bool) {
        self.outcomes.lock().unwrap().insert(hash, sat);
    }

    /// `Some(None)` records a model query that came back unsat.
    pub fn model(&self, hash: &ContentHash) -> Option<Option<Model>> {
        let cached = self.models.lock().unwrap().get(hash).cloned();
        if cached.is_some() {
            self.stats.lock().unwrap().memory_hits += 1;
        }
        cached
    }

    pub fn store_model(&self, hash: ContentHash, model: Option<Model>) {
        self.models.lock().unwrap().insert(hash, model);
    }

    pub fn artifact_path(&self, query: &Query) -> Option<PathBuf> {
        self.artifact_dir.as_ref().map(|dir| {
            dir.join(format!(
                "{}.{}",
                query.hash().to_hex(),
                query.kind().artifact_extension()
            ))
        })
    }

    /// Returns the solver's output for `query`, from disk when a previous
    /// run left an artifact, otherwise by running `procedure`.
    pub fn raw_output(
        &self,
        query: &Query,
        procedure: &dyn DecisionProcedure,
    ) -> Result<RawOutput, BvsmtError> {
        let artifact = self.artifact_path(query);
        if let Some(path) = &artifact {
            match fs::read_to_string(path) {
                Ok(text) => {
                    log::debug!("artifact hit: {}", path.display());
                    self.stats.lock().unwrap().artifact_hits += 1;
                    return Ok(RawOutput {
                        text,
                        solve_time: None,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        match (&self.artifact_dir, &artifact) {
            (Some(dir), Some(path)) => {
                fs::create_dir_all(dir)?;
                self.invoke(query, procedure, dir, Some(path))
            }
            _ => {
                let scratch = tempfile::tempdir()?;
                self.invoke(query, procedure, scratch.path(), None)
            }
        }
    }

    fn invoke(
        &self,
        query: &Query,
        procedure: &dyn DecisionProcedure,
        dir: &Path,
        artifact: Option<&PathBuf>,
    ) -> Result<RawOutput, BvsmtError> {
        let stem = query.hash().to_hex();
        let mut input = tempfile::Builder::new()
            .prefix(&stem)
            .suffix(".smt2")
            .tempfile_in(dir)?;
        input.write_all(query.text().as_bytes())?;
        input.flush()?;
        let output = tempfile::Builder::new()
            .prefix(&stem)
            .suffix(".out")
            .tempfile_in(dir)?;

        self.stats.lock().unwrap().invocations += 1;
        let start = Instant::now();
        procedure.run(input.path(), output.path())?;
        let solve_time = start.elapsed();
        log::info!(
            "decision procedure took {:?} for {}",
            solve_time,
            query.hash()
        );

        let text = fs::read_to_string(output.path())?;
        if let Some(path) = artifact {
            output.persist(path).map_err(|e| e.error)?;
        }
        Ok(RawOutput {
            text,
            solve_time: Some(solve_time),
        })
    }

    /// Removes the on-disk artifact for `query`, if any.
    pub fn discard_artifact(&self, query: &Query) -> io::Result<()> {
        match self.artifact_path(query) {
            Some(path) => match fs::remove_file(&path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }

    /// Deletes every `.check` and `.model` artifact and drops the in-memory
    /// entries. Returns the number of files removed.
    pub fn clear(&self) -> io::Result<usize> {
        self.outcomes.lock().unwrap().clear();
        self.models.lock().unwrap().clear();
        let Some(dir) = &self.artifact_dir else {
            return Ok(0);
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_artifact = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("check") | Some("model")
            );
            if is_artifact {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        log::info!("removed {} artifacts from {}", removed, dir.display());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::Bool;
    use crate::query::QueryKind;
    use crate::test_utils::ScriptedProcedure;

    fn query() -> Query {
        Query::build(QueryKind::Check, &[Bool::symbol("p")], None)
    }

    #[test]
    fn test_artifact_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SolverCache::with_artifact_dir(dir.path());
        let procedure = ScriptedProcedure::constant("sat\n");
        let q = query();

        let first = cache.raw_output(&q, &procedure).unwrap();
        assert_eq!(first.text, "sat\n");
        assert!(first.solve_time.is_some());
        let artifact = cache.artifact_path(&q).unwrap();
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "sat\n");

        let second = cache.raw_output(&q, &procedure).unwrap();
        assert_eq!(second.text, "sat\n");
        assert!(second.solve_time.is_none());
        assert_eq!(procedure.invocations(), 1);
        assert_eq!(cache.stats().artifact_hits, 1);

        // Only the artifact is left behind; the query and output temps are gone.
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_artifact_survives_a_new_cache() {
        let dir = tempfile::tempdir().unwrap();
        let procedure = ScriptedProcedure::constant("unsat\n");
        SolverCache::with_artifact_dir(dir.path())
            .raw_output(&query(), &procedure)
            .unwrap();
        let fresh = SolverCache::with_artifact_dir(dir.path());
        assert_eq!(fresh.raw_output(&query(), &procedure).unwrap().text, "unsat\n");
        assert_eq!(procedure.invocations(), 1);
    }

    #[test]
    fn test_in_memory_cache_always_invokes() {
        let cache = SolverCache::in_memory();
        let procedure = ScriptedProcedure::constant("sat\n");
        cache.raw_output(&query(), &procedure).unwrap();
        cache.raw_output(&query(), &procedure).unwrap();
        assert_eq!(procedure.invocations(), 2);
        assert_eq!(cache.artifact_path(&query()), None);
    }

    #[test]
    fn test_discard_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SolverCache::with_artifact_dir(dir.path());
        let procedure = ScriptedProcedure::constant("sat\n");
        let q = query();
        cache.raw_output(&q, &procedure).unwrap();
        cache.discard_artifact(&q).unwrap();
        assert!(!cache.artifact_path(&q).unwrap().exists());
        cache.discard_artifact(&q).unwrap();

        cache.raw_output(&q, &procedure).unwrap();
        let model_query = Query::build(QueryKind::Model, &[Bool::symbol("p")], None);
        cache.raw_output(&model_query, &procedure).unwrap();
        cache.store_outcome(q.hash(), true);
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        assert_eq!(cache.clear().unwrap(), 2);
        assert_eq!(cache.outcome(&q.hash()), None);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_config_cache_dir_wins() {
        let config = SolverConfig {
            cache_dir: Some(PathBuf::from("/var/cache/bvsmt")),
            ..SolverConfig::z3()
        };
        assert_eq!(
            SolverCache::for_config(&config).artifact_dir(),
            Some(Path::new("/var/cache/bvsmt"))
        );
        assert_eq!(
            SolverCache::for_config(&SolverConfig::z3()).artifact_dir(),
            Some(default_artifact_dir().as_path())
        );
    }

    #[test]
    fn test_memory_levels() {
        let cache = SolverCache::in_memory();
        let q = query();
        assert_eq!(cache.outcome(&q.hash()), None);
        cache.store_outcome(q.hash(), false);
        assert_eq!(cache.outcome(&q.hash()), Some(false));
        cache.store_model(q.hash(), None);
        assert_eq!(cache.model(&q.hash()), Some(None));
        assert_eq!(cache.stats().memory_hits, 2);
    }

    #[test]
    fn test_failed_run_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SolverCache::with_artifact_dir(dir.path());
        let procedure = ScriptedProcedure::failing("cannot start");
        let q = query();
        assert!(matches!(
            cache.raw_output(&q, &procedure),
            Err(BvsmtError::Io(_))
        ));
        assert!(!cache.artifact_path(&q).unwrap().exists());
    }
}
