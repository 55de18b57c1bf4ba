// SPDX-License-Identifier: Apache-2.0

use bvsmt::{SolverCache, SolverConfig};

use crate::report_cli_error::report_cli_error_and_exit;

pub fn handle_cache_clear(solver: SolverConfig) {
    let cache = SolverCache::for_config(&solver);
    let dir = cache
        .artifact_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    match cache.clear() {
        Ok(removed) => println!("removed {} cached results from {}", removed, dir),
        Err(e) => report_cli_error_and_exit(
            "could not clear cache",
            Some("cache-clear"),
            vec![("directory", dir.as_str()), ("error", e.to_string().as_str())],
        ),
    }
}
