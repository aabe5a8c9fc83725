//! Existence check and the two-way provisioning branch.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use scifi_athena::{AthenaError, DatabaseMetadata, QueryService};

use crate::step::Step;

/// Which arm of the provisioning branch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    SkipCreation,
    CreateDatabase,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::SkipCreation => "skip-creation",
            Route::CreateDatabase => "create-database",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route → branch arm. The arm not selected is recorded as skipped.
pub const BRANCH_TABLE: [(Route, Step); 2] = [
    (Route::SkipCreation, Step::SkipAthenaDatabaseCreation),
    (Route::CreateDatabase, Step::CreateAthenaDatabase),
];

/// The step a route selects.
pub fn branch_for(route: Route) -> Step {
    match route {
        Route::SkipCreation => Step::SkipAthenaDatabaseCreation,
        Route::CreateDatabase => Step::CreateAthenaDatabase,
    }
}

/// Branch arms a route does not select.
pub fn arms_not_taken(route: Route) -> impl Iterator<Item = Step> {
    BRANCH_TABLE
        .into_iter()
        .filter(move |(r, _)| *r != route)
        .map(|(_, step)| step)
}

/// Decide the route from the outcome of a catalog lookup.
///
/// Every lookup error resolves to [`Route::CreateDatabase`], including ones
/// that say nothing about existence (network, permissions). The create
/// statement is `IF NOT EXISTS`, so a wrong guess costs one redundant
/// submission. Tighten here if an error should instead fail the run.
pub fn route_for_lookup(lookup: &Result<DatabaseMetadata, AthenaError>) -> Route {
    match lookup {
        Ok(meta) => {
            info!(database = %meta.name, "Database already exists - skip creation");
            Route::SkipCreation
        }
        Err(e) if e.is_not_found() => {
            info!(error = %e, "No database found");
            Route::CreateDatabase
        }
        Err(e) => {
            warn!(error = %e, "Database lookup failed, treating database as absent");
            Route::CreateDatabase
        }
    }
}

/// Existence check: look the database up and resolve a route. Read-only.
pub async fn check_database(service: &dyn QueryService, catalog: &str, database: &str) -> Route {
    let lookup = service.get_database_metadata(catalog, database).await;
    route_for_lookup(&lookup)
}
