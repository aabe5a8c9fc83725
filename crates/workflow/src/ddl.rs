//! DDL for the movielens tables and the derived sci-fi aggregate.
//!
//! Templates are rendered once per run with minijinja and then held as
//! plain strings; nothing re-renders them mid-run.

use std::fmt;

use minijinja::{context, Environment};
use serde::Serialize;

use scifi_core::ProvisionParams;

const MOVIES_TEMPLATE: &str = include_str!("../sql/movies.sql");
const RATINGS_TEMPLATE: &str = include_str!("../sql/ratings.sql");
const SCIFI_TEMPLATE: &str = include_str!("../sql/scifi.sql");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Movies,
    Ratings,
    /// Average rating per sci-fi title; reads both raw tables.
    Scifi,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Movies, Table::Ratings, Table::Scifi];

    pub fn name(self) -> &'static str {
        match self {
            Table::Movies => "movies",
            Table::Ratings => "ratings",
            Table::Scifi => "scifi",
        }
    }

    /// Name appended to `athena_output` to form the result location.
    pub fn output_name(self) -> &'static str {
        match self {
            Table::Movies => "create_athena_movie_table",
            Table::Ratings => "create_athena_ratings_table",
            Table::Scifi => "create_athena_scifi_table",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Table::Movies => MOVIES_TEMPLATE,
            Table::Ratings => RATINGS_TEMPLATE,
            Table::Scifi => SCIFI_TEMPLATE,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `CREATE DATABASE IF NOT EXISTS <name>`
pub fn create_database_statement(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {}", database)
}

/// The three rendered `IF NOT EXISTS` statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinitions {
    movies: String,
    ratings: String,
    scifi: String,
}

impl TableDefinitions {
    pub fn render(params: &ProvisionParams) -> Result<Self, minijinja::Error> {
        let env = Environment::new();
        let render = |table: Table| {
            env.render_str(
                table.template(),
                context! {
                    database => &params.athena_db,
                    location => params.table_location(table.name()),
                },
            )
        };

        Ok(Self {
            movies: render(Table::Movies)?,
            ratings: render(Table::Ratings)?,
            scifi: render(Table::Scifi)?,
        })
    }

    pub fn statement(&self, table: Table) -> &str {
        match table {
            Table::Movies => &self.movies,
            Table::Ratings => &self.ratings,
            Table::Scifi => &self.scifi,
        }
    }

    /// Statements in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (Table, &str)> {
        Table::ALL.into_iter().map(move |t| (t, self.statement(t)))
    }
}
