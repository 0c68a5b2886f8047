use sea_orm::DatabaseConnection;

use crate::{Cache, EngineError, ResultEngine};

mod accounts;
mod ledger;
mod profile;
mod rewards;
mod spin;
mod transactions;

pub use profile::ProfileSnapshot;
pub use spin::SpinOutcome;

/// Points charged for one spin unless the builder overrides it.
pub const DEFAULT_SPIN_COST: i64 = 100;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    cache: Cache,
    spin_cost: i64,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Points charged for one spin.
    pub fn spin_cost(&self) -> i64 {
        self.spin_cost
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    cache: Option<Cache>,
    spin_cost: Option<i64>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Share an existing cache instead of creating a private one.
    pub fn cache(mut self, cache: Cache) -> EngineBuilder {
        self.cache = Some(cache);
        self
    }

    pub fn spin_cost(mut self, spin_cost: i64) -> EngineBuilder {
        self.spin_cost = Some(spin_cost);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let spin_cost = self.spin_cost.unwrap_or(DEFAULT_SPIN_COST);
        if spin_cost <= 0 {
            return Err(EngineError::InvalidInput(
                "spin_cost must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            cache: self.cache.unwrap_or_default(),
            spin_cost,
        })
    }
}
