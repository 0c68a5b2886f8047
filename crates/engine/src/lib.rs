pub use accounts::Account;
pub use cache::{Cache, CacheKey, PROFILE_CACHE_TTL};
pub use commands::{BalanceChange, PointsChange, RewardUpsertCmd, TopupCmd};
pub use error::EngineError;
pub use notifications::Notification;
pub use ops::{DEFAULT_SPIN_COST, Engine, EngineBuilder, ProfileSnapshot, SpinOutcome};
pub use reward_history::SpinRecord;
pub use rewards::{Reward, RewardKind};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};

pub mod accounts;
mod cache;
mod commands;
mod error;
pub mod notifications;
mod ops;
pub mod reward_history;
pub mod rewards;
pub mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
