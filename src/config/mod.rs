//! Layered configuration.
//!
//! Merges configuration from these tiers, field by field:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/task-market/config.yaml`
//! 3. **User** - `~/.task-market/config.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `TASK_MARKET_CONFIG_PATH` - Explicit config file (replaces the project and user tiers)
//! - `TASK_MARKET_DB_PATH` - Database path
//! - `TASK_MARKET_HOST` - Bind host
//! - `TASK_MARKET_PORT` - Bind port
//! - `TASK_MARKET_JWT_SECRET` - Token signing secret

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
