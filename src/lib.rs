pub mod modules;

pub use modules::catalog::{
    self, Coins, EMOTIONS, JOBS, RARITY_WEIGHTS, RULES, Rank, Rarity, ShopItem,
};
pub use modules::config::{SETTINGS_FILE, Settings};
pub use modules::economy::{EconomyCommands, EconomyQueries, Reply};
pub use modules::engine::{Engine, Inbound, Outbound};
pub use modules::error::{ConfigError, StoreError};
pub use modules::format::{Formatter, thousands};
pub use modules::gate::{self, Denied};
pub use modules::parser::{Command, ParsedLine, parse_command, parse_line};
pub use modules::sampler::{uniform_pick, weighted_pick};
pub use modules::store::{
    CycleLock, EconomyStore, JsonFileStore, LEDGER_FILE, Ledger, MemoryStore,
};
pub use modules::user::{Pet, UserRecord};
