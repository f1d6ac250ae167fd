//! Layered application configuration.
//!
//! Consolidates configuration from these tiers with field-by-field YAML merging:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/glossary-updater/config.yaml`
//! 3. **User** - `~/.glossary-updater/config.yaml`
//! 4. **Environment** - `API_DOMAIN`, `API_USERNAME`, `API_PASSWORD`, `SSL_VERIFY`
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `GLOSSARY_UPDATER_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `GLOSSARY_UPDATER_PROJECT_DIR` - Project config dir (default: `./glossary-updater`)
//! - `GLOSSARY_UPDATER_USER_DIR` - User config dir (default: `~/.glossary-updater`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, ENV_CONFIG_PATH};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
