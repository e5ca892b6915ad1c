use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use phonebot_models::Config;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "configs/default.toml";
pub const ENV_PREFIX: &str = "PHONEBOT_";

/// Built-in defaults, then the TOML settings file, then `PHONEBOT_` variables
/// (`__` separates sections, e.g. `PHONEBOT_SERVER__PORT`). A missing file is skipped.
pub fn load_config(path: Option<&Path>) -> Result<Config, figment::Error> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        // Only sectioned keys; PHONEBOT_TENANT and friends belong to the CLI.
        .merge(Env::prefixed(ENV_PREFIX).split("__").filter(|k| k.as_str().contains('.')))
        .extract()
}
