mod file;
mod selection;

pub use file::{config_path, load_config, parse_config, DEFAULT_CONFIG_PATH};
pub use selection::{is_eligible, select_channels};
