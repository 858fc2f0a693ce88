use std::path::PathBuf;

use crate::consts;

pub mod progress_bar;

/// Location of the config file used when `--config` is not given.
pub fn default_config_file() -> Option<PathBuf> {
    let mut config_file = dirs::config_dir()?;
    config_file.push("apkdl");
    config_file.push(consts::CONFIG_FILE_NAME);
    Some(config_file)
}
