pub mod check;
pub mod fix;
pub mod rules;

use crate::models::QscaleConfig;
use crate::Result;
use std::path::{Path, PathBuf};

/// Options shared by every command
#[derive(Debug, Clone, clap::Args)]
pub struct GlobalArgs {
    /// Config file
    #[arg(long, global = true, default_value = crate::models::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory for generated reports and patches
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// File holding the Gemini API key
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Load the config file and apply command-line overrides
pub fn load_config(global: &GlobalArgs, core_path: Option<&Path>) -> Result<QscaleConfig> {
    let mut config = QscaleConfig::load(&global.config)?;

    if let Some(dir) = &global.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(file) = &global.token_file {
        config.token_file = file.clone();
    }
    if let Some(path) = core_path {
        config.core_path = path.to_path_buf();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_win_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("qscale.toml");
        std::fs::write(&config_path, "core_path = \"/from/file\"\noutput_dir = \"reports\"\n").unwrap();

        let global = GlobalArgs {
            config: config_path,
            output_dir: Some(PathBuf::from("elsewhere")),
            token_file: None,
            verbose: false,
        };

        let config = load_config(&global, Some(Path::new("/from/cli"))).unwrap();
        assert_eq!(config.core_path, PathBuf::from("/from/cli"));
        assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.token_file, PathBuf::from(".token"));

        let config = load_config(&global, None).unwrap();
        assert_eq!(config.core_path, PathBuf::from("/from/file"));
    }
}
