use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use cdn_usage_charts::config::Config;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        assert_eq!(config.database.path, PathBuf::from("data.db"));
        assert_eq!(config.database.usage_table, "data");
        assert_eq!(config.database.totals_table, "totals");

        assert_eq!(config.charts.top_limit, 5);
        assert_eq!(config.charts.output_dir, PathBuf::from("."));
        assert_eq!(config.charts.title_prefix, "cdnjs");
    }

    #[test]
    fn test_env_variable_override() {
        env::set_var("CDN_USAGE_TOP_LIMIT", "3");
        env::set_var("CDN_USAGE_DB_PATH", "/tmp/usage.db");

        let mut config = Config::default();
        config
            .apply_env_overrides()
            .expect("Failed to apply env overrides");

        assert_eq!(config.charts.top_limit, 3);
        assert_eq!(config.database.path, PathBuf::from("/tmp/usage.db"));

        env::remove_var("CDN_USAGE_TOP_LIMIT");
        env::remove_var("CDN_USAGE_DB_PATH");
    }

    #[test]
    fn test_config_file_loading() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cdn-usage-charts.toml");
        fs::write(
            &path,
            r#"
[logging]
level = "DEBUG"
format = "json"
output = "console"

[database]
path = "stats/data.db"
usage_table = "usage_raw"
totals_table = "usage_totals"

[charts]
top_limit = 10
output_dir = "charts"
width = 1600
height = 1000
title_prefix = "My CDN"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.database.usage_table, "usage_raw");
        assert_eq!(config.charts.top_limit, 10);
        assert!(config.validate().is_ok());
        assert_eq!(config.charts.ranking_title(), "My CDN Top 10 Resources");
        assert_eq!(
            config.charts.ranking_output(),
            PathBuf::from("charts").join("my_cdn_top_10_resources.png")
        );
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[charts\ntop_limit = ").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_file_logging_creates_log_directory() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.logging.output = "file".to_string();
        config.paths.log_directory = dir.path().join("logs");

        config.validate().unwrap();
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_unknown_log_output_rejected() {
        let mut config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());
    }
}
