//! Hook configuration file tests
//!
//! Run with: `cargo test -p hook --test config_tests`

use common::LogFormat;
use hook::HookConfig;
use hook::config::HOOK_SOCKETS_SHARED_DIRECTORY;
use std::path::PathBuf;
use tempfile::tempdir;

mod parsing {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = HookConfig::from_toml(
            r#"
            [hook]
            name = "usb-passthrough"
            socket_dir = "/tmp/hooks"
            socket_name = "usb.sock"
            priority = 5
            log_level = "debug"
            log_format = "json"

            [selection]
            annotation = "example.com/vendorProduct"
            "#,
        )
        .unwrap();

        assert_eq!(config.hook.name, "usb-passthrough");
        assert_eq!(config.hook.priority, 5);
        assert_eq!(config.hook.log_level, "debug");
        assert_eq!(config.hook.log_format, LogFormat::Json);
        assert_eq!(config.selection.annotation, "example.com/vendorProduct");
        assert_eq!(config.socket_path(), PathBuf::from("/tmp/hooks/usb.sock"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = HookConfig::from_toml(
            r#"
            [hook]
            log_level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.hook.log_level, "warn");
        assert_eq!(config.hook.name, "usbredir");
        assert_eq!(
            config.hook.socket_dir,
            PathBuf::from(HOOK_SOCKETS_SHARED_DIRECTORY)
        );
        assert_eq!(config.hook.log_format, LogFormat::Text);
        assert_eq!(
            config.selection.annotation,
            common::test_utils::VENDOR_PRODUCT_ANNOTATION
        );
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = HookConfig::from_toml("").unwrap();
        assert_eq!(
            config.socket_path(),
            PathBuf::from("/var/run/kubevirt-hooks/usbredir.sock")
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(HookConfig::from_toml("[hook]\nlog_format = \"yaml\"").is_err());
        assert!(HookConfig::from_toml("[hook]\nlog_level = \"loud\"").is_err());
        assert!(HookConfig::from_toml("[hook]\nname = \"  \"").is_err());
        assert!(HookConfig::from_toml("[hook]\nsocket_name = \"../x.sock\"").is_err());
        assert!(HookConfig::from_toml("[selection]\nannotation = \"\"").is_err());
        assert!(HookConfig::from_toml("[hook]\npriority = \"high\"").is_err());
    }
}

mod files {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("hook.toml");

        let mut config = HookConfig::default();
        config.hook.priority = -3;
        config.hook.log_format = LogFormat::Json;
        config.save(&path).unwrap();

        let loaded = HookConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.hook.priority, -3);
        assert_eq!(loaded.hook.log_format, LogFormat::Json);
        assert_eq!(loaded.hook.socket_name, "usbredir.sock");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(HookConfig::load(Some(dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hook.toml");
        std::fs::write(&path, "[hook\nname = ").unwrap();

        assert!(HookConfig::load(Some(path)).is_err());
    }
}
