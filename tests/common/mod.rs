use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config with instant generation, suitable for driving the binary
#[allow(dead_code)]
pub fn instant_config_yaml() -> &'static str {
    r#"
generation:
  min_delay_ms: 0
  max_delay_ms: 0
content:
  default_type: blog-post
  tone: friendly
"#
}
