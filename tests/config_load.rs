// tests/config_load.rs
use industry_impact_monitor::config::{
    MonitorConfig, ENV_BASE_URL, ENV_CONFIG_PATH, ENV_METRICS, ENV_REFRESH_SECS,
};
use std::{env, fs};

fn clear_env() {
    for k in [ENV_CONFIG_PATH, ENV_BASE_URL, ENV_REFRESH_SECS, ENV_METRICS] {
        env::remove_var(k);
    }
}

#[test]
fn load_from_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("monitor.toml");
    fs::write(
        &p_toml,
        r#"
base_url = "http://feeds.local:9000/"
history_path = "/h.jsonl"
home_top_n = 5
"#,
    )
    .unwrap();
    let c = MonitorConfig::load_from(&p_toml).unwrap();
    assert_eq!(c.base_url, "http://feeds.local:9000");
    assert_eq!(c.history_path, "/h.jsonl");
    assert_eq!(c.home_top_n, 5);
    assert_eq!(c.refresh_interval_secs, 60);

    let p_json = dir.path().join("monitor.json");
    fs::write(&p_json, r#"{"metrics_enabled": true, "chart_top_n": 0}"#).unwrap();
    let j = MonitorConfig::load_from(&p_json).unwrap();
    assert!(j.metrics_enabled);
    assert_eq!(j.chart_top_n, 12);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("monitor.toml");
    fs::write(&p, "home_top_n = \"many\"").unwrap();
    assert!(MonitorConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the test never reads a real config/ directory.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing at all -> defaults
    assert_eq!(MonitorConfig::load_default().unwrap(), MonitorConfig::default());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("monitor.toml"), "trend_limit = 24").unwrap();
    assert_eq!(MonitorConfig::load_default().unwrap().trend_limit, 24);

    // 3) Explicit path wins
    let p_env = tmp.path().join("elsewhere.json");
    fs::write(&p_env, r#"{"trend_limit": 168}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(MonitorConfig::load_default().unwrap().trend_limit, 168);

    // 4) Dangling path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(MonitorConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn env_overrides_apply_last() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    env::set_var(ENV_BASE_URL, "https://mirror.example/");
    env::set_var(ENV_REFRESH_SECS, "15");
    env::set_var(ENV_METRICS, "1");
    let c = MonitorConfig::load_default().unwrap();
    assert_eq!(c.base_url, "https://mirror.example");
    assert_eq!(c.refresh_interval_secs, 15);
    assert!(c.metrics_enabled);

    env::set_var(ENV_REFRESH_SECS, "soon");
    assert!(MonitorConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
