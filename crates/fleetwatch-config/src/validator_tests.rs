use super::*;

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_zero_interval() {
    let mut config = Config::default();
    config.monitor.interval_secs = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "monitor.interval_secs"));
}

#[test]
fn test_validate_short_interval_warning() {
    let mut config = Config::default();
    config.monitor.interval_secs = 5;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "monitor.interval_secs"));
}

#[test]
fn test_validate_zero_timeouts() {
    let mut config = Config::default();
    config.prober.dial_timeout_secs = 0;
    config.chains.http_timeout_secs = 0;

    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_validate_docker_host_scheme() {
    let mut config = Config::default();
    config.control_plane.docker_host = "unix:///var/run/docker.sock".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "control_plane.docker_host"));
}

#[test]
fn test_validate_empty_username() {
    let mut config = Config::default();
    config.notify.username = " ".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "notify.username"));
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.server.port = 0;

    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_into_result_passes_warnings() {
    let mut config = Config::default();
    config.monitor.interval_secs = 1;

    let warnings = ConfigValidator::validate(&config).into_result().unwrap();
    assert_eq!(warnings.len(), 1);
}
