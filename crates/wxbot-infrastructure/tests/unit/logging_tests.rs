//! Logging helper tests

use tracing::Level;
use wxbot_infrastructure::logging::parse_log_level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
    assert!(parse_log_level("verbose").is_err());
}
