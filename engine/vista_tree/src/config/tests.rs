use super::*;
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert!(config.share_members);
    assert_eq!(config.preview_limit, None);
}

#[test]
fn clip_respects_char_boundaries() {
    let config = EngineConfig {
        preview_limit: Some(3),
        ..EngineConfig::default()
    };
    assert_eq!(config.clip_preview("héllo".into()), "hél…");
    assert_eq!(config.clip_preview("abc".into()), "abc");
}

#[test]
fn no_limit_keeps_text() {
    let config = EngineConfig::default();
    assert_eq!(config.clip_preview("a".repeat(500)).len(), 500);
}
