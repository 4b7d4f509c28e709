use std::path::{Path, PathBuf};

use config::Map;
use docjoin::document::Document;
use docjoin::error::DocjoinError;
use docjoin::settings::{DEFAULT_MAX_DEPTH, Settings};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

// an explicit, empty environment keeps ambient DOCJOIN_* variables out
fn quiet() -> Option<Map<String, String>> {
    Some(Map::new())
}

fn environment(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn defaults_without_file() {
    assert_eq!(Settings::default().max_depth(), DEFAULT_MAX_DEPTH);
    let settings = Settings::load_from(None, quiet()).expect("settings load");
    assert_eq!(settings, Settings::default());
}

#[test]
fn missing_file_is_not_an_error() {
    let settings = Settings::load_from(Some(&data("absent.toml")), quiet()).expect("settings load");
    assert_eq!(settings.max_depth(), DEFAULT_MAX_DEPTH);
}

#[test]
fn file_overrides_defaults() {
    let settings = Settings::load_from(Some(&data("docjoin.toml")), quiet()).expect("settings load");
    assert_eq!(settings.max_depth(), 3);
}

#[test]
fn environment_overrides_file() {
    let env = environment(&[("DOCJOIN_MAX_DEPTH", "8"), ("OTHER_MAX_DEPTH", "1")]);
    let settings = Settings::load_from(Some(&data("docjoin.toml")), env).expect("settings load");
    assert_eq!(settings.max_depth(), 8);

    let env = environment(&[("DOCJOIN_MAX_DEPTH", "5")]);
    let settings = Settings::load_from(None, env).expect("settings load");
    assert_eq!(settings.max_depth(), 5);
}

#[test]
fn malformed_environment_value_is_a_settings_error() {
    let env = environment(&[("DOCJOIN_MAX_DEPTH", "deep")]);
    let err = Settings::load_from(None, env).unwrap_err();
    assert!(matches!(err, DocjoinError::Configuration(_)), "{:?}", err);
}

#[test]
fn documents_read_from_disk() {
    let read = Document::read(data("clients.json")).expect("document read");
    let inline = Document::from(&include_bytes!("data/clients.json")[..]);
    assert_eq!(read.id(), inline.id());
    assert_eq!(read.bytes(), inline.bytes());

    let err = Document::read(data("absent.json")).unwrap_err();
    match err {
        DocjoinError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected an I/O error, got {:?}", other),
    }
}
