//! Integration tests for the `Config` contract across every store.
//!
//! These tests drive the stores through `dyn Config` only, checking the
//! behavior callers can rely on regardless of which store they picked.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use cfgkit::{
    CastError, Config, ConfigError, Driver, EnvConfig, JsonConfig, MapEnv, MemoryConfig, Value,
    open,
};
use serde_json::json;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    stores: Vec<(&'static str, Box<dyn Config>)>,
}

/// One store of each kind, all defining `app.title` / `APP_TITLE`.
fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();

    let env_file = dir.path().join("app.env");
    fs::write(&env_file, "APP_TITLE=\"My App\"\n").unwrap();

    let json_file = dir.path().join("app.json");
    fs::write(&json_file, r#"{"app": {"title": "My App"}}"#).unwrap();

    let stores: Vec<(&'static str, Box<dyn Config>)> = vec![
        (
            "memory",
            Box::new(MemoryConfig::new([("app.title", "My App")])) as Box<dyn Config>,
        ),
        (
            "env",
            Box::new(EnvConfig::with_environment(MapEnv::default(), [&env_file]).unwrap())
                as Box<dyn Config>,
        ),
        (
            "json",
            Box::new(JsonConfig::new([&json_file]).unwrap()) as Box<dyn Config>,
        ),
    ];

    Fixture { _dir: dir, stores }
}

fn source_key(name: &str) -> &'static str {
    if name == "env" { "APP_TITLE" } else { "app.title" }
}

#[test]
fn test_source_values_cast_for_every_store() {
    let fixture = fixture();
    for (name, store) in &fixture.stores {
        let title = store.cast(source_key(name)).string();
        assert_eq!(title.unwrap(), "My App", "store: {name}");
    }
}

#[test]
fn test_set_wins_over_source_for_every_store() {
    let fixture = fixture();
    for (name, store) in &fixture.stores {
        let key = source_key(name);
        store.set(key, json!("Override"));

        assert_eq!(store.get(key), Some(json!("Override")), "store: {name}");
        assert!(store.exists(key), "store: {name}");
    }
}

#[test]
fn test_missing_key_is_absence_for_every_store() {
    let fixture = fixture();
    for (name, store) in &fixture.stores {
        assert_eq!(store.get("_CFGKIT_NOT_DEFINED"), None, "store: {name}");
        assert!(!store.exists("_CFGKIT_NOT_DEFINED"), "store: {name}");
        assert!(
            matches!(
                store.cast("_CFGKIT_NOT_DEFINED").string(),
                Err(CastError::Missing)
            ),
            "store: {name}"
        );
    }
}

#[test]
fn test_load_after_set_keeps_overrides_for_every_store() {
    let fixture = fixture();
    for (name, store) in &fixture.stores {
        store.set("runtime.flag", json!(true));
        store.load().unwrap();
        assert!(store.cast("runtime.flag").bool().unwrap(), "store: {name}");
    }
}

#[test]
fn test_open_selects_driver() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app.json");
    let db = dir.path().join("db.json");
    fs::write(&app, r#"{"title": "My App"}"#).unwrap();
    fs::write(&db, r#"{"name": "my_app"}"#).unwrap();

    let store = open(Driver::Json, vec![app, db]).unwrap();
    assert_eq!(store.cast("app.title").string().unwrap(), "My App");
    assert_eq!(store.cast("db.name").string().unwrap(), "my_app");
}

#[test]
fn test_open_reports_load_errors() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{").unwrap();

    match open(Driver::Json, vec![broken.clone()]) {
        Err(ConfigError::FileParse { path, .. }) => assert_eq!(path, broken),
        Err(other) => panic!("expected FileParse, got {other}"),
        Ok(_) => panic!("expected FileParse, got a store"),
    }
}

#[test]
fn test_concurrent_readers_never_see_partial_reload() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app.json");
    let db = dir.path().join("db.json");
    fs::write(&app, r#"{"version": 1}"#).unwrap();
    fs::write(&db, r#"{"version": 1}"#).unwrap();

    let store: Arc<dyn Config> = Arc::new(JsonConfig::new([&app, &db]).unwrap());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    assert!(store.exists("app.version"));
                    assert!(store.exists("db.version"));
                    let version = store.cast("app.version").i64().unwrap();
                    assert!(version == 1 || version == 2);
                }
            })
        })
        .collect();

    fs::write(&app, r#"{"version": 2}"#).unwrap();
    fs::write(&db, r#"{"version": 2}"#).unwrap();
    for _ in 0..20 {
        store.load().unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.cast("db.version").i64().unwrap(), 2);
}

#[test]
fn test_concurrent_writers_all_land() {
    let store: Arc<dyn Config> = Arc::new(MemoryConfig::default());

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..50 {
                    store.set(&format!("w{i}.k{j}"), Value::from(i * 100 + j));
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    for i in 0..8 {
        for j in 0..50 {
            let key = format!("w{i}.k{j}");
            assert_eq!(store.cast(&key).i64().unwrap(), i64::from(i * 100 + j));
        }
    }
}

#[test]
fn test_deserialize_namespaced_section() {
    #[derive(Debug, serde::Deserialize)]
    struct Database {
        name: String,
        pool: Option<u32>,
    }

    let dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = ["app", "db"]
        .iter()
        .map(|stem| dir.path().join(format!("{stem}.json")))
        .collect();
    fs::write(&files[0], r#"{"title": "My App"}"#).unwrap();
    fs::write(&files[1], r#"{"name": "my_app", "pool": 8}"#).unwrap();

    let store = JsonConfig::new(files).unwrap();
    let db: Database = store.cast("db").deserialize().unwrap();
    assert_eq!(db.name, "my_app");
    assert_eq!(db.pool, Some(8));
}
