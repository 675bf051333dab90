//! Reload behaviour of the configuration manager.

mod common;

use std::sync::Arc;

use action_router::config::loader::DeclarationLoader;
use action_router::config::{InMemoryLoader, TomlFileLoader};
use action_router::{ClassRegistry, ConfigError, ConfigurationManager, EngineSettings};

use common::{parse, with_base, write_declarations};

const HOME_V1: &str = r#"
[[packages]]
name = "web"
extends = "default"

[[packages.actions]]
name = "home"
class = "HomeV1"
"#;

const HOME_V2: &str = r#"
[[packages]]
name = "web"
extends = "default"

[[packages.actions]]
name = "home"
class = "HomeV2"

[[packages.actions]]
name = "about"
"#;

/// A loader whose declarations can be swapped from the test.
#[derive(Debug, Clone)]
struct SharedLoader(Arc<InMemoryLoader>);

impl DeclarationLoader for SharedLoader {
    fn source(&self) -> &str {
        self.0.source()
    }

    fn load(&self, store: &mut action_router::store::DeclarationStore) -> Result<(), ConfigError> {
        self.0.load(store)
    }

    fn needs_reload(&self) -> bool {
        self.0.needs_reload()
    }
}

fn shared_manager(src: &str) -> (ConfigurationManager, Arc<InMemoryLoader>) {
    let loader = Arc::new(InMemoryLoader::new("memory", parse(src)));
    let manager = ConfigurationManager::load(
        vec![Box::new(SharedLoader(loader.clone())) as Box<dyn DeclarationLoader>],
        Arc::new(ClassRegistry::permissive()),
        EngineSettings::default(),
    )
    .unwrap();
    (manager, loader)
}

#[test]
fn test_reload_if_needed_picks_up_changes() {
    let (manager, loader) = shared_manager(&with_base(HOME_V1));
    assert!(!manager.needs_reload());
    assert!(!manager.reload_if_needed().unwrap());
    assert_eq!(manager.resolve("", "home").unwrap().class_name, "HomeV1");

    loader.replace(parse(&with_base(HOME_V2)));
    assert!(manager.needs_reload());
    assert!(manager.reload_if_needed().unwrap());
    assert_eq!(manager.resolve("", "home").unwrap().class_name, "HomeV2");
    assert!(manager.resolve("", "about").is_some());
}

#[test]
fn test_old_snapshot_survives_reload() {
    let (manager, loader) = shared_manager(&with_base(HOME_V1));
    let before = manager.snapshot();

    loader.replace(parse(&with_base(HOME_V2)));
    manager.reload().unwrap();

    assert_eq!(before.resolve("", "home").unwrap().class_name, "HomeV1");
    assert!(before.resolve("", "about").is_none());
    assert_eq!(manager.snapshot().action_count(), 2);
}

#[test]
fn test_failed_reload_keeps_previous_snapshot() {
    let (manager, loader) = shared_manager(&with_base(HOME_V1));

    loader.replace(parse(
        r#"
[[packages]]
name = "web"
default_interceptor_ref = "missing"

[[packages.actions]]
name = "home"
"#,
    ));
    let err = manager.reload().unwrap_err();
    assert!(matches!(err, ConfigError::UnresolvedInterceptorReference { .. }));
    assert_eq!(manager.resolve("", "home").unwrap().class_name, "HomeV1");
}

#[test]
fn test_duplicate_package_across_sources() {
    let err = common::try_manager(&[
        ("one.toml", "[[packages]]\nname = \"web\""),
        ("two.toml", "[[packages]]\nname = \"web\""),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicatePackage { name, .. } if name == "web"));
}

#[test]
fn test_duplicate_package_within_one_source() {
    let src = with_base(
        r#"
[[packages]]
name = "web"
extends = "default"

[[packages.actions]]
name = "first"

[[packages]]
name = "web"
extends = "default"

[[packages.actions]]
name = "second"
"#,
    );
    let err = common::try_manager(&[("app.toml", &src)]).unwrap_err();
    match err {
        ConfigError::DuplicatePackage {
            name,
            location,
            existing,
        } => {
            assert_eq!(name, "web");
            assert_ne!(location, existing);
            assert_eq!(&*location.source, "app.toml");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_file_loaders_combine_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_declarations(dir.path(), "base.toml", common::BASE);
    let web = write_declarations(dir.path(), "web.toml", HOME_V1);

    let manager = ConfigurationManager::load(
        vec![
            Box::new(TomlFileLoader::new(&web)) as Box<dyn DeclarationLoader>,
            Box::new(TomlFileLoader::new(&base)),
        ],
        Arc::new(ClassRegistry::permissive()),
        EngineSettings::default(),
    )
    .unwrap();
    assert!(!manager.needs_reload());

    let home = manager.resolve("", "home").unwrap();
    assert_eq!(home.class_name, "HomeV1");
    assert_eq!(home.interceptor_names(), vec!["a", "b", "c"]);
}

#[test]
fn test_unreadable_file_fails_load() {
    let err = ConfigurationManager::load(
        vec![Box::new(TomlFileLoader::new("/nonexistent/app.toml")) as Box<dyn DeclarationLoader>],
        Arc::new(ClassRegistry::permissive()),
        EngineSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_concurrent_readers_see_complete_snapshots() {
    let (manager, loader) = shared_manager(&with_base(HOME_V1));
    let manager = Arc::new(manager);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = manager.snapshot();
                    let home = snapshot.resolve("", "home").unwrap();
                    let has_about = snapshot.resolve("", "about").is_some();
                    assert_eq!(home.class_name == "HomeV2", has_about);
                }
            })
        })
        .collect();

    for version in [HOME_V2, HOME_V1, HOME_V2] {
        loader.replace(parse(&with_base(version)));
        manager.reload().unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
}

#[tokio::test]
async fn test_watcher_reloads_on_file_change() {
    use action_router::config::{ConfigWatcher, ReloadEvent};
    use std::time::Duration;

    let dir = tempfile::tempdir().unwrap();
    let path = write_declarations(dir.path(), "app.toml", &with_base(HOME_V1));
    let manager = Arc::new(
        ConfigurationManager::load(
            vec![Box::new(TomlFileLoader::new(&path)) as Box<dyn DeclarationLoader>],
            Arc::new(ClassRegistry::permissive()),
            EngineSettings::default(),
        )
        .unwrap(),
    );

    let (watcher, mut events) = ConfigWatcher::new(vec![path.clone()], manager.clone());
    let _watcher = watcher.run().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(&path, with_base(HOME_V2)).unwrap();

    let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = events.recv().await {
            if event == (ReloadEvent::Reloaded { actions: 2 }) {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    assert!(reloaded);
    assert_eq!(manager.resolve("", "home").unwrap().class_name, "HomeV2");
}
