//! Resolution behavior of the shared registry.

use std::sync::Arc;
use std::thread;

use grpc_service_config::{ConfigRegistry, RegistrationHandle, UriPattern};

mod common;
use common::props;

#[test]
fn test_exact_and_wildcard_merge() {
    let reg = ConfigRegistry::default();
    reg.add_or_update("exact", "http://host/a", props(&[("x", "1")]));
    reg.add_or_update("wild", "http://host/*", props(&[("x", "2"), ("y", "3")]));

    assert_eq!(*reg.resolve("http://host/a").unwrap(), props(&[("x", "1"), ("y", "3")]));
    assert_eq!(*reg.resolve("http://host/b").unwrap(), props(&[("x", "2"), ("y", "3")]));
}

#[test]
fn test_three_level_override_chain() {
    let reg = ConfigRegistry::default();
    reg.add_or_update("all", "*", props(&[("a", "all"), ("b", "all"), ("c", "all")]));
    reg.add_or_update("pkg", "helloworld.*", props(&[("b", "pkg"), ("c", "pkg")]));
    reg.add_or_update("svc", "helloworld.Greeter/*", props(&[("c", "svc")]));

    let resolved = reg.resolve("helloworld.Greeter/SayHello").unwrap();
    assert_eq!(*resolved, props(&[("a", "all"), ("b", "pkg"), ("c", "svc")]));

    let resolved = reg.resolve("helloworld.Other/Call").unwrap();
    assert_eq!(*resolved, props(&[("a", "all"), ("b", "pkg"), ("c", "pkg")]));
}

#[test]
fn test_registration_order_does_not_matter() {
    let forward = ConfigRegistry::default();
    forward.add_or_update("g", "http://*", props(&[("x", "1")]));
    forward.add_or_update("s", "http://host/*", props(&[("x", "2")]));

    let reverse = ConfigRegistry::default();
    reverse.add_or_update("s", "http://host/*", props(&[("x", "2")]));
    reverse.add_or_update("g", "http://*", props(&[("x", "1")]));

    assert_eq!(forward.resolve("http://host/a"), reverse.resolve("http://host/a"));
    assert_eq!(*forward.resolve("http://host/a").unwrap(), props(&[("x", "2")]));
}

#[test]
fn test_unrelated_patterns_never_leak() {
    let reg = ConfigRegistry::default();
    let patterns = [
        "a.Svc/Call",
        "a.Svc/*",
        "a.*",
        "b.Svc/*",
        "b.Svc/Call",
        "ab*",
        "http://host/*",
        "http://host/x",
    ];
    for (i, p) in patterns.iter().enumerate() {
        reg.add_or_update(format!("h{i}"), *p, props(&[(*p, "on")]));
    }

    let queries = [
        "a.Svc/Call",
        "a.Svc/Other",
        "a.Other/Call",
        "abc",
        "b.Svc/Call",
        "http://host/x",
        "http://host/y",
        "http://other/x",
        "zzz",
    ];
    for q in queries {
        let resolved = reg.resolve(q).map(|p| (*p).clone()).unwrap_or_default();
        for p in patterns {
            let applies = UriPattern::from(p).matches(q);
            assert_eq!(resolved.contains_key(p), applies, "pattern {p} vs query {q}");
        }
    }
}

#[test]
fn test_no_configuration_resolves_to_none() {
    let reg = ConfigRegistry::default();
    assert!(reg.resolve("anything").is_none());
    reg.add_or_update("h", "exact/only", props(&[("x", "1")]));
    assert!(reg.resolve("exact/onl").is_none());
    assert!(reg.resolve("exact/only/more").is_none());
}

#[test]
fn test_cache_reflects_every_mutation() {
    let reg = ConfigRegistry::default();
    let uri = "http://host/a";

    assert!(reg.resolve(uri).is_none());
    reg.add_or_update("w", "http://host/*", props(&[("x", "1")]));
    assert_eq!(*reg.resolve(uri).unwrap(), props(&[("x", "1")]));

    reg.add_or_update("w", "http://host/*", props(&[("x", "2")]));
    assert_eq!(*reg.resolve(uri).unwrap(), props(&[("x", "2")]));

    reg.add_or_update("e", uri, props(&[("y", "3")]));
    assert_eq!(*reg.resolve(uri).unwrap(), props(&[("x", "2"), ("y", "3")]));

    reg.remove(&RegistrationHandle::from("w"));
    assert_eq!(*reg.resolve(uri).unwrap(), props(&[("y", "3")]));
}

#[test]
fn test_add_does_not_drop_previous_pattern_of_handle() {
    let reg = ConfigRegistry::default();
    reg.add_or_update("h", "old/*", props(&[("x", "1")]));
    reg.add_or_update("h", "new/*", props(&[("x", "2")]));

    assert_eq!(reg.pattern_of(&"h".into()), Some(UriPattern::from("new/*")));
    assert_eq!(*reg.resolve("old/a").unwrap(), props(&[("x", "1")]));

    // Removal only knows the current pattern.
    reg.remove(&"h".into());
    assert!(reg.resolve("new/a").is_none());
    assert_eq!(*reg.resolve("old/a").unwrap(), props(&[("x", "1")]));
}

#[test]
fn test_double_remove_leaves_others() {
    let reg = ConfigRegistry::default();
    reg.add_or_update("a", "a/*", props(&[("x", "1")]));
    reg.add_or_update("b", "b/*", props(&[("x", "2")]));

    let a = RegistrationHandle::from("a");
    reg.remove(&a);
    reg.remove(&a);
    reg.remove(&RegistrationHandle::from("never-registered"));

    assert_eq!(reg.len(), 1);
    assert_eq!(*reg.resolve("b/x").unwrap(), props(&[("x", "2")]));
}

#[test]
fn test_concurrent_readers_and_writers() {
    let reg = Arc::new(ConfigRegistry::default());
    reg.add_or_update("base", "svc/*", props(&[("base", "1")]));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                for i in 0..200 {
                    let handle = format!("w{w}");
                    reg.add_or_update(handle.clone(), format!("svc/{w}/*"), props(&[("round", i.to_string().as_str())]));
                    if i % 3 == 0 {
                        reg.remove(&RegistrationHandle::from(handle));
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|r| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                for _ in 0..500 {
                    let resolved = reg.resolve(&format!("svc/{r}/Call")).unwrap();
                    assert_eq!(resolved.get("base").map(String::as_str), Some("1"));
                }
            })
        })
        .collect();

    for t in writers.into_iter().chain(readers) {
        t.join().unwrap();
    }

    // 199 % 3 != 0, so every writer's last round is still registered.
    for w in 0..4 {
        let resolved = reg.resolve(&format!("svc/{w}/Call")).unwrap();
        assert_eq!(resolved.get("round").map(String::as_str), Some("199"));
    }
}
