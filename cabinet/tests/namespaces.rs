use std::collections::HashMap;

use cabinet::env::{Environment, LazyEnvironment};
use cabinet::primitives::{Capability, StructureError, Value};
use cabinet::registry::{Base, Entry, Namespace, Registry};
use cabinet::{Error, Result};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

fn base_config(registry: &Registry) -> Result<Namespace> {
    let main = registry.section("Main").member("DEBUG", false).build()?;
    registry.config("Config").nested(main).build()
}

#[test]
fn prefetch_reports_every_missing_key() {
    init_tracing();
    let env = Environment::new(source(&[("DEBUG", "true")]));
    let lazy = env.lazy();
    let registry = Registry::new();

    let config = registry
        .hybrid("Config")
        .member("API_HOST", lazy.str("HOST", None))
        .member("API_PORT", lazy.int("PORT", None))
        .member("DEBUG", env.bool("DEBUG", None).unwrap())
        .build()
        .unwrap();

    let err = config.prefetch().expect_err("two keys are missing");
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(
        err.to_string(),
        "Failed to prefetch:\n- Config.API_HOST: 'HOST' does not exist\n- Config.API_PORT: 'PORT' does not exist"
    );
    assert_eq!(config.get_attr("DEBUG").unwrap(), Value::Bool(true));
}

#[test]
fn eager_environment_fails_while_defining() {
    init_tracing();
    let env = Environment::new(source(&[]));
    let err = env.str("HOST", None).expect_err("missing key");
    assert!(err.is_environment());
    assert_eq!(err.to_string(), "'HOST' does not exist");
}

#[test]
fn overriding_never_mutates_the_base() {
    init_tracing();
    let registry = Registry::new();
    let config = base_config(&registry).unwrap();

    let main = registry
        .section("Main")
        .member("DEBUG", true)
        .member("TZ", "UTC")
        .build()
        .unwrap();
    let another = registry.derive("AnotherConfig", [&config]).nested(main).build().unwrap();

    let base_main = config.get_attr("Main").unwrap().into_namespace().unwrap();
    let derived_main = another.get_attr("Main").unwrap().into_namespace().unwrap();
    assert_ne!(base_main, derived_main);
    assert_eq!(base_main.get_attr("DEBUG").unwrap(), Value::Bool(false));
    assert_eq!(derived_main.get_attr("DEBUG").unwrap(), Value::Bool(true));
    assert_eq!(derived_main.get_attr("TZ").unwrap(), Value::from("UTC"));

    let err = base_main.get_attr("TZ").expect_err("not declared in the base");
    assert!(matches!(
        err,
        Error::Structure(StructureError::MissingMember { .. })
    ));
    assert_eq!(err.to_string(), "'TZ' does not exist in <Config.Main>");
}

#[test]
fn plain_inheritance_shares_nested_sections() {
    init_tracing();
    let registry = Registry::new();
    let config = base_config(&registry).unwrap();
    let another = registry.derive("AnotherConfig", [&config]).build().unwrap();

    assert_eq!(config.get_attr("Main").unwrap(), another.get_attr("Main").unwrap());
    assert!(another.inherits_from(&config));
    assert!(another.has_capability(Capability::Config));
    assert!(!another.has_capability(Capability::Section));
}

#[test]
fn first_base_wins() {
    init_tracing();
    let registry = Registry::new();
    let first_main = registry
        .section("Main")
        .member("DEBUG", true)
        .member("HOST", "localhost")
        .build()
        .unwrap();
    let first = registry.config("Config").nested(first_main).build().unwrap();
    let second_main = registry
        .section("Main")
        .member("DEBUG", false)
        .member("PORT", 5000)
        .build()
        .unwrap();
    let second = registry.config("AnotherConfig").nested(second_main).build().unwrap();

    let inherited = registry
        .derive("InheritedConfig", [&first, &second])
        .build()
        .unwrap();
    let main = inherited.get_attr("Main").unwrap().into_namespace().unwrap();

    assert_eq!(main.get_attr("DEBUG").unwrap(), Value::Bool(true));
    assert_eq!(main.get_attr("HOST").unwrap(), Value::from("localhost"));
    assert!(main.get_attr("PORT").is_err());
}

#[test]
fn inherited_members_keep_their_order() {
    init_tracing();
    let registry = Registry::new();
    let first = registry.section("First").build().unwrap();
    let config = registry.config("Config").nested(first).build().unwrap();
    let second = registry.section("Second").build().unwrap();
    let another = registry.derive("AnotherConfig", [&config]).nested(second).build().unwrap();

    assert_eq!(another.len(), 2);
    assert_eq!(another.keys().collect::<Vec<_>>(), ["First", "Second"]);
    assert!(another.contains("First"));
    assert!(!another.contains("Third"));
}

#[test]
fn foreign_base_is_rejected() {
    init_tracing();
    let registry = Registry::new();
    let err = registry
        .derive("Config", [Base::Config, Base::Foreign("<class 'dict'>".to_owned())])
        .build()
        .expect_err("dict is not a namespace");
    assert_eq!(err.to_string(), "Attempted to inherit <class 'dict'>");
}

#[test]
fn computed_member_reporting_missing_sibling() {
    init_tracing();
    let registry = Registry::new();
    let main = registry
        .section("Main")
        .computed("URL", |ns| {
            let host = ns.get_attr("HOST")?;
            Ok(format!("http://{host}"))
        })
        .build()
        .unwrap();

    let err = main.get_attr("URL").expect_err("HOST is not declared");
    assert!(err.is_structure());
    assert_eq!(
        err.to_string(),
        "Failed to compute 'URL' in <Main>: 'HOST' does not exist in <Main>"
    );
}

#[test]
fn computed_member_combining_lazy_values() {
    init_tracing();
    let env = LazyEnvironment::new(source(&[("DB_HOST", "db.internal"), ("DB_PORT", "5432")]))
        .with_prefix("DB_");
    let registry = Registry::new();
    let database = registry
        .section("Database")
        .member("HOST", env.str("HOST", None))
        .member("PORT", env.int("PORT", None))
        .computed("DSN", |ns| -> anyhow::Result<String> {
            Ok(format!(
                "postgres://{}:{}",
                ns.get_attr("HOST")?.as_value().and_then(Value::as_str).unwrap_or_default(),
                ns.get_attr("PORT")?
            ))
        })
        .build()
        .unwrap();

    database.prefetch().unwrap();
    assert_eq!(
        database.get_attr("DSN").unwrap(),
        Value::from("postgres://db.internal:5432")
    );
}

#[test]
fn empty_namespace_renders_an_ellipsis() {
    init_tracing();
    let registry = Registry::new();
    let empty = registry.section("Name").build().unwrap();
    assert_eq!(empty.to_string(), "class Name:\n    ...");
}

#[test]
fn resolved_values_export_as_json() {
    init_tracing();
    let registry = Registry::new();
    let main = registry
        .section("Main")
        .member("HOST", "localhost")
        .member("PORT", 8080)
        .member("DEBUG", false)
        .member("TAGS", vec![Value::from("a"), Value::from("b")])
        .member("TZ", ())
        .build()
        .unwrap();

    let exported: serde_json::Map<String, serde_json::Value> = main
        .items()
        .unwrap()
        .into_iter()
        .filter_map(|(name, entry)| entry.into_value().map(|value| (name, value)))
        .map(|(name, value)| Ok((name, serde_json::to_value(value)?)))
        .collect::<serde_json::Result<_>>()
        .unwrap();

    assert_eq!(
        serde_json::Value::Object(exported),
        serde_json::json!({
            "HOST": "localhost",
            "PORT": 8080,
            "DEBUG": false,
            "TAGS": ["a", "b"],
            "TZ": null,
        })
    );
}

#[test]
fn frozen_namespace_rejects_every_write() {
    init_tracing();
    let registry = Registry::new();
    let config = base_config(&registry).unwrap();
    let replacement = registry.section("Main").build().unwrap();

    for name in ["Main", "Unknown"] {
        assert!(config.set_attr(name, replacement.clone()).is_err());
        assert!(config.set_item(name, Entry::from(1)).is_err());
        assert!(config.del_attr(name).is_err());
        assert!(config.del_item(name).is_err());
    }
    assert_eq!(config.len(), 1);
}
