use depgraph_di::{key_name, Args, DiResult, InjectKey, Injectable, ServiceDescriptor};
use std::collections::HashSet;

struct Mailer;

impl Injectable for Mailer {
    const KEY: &'static str = "Mailer";

    fn dependencies() -> Vec<InjectKey> {
        vec!["Smtp".into(), ServiceDescriptor::leaf("Templates").into()]
    }

    fn construct(_: &Args) -> DiResult<Self> {
        Ok(Mailer)
    }
}

#[test]
fn names_and_descriptors_canonicalize_to_the_same_key() {
    let descriptor = ServiceDescriptor::leaf("Database");
    let keys: Vec<InjectKey> = vec![
        "Database".into(),
        String::from("Database").into(),
        (&String::from("Database")).into(),
        descriptor.clone().into(),
        (&descriptor).into(),
    ];

    for key in &keys {
        assert_eq!(key_name(key), "Database");
        assert_eq!(key.to_string(), "Database");
    }
    assert!(keys[0].descriptor().is_none());
    assert_eq!(keys[3].descriptor(), Some(&descriptor));
}

#[test]
fn keys_are_case_sensitive() {
    let set: HashSet<String> = ["db", "Db", "DB"]
        .iter()
        .map(|k| key_name(&InjectKey::from(*k)).to_string())
        .collect();
    assert_eq!(set.len(), 3);
}

#[test]
fn injectable_descriptor_carries_ordered_dependencies() {
    let descriptor = Mailer::descriptor();
    assert_eq!(descriptor.key, "Mailer");
    assert_eq!(descriptor.dependency_keys(), vec!["Smtp", "Templates"]);
    assert_eq!(InjectKey::of::<Mailer>(), InjectKey::Name("Mailer".into()));
}

#[test]
fn nested_descriptors_keep_their_identity() {
    let config = ServiceDescriptor::leaf("Config");
    let db = ServiceDescriptor::new("Db", [&config]);
    let repo = ServiceDescriptor::new("Repo", [InjectKey::from(&db), InjectKey::from("Clock")]);

    assert_eq!(repo.dependency_keys(), vec!["Db", "Clock"]);
    assert_eq!(repo.dependencies[0].descriptor().unwrap().dependency_keys(), vec!["Config"]);
}
