//! Typed annotation access with declared defaults

use classforge::{
    AnnotationView, ClassName, Environment, Error, ManagedAnnotation, SourceRoot,
};
use pretty_assertions::assert_eq;

const SOURCES: &[(&str, &str)] = &[
    (
        "meta/Describe.java",
        r#"package meta;

public @interface Describe {
    String value() default "N/A";
    int priority() default 5;
    String[] tags() default {};
    Class<?> owner() default Object.class;
}
"#,
    ),
    (
        "app/Plain.java",
        r#"package app;

import meta.Describe;

@Describe
public class Plain {
    @Describe("X")
    void explicit() {}

    @Describe(tags = "solo", priority = 1)
    void tagged() {}

    @Describe(priority = "high")
    void broken() {}
}
"#,
    ),
];

fn env() -> Environment {
    let mut root = SourceRoot::new("src");
    for (path, text) in SOURCES {
        root.add_file(*path, *text);
    }
    Environment::builder().source_root(root).build().unwrap()
}

/// Hand-written accessor for `@meta.Describe`
struct Describe<'a> {
    view: AnnotationView<'a>,
}

impl<'a> ManagedAnnotation<'a> for Describe<'a> {
    const TYPE_NAME: &'static str = "meta.Describe";

    fn from_view(view: AnnotationView<'a>) -> Self {
        Self { view }
    }
}

impl Describe<'_> {
    fn value(&self) -> classforge::Result<String> {
        self.view.get("value", None)
    }

    fn priority(&self) -> classforge::Result<i32> {
        self.view.get("priority", None)
    }

    fn tags(&self) -> classforge::Result<Vec<String>> {
        self.view.get("tags", None)
    }

    fn owner(&self) -> classforge::Result<ClassName> {
        self.view.get("owner", None)
    }
}

#[test]
fn test_declared_default_applies() {
    let env = env();
    let plain = env.resolve("app.Plain").unwrap();
    let describe: Describe = env.annotation(&plain.annotations).unwrap();
    assert_eq!(describe.value().unwrap(), "N/A");
    assert_eq!(describe.priority().unwrap(), 5);
    assert!(describe.tags().unwrap().is_empty());
    assert_eq!(describe.owner().unwrap(), ClassName("Object".into()));
}

#[test]
fn test_explicit_value_overrides_default() {
    let env = env();
    let plain = env.resolve("app.Plain").unwrap();
    let explicit = plain.method("explicit").unwrap();
    let describe: Describe = env.annotation(&explicit.annotations).unwrap();
    assert_eq!(describe.value().unwrap(), "X");
    assert!(describe.view.is_explicit("value"));
    assert!(!describe.view.is_explicit("priority"));
}

#[test]
fn test_scalar_for_array_element() {
    let env = env();
    let plain = env.resolve("app.Plain").unwrap();
    let tagged = plain.method("tagged").unwrap();
    let describe: Describe = env.annotation(&tagged.annotations).unwrap();
    assert_eq!(describe.tags().unwrap(), vec!["solo"]);
    assert_eq!(describe.priority().unwrap(), 1);
    assert_eq!(describe.value().unwrap(), "N/A");
}

#[test]
fn test_wrong_literal_kind_is_a_mismatch() {
    let env = env();
    let plain = env.resolve("app.Plain").unwrap();
    let broken = plain.method("broken").unwrap();
    let describe: Describe = env.annotation(&broken.annotations).unwrap();
    match describe.priority() {
        Err(Error::MetadataTypeMismatch { element, expected, found }) => {
            assert_eq!(element, "@Describe.priority");
            assert_eq!(expected, "int");
            assert_eq!(found, "string");
        }
        other => panic!("expected a mismatch, got {:?}", other),
    }
}

#[test]
fn test_without_environment_defaults_are_unknown() {
    let env = env();
    let plain = env.resolve("app.Plain").unwrap();
    let describe = Describe::find(&plain.annotations, None).unwrap();
    assert_eq!(describe.value().unwrap(), "");
    assert_eq!(describe.view.get("value", Some("fallback".to_string())).unwrap(), "fallback");
}
