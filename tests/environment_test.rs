//! Environment model over mixed source and binary roots

use classforge::{
    BinaryRoot, Environment, EnvironmentConfig, Flags, SourceRoot, TypeBindings, TypeKind,
    TypeRef,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const RUNTIME: &str = r#"[
    {"name": "Entity", "qualified_name": "rt.Entity", "kind": "class",
     "flags": 1,
     "type_parameters": [{"name": "ID"}],
     "methods": [{"name": "id", "flags": 1, "return_type": {"kind": "named", "name": "ID"}}]},
    {"name": "Map", "qualified_name": "rt.Map", "kind": "interface",
     "type_parameters": [{"name": "K"}, {"name": "V"}],
     "nested": [{"name": "Entry", "qualified_name": "rt.Map.Entry", "kind": "interface"}]}
]"#;

fn sources() -> SourceRoot {
    SourceRoot::new("src")
        .with_file(
            "shop/Order.java",
            r#"package shop;

import rt.Entity;
import java.util.List;

/** An order */
public class Order extends Entity<Long> implements Priced {
    public static final String KIND = "order";

    private List<Line> lines;

    public Order(List<Line> lines) {
        this.lines = lines;
    }

    @Override
    public long total() {
        return 0L;
    }

    public static class Line {
        int quantity;
    }
}

class Audit {}
"#,
        )
        .with_file(
            "shop/Priced.java",
            "package shop; public interface Priced { long total(); }",
        )
        .with_file(
            "shop/Pair.java",
            "package shop; public class Pair<A, B extends Number> { A first; B second; A first() { return first; } }",
        )
}

fn env() -> Environment {
    Environment::builder()
        .source_root(sources())
        .binary_root(BinaryRoot::from_json("runtime", RUNTIME).unwrap())
        .build()
        .unwrap()
}

#[test]
fn test_same_name_same_instance() {
    let env = env();
    let first = env.resolve("shop.Order").unwrap();
    let second = env.resolve("shop.Order").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let nested = env.resolve("shop.Order.Line").unwrap();
    assert!(Arc::ptr_eq(&nested, &env.resolve("shop.Order$Line").unwrap()));
}

#[test]
fn test_identity_shared_across_threads() {
    let env = env();
    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| env.resolve("shop.Pair").unwrap());
        let b = s.spawn(|| env.resolve("shop.Pair").unwrap());
        (a.join().unwrap(), b.join().unwrap())
    });
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_independent_environments_do_not_share() {
    let one = env();
    let two = env();
    let a = one.resolve("shop.Order").unwrap();
    let b = two.resolve("shop.Order").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a, b);
}

#[test]
fn test_missing_type_is_none() {
    let env = env();
    assert!(env.resolve("shop.Invoice").is_none());
    assert!(env.resolve("").is_none());
}

#[test]
fn test_linked_members() {
    let env = env();
    let order = env.resolve("shop.Order").unwrap();
    assert_eq!(order.kind, TypeKind::Class);
    assert!(order.flags.is_public());
    assert_eq!(order.package, "shop");
    assert_eq!(
        order.superclass,
        Some(TypeRef::generic("rt.Entity", vec![TypeRef::class("java.lang.Long")]))
    );
    assert_eq!(order.interfaces, vec![TypeRef::class("shop.Priced")]);
    assert_eq!(order.nested, vec!["shop.Order.Line"]);

    let lines = &order.field("lines").unwrap().type_ref;
    assert_eq!(lines.name(), Some("java.util.List"));
    assert_eq!(lines.args(), &[TypeRef::class("shop.Order.Line")]);

    let kind = order.field("KIND").unwrap();
    assert!(kind.flags.contains(Flags::STATIC | Flags::FINAL));
    assert_eq!(kind.constant, Some(classforge::MetaValue::String("order".into())));

    assert_eq!(order.constructors().count(), 1);
    assert!(order.method("total").unwrap().annotations[0].is("java.lang.Override"));
}

#[test]
fn test_secondary_types_and_packages() {
    let env = env();
    let audit = env.resolve("shop.Audit").unwrap();
    assert_eq!(audit.source_path(), Some("shop/Order.java"));
    assert!(audit.flags.is_package_private());

    let mut names: Vec<String> = env
        .types_in_package("shop")
        .iter()
        .map(|t| t.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Audit", "Order", "Pair", "Priced"]);

    let unit = env.compilation_unit("shop/Order.java").unwrap();
    assert_eq!(unit.types.len(), 2);
    assert_eq!(unit.primary_type().unwrap().name, "Order");
    assert!(unit.source_hash.starts_with("sha256:"));
}

#[test]
fn test_generic_substitution_round_trip() {
    let env = env();
    let order = TypeRef::class("shop.Order");
    assert_eq!(
        env.method_return_type(&order, "id"),
        Some(TypeRef::class("java.lang.Long"))
    );

    let pair = env.resolve("shop.Pair").unwrap();
    let bindings = TypeBindings::bind(&pair, &[TypeRef::class("java.lang.String")]);
    assert_eq!(bindings.get("A"), Some(&TypeRef::class("java.lang.String")));
    assert_eq!(bindings.get("B"), Some(&TypeRef::class("java.lang.Number")));

    let nested = TypeRef::generic(
        "shop.Pair",
        vec![
            TypeRef::generic("shop.Pair", vec![TypeRef::class("java.lang.String")]),
            TypeRef::class("java.lang.Integer"),
        ],
    );
    let inner = env.method_return_type(&nested, "first").unwrap();
    assert_eq!(
        env.method_return_type(&inner, "first"),
        Some(TypeRef::class("java.lang.String"))
    );
}

#[test]
fn test_inherited_and_overridden_members() {
    let env = env();
    let order = env.resolve("shop.Order").unwrap();
    let total = order.method("total").unwrap();
    let overridden = env.find_overridden(&order, total).unwrap();
    assert_eq!(overridden.declaring_type.qualified_name, "shop.Priced");
    assert!(env.is_subtype_of(&order, "rt.Entity"));
    assert!(env.is_subtype_of(&order, "shop.Priced"));

    let ancestors: Vec<String> = env
        .ancestors(&order)
        .iter()
        .map(|t| t.qualified_name.clone())
        .collect();
    assert_eq!(ancestors, vec!["rt.Entity", "shop.Priced"]);
}

#[test]
fn test_binary_nested_type() {
    let env = env();
    let entry = env.resolve("rt.Map$Entry").unwrap();
    assert_eq!(entry.qualified_name, "rt.Map.Entry");
    assert_eq!(entry.declaring_type.as_deref(), Some("rt.Map"));
    assert!(entry.is_interface());
}

#[test]
fn test_binary_only_configuration_skips_sources() {
    let env = Environment::builder()
        .config(EnvironmentConfig::default().with_sources(false))
        .source_root(sources())
        .binary_root(BinaryRoot::from_json("runtime", RUNTIME).unwrap())
        .build()
        .unwrap();
    assert!(env.resolve("shop.Order").is_none());
    assert!(env.resolve("rt.Entity").is_some());
}

#[test]
fn test_method_bodies_on_request() {
    let plain = env();
    let order = plain.resolve("shop.Order").unwrap();
    assert_eq!(order.method("total").unwrap().body, None);

    let with_bodies = Environment::builder()
        .config(EnvironmentConfig::default().with_method_bodies(true))
        .source_root(sources())
        .build()
        .unwrap();
    let order = with_bodies.resolve("shop.Order").unwrap();
    let body = order.method("total").unwrap().body.clone().unwrap();
    assert!(body.contains("return 0L;"));
}

#[test]
fn test_recompute_after_dispose_of_old_instances() {
    let env = env();
    let before = env.resolve("shop.Order").unwrap();
    let audit = env.resolve("shop.Audit").unwrap();
    env.recompute("shop/Order.java");
    let after = env.resolve("shop.Order").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(!Arc::ptr_eq(&audit, &env.resolve("shop.Audit").unwrap()));
    assert!(Arc::ptr_eq(
        &env.resolve("shop.Pair").unwrap(),
        &env.resolve("shop.Pair").unwrap()
    ));
    env.dispose();
}

#[test]
fn test_missing_root_degrades_to_placeholder() {
    let env = Environment::builder()
        .source_root(sources())
        .build()
        .unwrap();
    let order = env.resolve("shop.Order").unwrap();
    let superclass = order.superclass.as_ref().unwrap();
    assert!(superclass.is_unresolved());
    assert_eq!(superclass.name(), Some("rt.Entity"));
    assert_eq!(order.name, "Order");
    assert!(env.is_subtype_of(&order, "shop.Priced"));
    assert_eq!(env.method_return_type(&TypeRef::class("shop.Order"), "id"), None);
}

#[test]
fn test_source_root_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    let shop = dir.path().join("shop");
    std::fs::create_dir_all(&shop).unwrap();
    std::fs::write(
        shop.join("Cart.java"),
        "package shop; public class Cart { int size; }",
    )
    .unwrap();
    std::fs::write(shop.join("notes.txt"), "not a source file").unwrap();
    let config_path = dir.path().join("classforge.yaml");
    std::fs::write(&config_path, "parseMethodBodies: true\n").unwrap();

    let config = EnvironmentConfig::load(&config_path).unwrap();
    assert!(config.parse_method_bodies);
    let root = SourceRoot::from_dir(dir.path()).unwrap();
    assert_eq!(root.paths().collect::<Vec<_>>(), vec!["shop/Cart.java"]);

    let env = Environment::builder()
        .config(config)
        .source_root(root)
        .build()
        .unwrap();
    let cart = env.resolve("shop.Cart").unwrap();
    assert_eq!(cart.field("size").unwrap().type_ref, TypeRef::Primitive { name: "int".into() });
}
