//! Compilation unit generation against Environments

use classforge::{
    ApiRegistry, ApiVersion, CommentGenerator, CompilationUnitGenerator, Environment,
    EnvironmentConfig, Error, ExpressionGenerator, FieldGenerator, FixedVersionProvider, Flags,
    MemberName, MethodGenerator, ParameterGenerator, SourceRoot, TypeGenerator, TypeName,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Logger type and factory method differ between framework generations
trait Logging: Send + Sync {
    fn logger_type(&self) -> String;
    fn factory(&self) -> String;
}

struct LegacyLogging;

impl Logging for LegacyLogging {
    fn logger_type(&self) -> String {
        "org.legacy.Log".to_string()
    }

    fn factory(&self) -> String {
        "create".to_string()
    }
}

struct ModernLogging;

impl Logging for ModernLogging {
    fn logger_type(&self) -> String {
        "org.modern.Logger".to_string()
    }

    fn factory(&self) -> String {
        "forClass".to_string()
    }
}

fn env_at(major: u32) -> Environment {
    let legacy: Arc<dyn Logging> = Arc::new(LegacyLogging);
    let modern: Arc<dyn Logging> = Arc::new(ModernLogging);
    let registry = ApiRegistry::new()
        .with_variant(Some(ApiVersion::new(&[1])), legacy)
        .unwrap()
        .with_variant(None, modern)
        .unwrap()
        .with_provider(Box::new(FixedVersionProvider::new(ApiVersion::new(&[major]))));
    Environment::builder()
        .source_root(SourceRoot::new("src").with_file(
            "shop/Priced.java",
            "package shop; public interface Priced { public long total(); void reset() throws java.io.IOException; }",
        ))
        .api_registry(Arc::new(registry))
        .build()
        .unwrap()
}

fn logged_service() -> CompilationUnitGenerator {
    let logger = TypeName::api::<dyn Logging, _>(|api| api.logger_type());
    let factory = MemberName::api::<dyn Logging, _>(|api| api.factory());
    let init = ExpressionGenerator::static_call(
        logger.clone(),
        factory,
        vec![ExpressionGenerator::class_literal(TypeName::named("app.Service"))],
    );
    CompilationUnitGenerator::new("app").type_decl(
        TypeGenerator::class("Service").flags(Flags::PUBLIC).field(
            FieldGenerator::new(logger, "LOG")
                .flags(Flags::PRIVATE | Flags::STATIC | Flags::FINAL)
                .initializer(init),
        ),
    )
}

#[test]
fn test_same_generator_renders_per_environment() {
    let unit = logged_service();
    let legacy = env_at(1);
    let modern = env_at(2);

    let old = unit.generate(Some(&legacy), legacy.config()).unwrap();
    assert_eq!(
        old.source,
        "package app;\n\nimport org.legacy.Log;\n\npublic class Service {\n    private static final Log LOG = Log.create(Service.class);\n}\n"
    );

    let new = unit.generate(Some(&modern), modern.config()).unwrap();
    assert_eq!(
        new.source,
        "package app;\n\nimport org.modern.Logger;\n\npublic class Service {\n    private static final Logger LOG = Logger.forClass(Service.class);\n}\n"
    );
    assert_eq!(old.type_name, new.type_name);
}

#[test]
fn test_api_reference_without_environment_fails() {
    let err = logged_service()
        .generate(None, &EnvironmentConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::ContextRequired(_)));
}

#[test]
fn test_declared_name_wins_over_import() {
    let unit = CompilationUnitGenerator::new("app.util").type_decl(
        TypeGenerator::class("List")
            .flags(Flags::PUBLIC)
            .field(FieldGenerator::new(
                TypeName::parse("java.util.List<java.lang.String>").unwrap(),
                "delegate",
            ))
            .method(MethodGenerator::getter(
                TypeName::parse("java.util.List<java.lang.String>").unwrap(),
                "delegate",
            )),
    );
    let generated = unit.generate(None, &EnvironmentConfig::default()).unwrap();
    assert_eq!(
        generated.source,
        "package app.util;\n\npublic class List {\n    java.util.List<String> delegate;\n\n    public java.util.List<String> getDelegate() {\n        return this.delegate;\n    }\n}\n"
    );
}

#[test]
fn test_implementation_of_resolved_interface() {
    let env = env_at(2);
    let priced = env.resolve("shop.Priced").unwrap();
    let mut generator = TypeGenerator::class("FixedPrice")
        .flags(Flags::PUBLIC | Flags::FINAL)
        .interface_type(TypeName::from(&priced.self_ref()));
    let total = priced.method("total").unwrap();
    generator = generator.method(MethodGenerator::from_method(total));

    let unit = CompilationUnitGenerator::new("shop.impl")
        .header(CommentGenerator::block("Generated"))
        .type_decl(generator);
    let generated = unit.generate(Some(&env), env.config()).unwrap();
    assert_eq!(generated.path(), "shop/impl/FixedPrice.java");
    assert_eq!(
        generated.source,
        "/*\n * Generated\n */\npackage shop.impl;\n\nimport shop.Priced;\n\npublic final class FixedPrice implements Priced {\n    @Override\n    public long total() {\n        return 0L;\n    }\n}\n"
    );

    let reset = priced.method("reset").unwrap();
    let skeleton = CompilationUnitGenerator::new("shop")
        .type_decl(TypeGenerator::class("Resettable").method(MethodGenerator::from_method(reset)));
    let source = skeleton.generate(Some(&env), env.config()).unwrap().source;
    assert!(source.contains("void reset() throws IOException {}"));
    assert!(source.contains("import java.io.IOException;"));
}

#[test]
fn test_line_delimiter_applies_to_whole_unit() {
    let config = EnvironmentConfig::default().with_line_delimiter("\r\n");
    let unit = CompilationUnitGenerator::new("app").type_decl(
        TypeGenerator::interface("Clock").method(
            MethodGenerator::new(TypeName::named("java.time.Instant"), "now")
                .parameter(ParameterGenerator::new(TypeName::named("java.time.ZoneId"), "zone")),
        ),
    );
    let source = unit.generate(None, &config).unwrap().source;
    assert_eq!(
        source,
        "package app;\r\n\r\nimport java.time.Instant;\r\nimport java.time.ZoneId;\r\n\r\ninterface Clock {\r\n    Instant now(ZoneId zone);\r\n}\r\n"
    );
}

#[test]
fn test_unit_with_several_types() {
    let unit = CompilationUnitGenerator::new("app")
        .type_decl(TypeGenerator::enumeration("Mode").constant("ON").constant("OFF"))
        .type_decl(
            TypeGenerator::annotation_type("Tag")
                .flags(Flags::PUBLIC)
                .method(
                    MethodGenerator::new(TypeName::named("java.lang.String"), "value")
                        .default_value(ExpressionGenerator::string_literal("")),
                ),
        );
    let generated = unit.generate(None, &EnvironmentConfig::default()).unwrap();
    assert_eq!(generated.type_name, "Tag");
    assert_eq!(
        generated.source,
        "package app;\n\nenum Mode {\n    ON,\n    OFF\n}\n\npublic @interface Tag {\n    String value() default \"\";\n}\n"
    );
}
