// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # classforge
//!
//! Source model and version-aware code generation for Java-shaped languages.
//!
//! ## Core Concept
//!
//! An [`Environment`] is a session over a fixed set of roots. Source roots
//! hold `.java` text (parsed lazily with tree-sitter), binary roots hold
//! pre-compiled declarations as JSON. From one Environment you can:
//!
//! - **Resolve** types by qualified name, identity cached per Environment
//! - **Walk** supertypes, find and override methods with generic substitution
//! - **Read** annotations through typed accessors with declared defaults
//! - **Select** version-specific API variants for the detected framework version
//! - **Generate** compilation units with collision-free imports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use classforge::{Environment, SourceRoot, CompilationUnitGenerator, TypeGenerator};
//!
//! let env = Environment::builder()
//!     .source_root(SourceRoot::from_dir("src/main/java")?)
//!     .build()?;
//!
//! let service = env.resolve("app.Service").expect("declared");
//! for ancestor in env.ancestors(&service) {
//!     println!("{}", ancestor.qualified_name);
//! }
//!
//! let unit = CompilationUnitGenerator::new("app.generated")
//!     .type_decl(TypeGenerator::class("ServiceStub"));
//! let generated = unit.generate(Some(&env), env.config())?;
//! println!("{}:\n{}", generated.path(), generated.source);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  ROOTS (source text / binary JSON)                          │
//! │       │                                                     │
//! │       └──► DeclarationStore ──► RawType (unlinked)          │
//! │                   │                                         │
//! │  ENVIRONMENT      ▼                                         │
//! │       ├──► resolve(name) ──► Arc<Type> (linked, cached)     │
//! │       ├──► annotation::<A>() ──► typed accessor             │
//! │       └──► api::<dyn S>() ──► Arc<dyn S> (version variant)  │
//! │                                                             │
//! │  GENERATORS                                                 │
//! │       └──► render(env, ImportValidator) ──► source text     │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// Core modules
pub mod config;
pub mod decl;
pub mod error;
pub mod util;

// Declarations and model
pub mod model;
pub mod parse;
pub mod store;

// Versioned APIs and annotations
pub mod api;
pub mod managed;

// Code generation
pub mod builder;

// Re-exports
pub use api::{
    ApiRegistry, ApiRequirement, ApiVersion, ApiVersionProvider, ConstantFieldVersionProvider,
    FixedVersionProvider, FnVersionProvider,
};
pub use builder::{
    AnnotationGenerator, CommentGenerator, CompilationUnitGenerator, ExpressionGenerator,
    FieldGenerator, GeneratedUnit, ImportValidator, MemberName, MethodGenerator,
    ParameterGenerator, RenderContext, RenderSession, RenderState, SourceGenerator,
    TypeGenerator, TypeName,
};
pub use config::EnvironmentConfig;
pub use decl::{Flags, MetaValue, RawType, TypeKind, TypeSyntax};
pub use error::{Error, Result};
pub use managed::{
    AnnotationView, ClassName, Deprecated, EnumConstant, FromMetaValue, ManagedAnnotation,
    Retention, RetentionPolicy, SuppressWarnings, Target,
};
pub use model::{
    Annotation, CompilationUnit, Environment, EnvironmentBuilder, Field, Method, Parameter,
    ResolvedMethod, Type, TypeBindings, TypeParameter, TypeRef,
};
pub use parse::{parse_signature, FrontEnd, JavaFrontEnd, ParseOptions};
pub use store::{BinaryRoot, DeclarationSource, DeclarationStore, RootKind, SourceRoot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
