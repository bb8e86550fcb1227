//! classforge CLI - Command-line interface
//!
//! Commands:
//!   inspect   - Print the resolved model of a type as JSON
//!   packages  - List the packages of a source tree
//!   schema    - Print the JSON schema of the configuration file
//!   version   - Print the version

use classforge::*;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("CLASSFORGE_LOG"))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "inspect" => cmd_inspect(&args[2..]),
        "packages" => cmd_packages(&args[2..]),
        "schema" => cmd_schema(),
        "version" | "--version" | "-v" => {
            println!("classforge {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
classforge - Source model and version-aware code generation

USAGE:
    classforge <COMMAND> [OPTIONS]

COMMANDS:
    inspect <source-dir> <qualified-name>   Print the resolved type as JSON
    packages <source-dir>                   List packages declared under a source tree
    schema                                  Print the configuration JSON schema
    version                                 Print the version

OPTIONS:
    --binary <file.json>    Add a binary root (repeatable)
    --config <file>         Environment configuration (YAML or JSON)
    --bodies                Keep method bodies in the model

ENVIRONMENT:
    CLASSFORGE_LOG          Log filter, e.g. classforge=debug

EXAMPLES:
    classforge inspect src/main/java com.acme.OrderService
    classforge inspect src --binary jdk.json com.acme.Order
    CLASSFORGE_LOG=debug classforge packages src/main/java
"#
    );
}

/// Positional arguments plus the environment described by the options
fn environment(args: &[String]) -> Result<(Vec<String>, Environment)> {
    let mut positional = Vec::new();
    let mut binaries = Vec::new();
    let mut config = EnvironmentConfig::default();
    let mut bodies = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--binary" => {
                let path = iter.next().ok_or("--binary needs a file")?;
                binaries.push(path.clone());
            }
            "--config" => {
                let path = iter.next().ok_or("--config needs a file")?;
                config = EnvironmentConfig::load(Path::new(path))?;
            }
            "--bodies" => bodies = true,
            _ => positional.push(arg.clone()),
        }
    }
    if bodies {
        config = config.with_method_bodies(true);
    }

    let source_dir = positional.first().ok_or("missing <source-dir>")?;
    let mut builder = Environment::builder()
        .config(config)
        .source_root(SourceRoot::from_dir(Path::new(source_dir))?);
    for path in &binaries {
        let json = std::fs::read_to_string(path)?;
        builder = builder.binary_root(BinaryRoot::from_json(path, &json)?);
    }
    Ok((positional, builder.build()?))
}

fn cmd_inspect(args: &[String]) -> Result<()> {
    let (positional, env) = environment(args)?;
    let name = positional
        .get(1)
        .ok_or("Usage: classforge inspect <source-dir> <qualified-name>")?;
    let ty = env
        .resolve(name)
        .ok_or_else(|| format!("type '{}' not found", name))?;
    println!("{}", serde_json::to_string_pretty(&*ty)?);
    Ok(())
}

fn cmd_packages(args: &[String]) -> Result<()> {
    let (_, env) = environment(args)?;
    for package in env.store().packages() {
        let count = env.types_in_package(&package).len();
        println!("{} ({} types)", if package.is_empty() { "<default>" } else { package.as_str() }, count);
    }
    Ok(())
}

fn cmd_schema() -> Result<()> {
    println!("{}", EnvironmentConfig::json_schema()?);
    Ok(())
}
