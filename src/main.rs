//! Govgate CLI - Repository governance gate
//!
//! Commands:
//!   check    - Run the governance checks against a repository (default)
//!   schema   - Print JSON schema for an output type
//!   version  - Print version

use govgate::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Reports go to stdout, logs to stderr; silent unless RUST_LOG says so
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(String::as_str) {
        None => cmd_check(&[]),
        Some("check") => cmd_check(&args[2..]),
        Some("schema") => cmd_schema(&args[2..]),
        Some("version" | "--version" | "-v") => {
            println!("govgate {}", VERSION);
            Ok(())
        }
        Some("help" | "--help" | "-h") => {
            print_usage();
            Ok(())
        }
        // a leading option belongs to the default command
        Some(flag) if flag.starts_with("--") => cmd_check(&args[1..]),
        Some(cmd) => {
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
Govgate - Repository governance gate

USAGE:
    govgate [COMMAND] [OPTIONS]

COMMANDS:
    check                Run the governance checks (default when omitted)
    schema [name]        Print JSON schema for an output type
    version              Print version

OPTIONS:
    --root <dir>         Repository root to check (default: current directory)
    --json               JSON output format (check)

ENVIRONMENT:
    GOVERNANCE_DIFF_MODE            Force 'staged' or 'working-tree' diff mode
    GITHUB_BASE_SHA, GITHUB_SHA     When both set, compare the two revisions
    CI                              Non-empty selects commit-range mode by default
    ALLOW_LEGACY_PATH_EDITS         'true' waives frozen legacy path errors
    ALLOW_DEPRECATED_ROOT_CHANGES   'true' waives deprecated root errors
    ALLOW_SHARED_FOUNDATION_CHANGE  'true' waives missing-ADR errors
    STRICT_DEPRECATED_ROOTS         'true' escalates residual-file warnings
    RUST_LOG                        Log filter, logs go to stderr

EXAMPLES:
    govgate
    GOVERNANCE_DIFF_MODE=staged govgate check
    govgate check --root ../service-repo --json
"#
    );
}

fn cmd_check(args: &[String]) -> Result<()> {
    let json_output = args.contains(&"--json".to_string());
    let root = parse_root_arg(args).unwrap_or_else(|| PathBuf::from("."));

    let env = env_snapshot();
    let tables = effective_tables(&root)?;
    let report = gate::run(&root, &env, &tables);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_report());
    }

    if report.passed() {
        Ok(())
    } else {
        Err("Repository governance checks failed".into())
    }
}

fn cmd_schema(args: &[String]) -> Result<()> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: report, result, config");
            Ok(())
        }
        "report" => print_schema::<GateReport>(),
        "result" => print_schema::<ValidationResult>(),
        "config" => print_schema::<GovernanceConfig>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn parse_root_arg(args: &[String]) -> Option<PathBuf> {
    for (i, arg) in args.iter().enumerate() {
        if arg == "--root" || arg == "-C" {
            if let Some(path) = args.get(i + 1) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}
