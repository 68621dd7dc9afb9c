//! Tokenguard CLI binary entry point.
//! Resolves configuration, runs the requested scan, prints results, and
//! maps the outcome to an exit code (0 pass, 1 fail, 2 configuration error).

use clap::Parser;
use std::str::FromStr;
use tokenguard::cli::{Cli, Commands};
use tokenguard::config::{self, CliOverrides};
use tokenguard::contrast::{resolve_operand, ContrastPair, PairKind};
use tokenguard::error::ConfigError;
use tokenguard::models::token::Category;
use tokenguard::registry::load_registry;
use tokenguard::{output, scan, utils};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let code = match run(cli.cmd) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            2
        }
    };
    std::process::exit(code);
}

fn run(cmd: Commands) -> Result<i32, ConfigError> {
    if let Some((categories, args)) = cmd.scan() {
        let eff = config::resolve_effective(&CliOverrides {
            repo_root: args.repo_root.clone(),
            registry: args.registry.clone(),
            roots: args.roots.clone(),
            output: args.output.clone(),
            json: args.json.clone(),
            fix: args.fix,
            threshold: args.threshold,
            strict: args.strict,
            jobs: args.jobs,
        })?;
        if eff.config_path.is_none() && eff.output != "json" {
            eprintln!(
                "{} no tokenguard.toml found under {}; using defaults",
                utils::note_prefix(),
                eff.repo_root.display()
            );
        }
        let run = scan::run_scan(&eff.scan_options(categories))?;
        let cwd = std::env::current_dir().unwrap_or_default();
        if let Some(path) = eff.json_path(&cwd) {
            output::write_json(&run.report, &path).map_err(|e| ConfigError::BadConfig {
                path: path.clone(),
                message: format!("cannot write report: {}", e),
            })?;
            if eff.output != "json" {
                eprintln!("{} report written to {}", utils::info_prefix(), path.display());
            }
        }
        output::print_report(&run.report, &run.fixes, &eff.output);
        let pass = run.report.passes(eff.pass_threshold, eff.strict);
        return Ok(if pass { 0 } else { 1 });
    }

    match cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Contrast {
            repo_root,
            registry,
            fg,
            bg,
            kind,
            output,
        } => {
            let eff = config::resolve_effective(&CliOverrides {
                repo_root,
                registry,
                output,
                ..Default::default()
            })?;
            let reg = load_registry(&eff.registry_path(), &eff.registry_options)?;
            let pairs = match (fg, bg) {
                (Some(fg), Some(bg)) => {
                    let kind = match kind.as_deref() {
                        None | Some("text") => PairKind::Text,
                        Some("large") => PairKind::Large,
                        Some(other) => {
                            return Err(ConfigError::BadConfig {
                                path: "--kind".into(),
                                message: format!("expected text|large, got '{}'", other),
                            })
                        }
                    };
                    vec![(fg, bg, kind)]
                }
                (None, None) => eff
                    .pairs
                    .iter()
                    .map(|p| (p.foreground.clone(), p.background.clone(), p.kind))
                    .collect(),
                _ => {
                    return Err(ConfigError::BadConfig {
                        path: "--fg/--bg".into(),
                        message: "give both --fg and --bg, or neither".into(),
                    })
                }
            };
            if pairs.is_empty() {
                eprintln!(
                    "{} no pairs given; pass --fg/--bg or add [[contrast.pairs]] to tokenguard.toml",
                    utils::note_prefix()
                );
                return Ok(0);
            }
            let mut evaluated = Vec::with_capacity(pairs.len());
            for (fg, bg, kind) in pairs {
                let f = resolve_operand(&reg, &fg)?;
                let b = resolve_operand(&reg, &bg)?;
                evaluated.push(ContrastPair::evaluate(fg, f, bg, b, kind, &eff.thresholds));
            }
            output::print_contrast(&evaluated, &eff.output);
            Ok(if evaluated.iter().all(|p| p.passes_aa) { 0 } else { 1 })
        }
        Commands::Tokens {
            repo_root,
            registry,
            category,
            output,
        } => {
            let eff = config::resolve_effective(&CliOverrides {
                repo_root,
                registry,
                output,
                ..Default::default()
            })?;
            let category = category
                .as_deref()
                .map(Category::from_str)
                .transpose()
                .map_err(|message| ConfigError::BadConfig {
                    path: "--category".into(),
                    message,
                })?;
            let reg = load_registry(&eff.registry_path(), &eff.registry_options)?;
            output::print_tokens(&reg, category, &eff.output);
            Ok(0)
        }
        _ => Ok(0),
    }
}
