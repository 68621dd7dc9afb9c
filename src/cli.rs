//! CLI argument parsing via `clap`.

use crate::models::token::Category;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tokenguard",
    version,
    about = "Design-token consistency auditor",
    long_about = "Tokenguard scans CSS, TSX and TS sources for hardcoded design values and reports how consistently the token registry is used.\n\nConfiguration precedence: CLI > tokenguard.toml > defaults.",
    after_help = "Examples:\n  tokenguard colors app components\n  tokenguard all --json reports/tokens.json --threshold 0.95\n  tokenguard spacing --fix\n  tokenguard contrast --fg text-primary --bg bg-primary",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Debug logging on stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Default, Clone)]
/// Options shared by every category scan.
pub struct ScanArgs {
    #[arg(help = "Root directories to scan (default: from config, else the repository root)")]
    pub roots: Vec<String>,
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Token registry stylesheet (default: styles/design-tokens.css)")]
    pub registry: Option<String>,
    #[arg(long, help = "Also write the JSON report to this path (relative to the current dir)")]
    pub json: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Rewrite unambiguous spacing/duration literals to tokens")]
    pub fix: bool,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Minimum file compliance rate to pass (0..1, default: 1.0)")]
    pub threshold: Option<f64>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Fail on any violation")]
    pub strict: bool,
    #[arg(long, help = "Worker threads (default: all cores)")]
    pub jobs: Option<usize>,
}

#[derive(Subcommand)]
/// Category scans plus registry utilities.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current tokenguard version.")]
    Version,
    #[command(about = "Audit colour usage (text, background, fill, outline)")]
    Colors(ScanArgs),
    #[command(about = "Audit padding, margin, gap and inset values")]
    Spacing(ScanArgs),
    #[command(about = "Audit font size, family, weight, line height and letter spacing")]
    Typography(ScanArgs),
    #[command(about = "Audit shadows and blur filters")]
    Effects(ScanArgs),
    #[command(about = "Audit border colours and border opacity")]
    Borders(ScanArgs),
    #[command(about = "Audit media-query breakpoints")]
    Breakpoints(ScanArgs),
    #[command(about = "Audit transition and animation timings")]
    Transitions(ScanArgs),
    #[command(
        about = "Run every category scan",
        after_help = "Examples:\n  tokenguard all --strict\n  tokenguard all app --output json"
    )]
    All(ScanArgs),
    /// WCAG contrast of token pairs
    #[command(
        about = "Check WCAG contrast",
        long_about = "Evaluate one foreground/background pair, or every [[contrast.pairs]] entry from the config when no pair is given. Operands are token names or literal colours."
    )]
    Contrast {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Token registry stylesheet")]
        registry: Option<String>,
        #[arg(long, help = "Foreground token or colour")]
        fg: Option<String>,
        #[arg(long, help = "Background token or colour")]
        bg: Option<String>,
        #[arg(long, help = "Threshold kind: text|large (default: text)")]
        kind: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List registry tokens
    #[command(about = "List registered tokens by category")]
    Tokens {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Token registry stylesheet")]
        registry: Option<String>,
        #[arg(long, help = "Only this category (e.g. color, spacing)")]
        category: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

impl Commands {
    /// Categories and options for scan subcommands; `None` otherwise.
    pub fn scan(&self) -> Option<(Vec<Category>, &ScanArgs)> {
        let (cats, args) = match self {
            Commands::Colors(a) => (vec![Category::Color], a),
            Commands::Spacing(a) => (vec![Category::Spacing], a),
            Commands::Typography(a) => (vec![Category::Typography], a),
            Commands::Effects(a) => (vec![Category::Effect], a),
            Commands::Borders(a) => (vec![Category::Border], a),
            Commands::Breakpoints(a) => (vec![Category::Breakpoint], a),
            Commands::Transitions(a) => (vec![Category::Transition], a),
            Commands::All(a) => (crate::extract::scannable_categories(), a),
            _ => return None,
        };
        Some((cats, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_subcommand() {
        let cli = Cli::parse_from([
            "tokenguard", "spacing", "app", "components", "--json", "out.json", "--fix", "--threshold", "0.9",
        ]);
        let (cats, args) = cli.cmd.scan().unwrap();
        assert_eq!(cats, vec![Category::Spacing]);
        assert_eq!(args.roots, vec!["app", "components"]);
        assert_eq!(args.json.as_deref(), Some("out.json"));
        assert!(args.fix);
        assert_eq!(args.threshold, Some(0.9));
    }

    #[test]
    fn test_all_covers_every_scannable_category() {
        let cli = Cli::parse_from(["tokenguard", "-v", "all"]);
        assert!(cli.verbose);
        let (cats, _) = cli.cmd.scan().unwrap();
        assert_eq!(cats.len(), 7);
        assert!(!cats.contains(&Category::ZIndex));
    }
}
