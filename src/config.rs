//! Configuration discovery and effective settings resolution.
//!
//! Tokenguard reads `tokenguard.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `registry`: `styles/design-tokens.css`
//! - `roots`: `["."]`
//! - `output`: `human`
//! - `pass_threshold`: `1.0`, `strict`: false
//! - `include`: `**/*.css`, `**/*.tsx`, `**/*.ts`
//! - `component_patterns`: `**/*.module.css`, `**/components/**`
//! - `required_categories`: `color`, `spacing`
//! - `[border] min_opacity = 0.12`, `[color] max_delta_e = 12.0`
//! - `[contrast] large = 3.0`, `text = 4.5`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::classify::Policy;
use crate::contrast::{PairKind, Thresholds};
use crate::error::ConfigError;
use crate::models::token::Category;
use crate::registry::RegistryOptions;
use crate::scan::ScanOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = ["tokenguard.toml", "tokenguard.yaml", "tokenguard.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
pub struct BorderCfg {
    pub min_opacity: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ColorCfg {
    pub max_delta_e: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
/// A foreground/background pair checked by `tokenguard contrast`.
pub struct PairCfg {
    pub foreground: String,
    pub background: String,
    #[serde(default)]
    pub kind: PairKind,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ContrastCfg {
    pub large: Option<f64>,
    pub text: Option<f64>,
    #[serde(default)]
    pub pairs: Vec<PairCfg>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from `tokenguard.toml|yaml`.
pub struct TokenguardConfig {
    pub registry: Option<String>,
    pub roots: Option<Vec<String>>,
    pub output: Option<String>,
    pub pass_threshold: Option<f64>,
    pub strict: Option<bool>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub component_patterns: Option<Vec<String>>,
    pub required_categories: Option<Vec<String>>,
    pub rem_base: Option<f64>,
    pub file_budget_ms: Option<u64>,
    pub jobs: Option<usize>,
    pub ignore_var_prefixes: Option<Vec<String>>,
    pub border: Option<BorderCfg>,
    pub color: Option<ColorCfg>,
    pub contrast: Option<ContrastCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub registry: PathBuf,
    pub roots: Vec<String>,
    pub output: String,
    pub json: Option<PathBuf>,
    pub fix: bool,
    pub pass_threshold: f64,
    pub strict: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub component_patterns: Vec<String>,
    pub registry_options: RegistryOptions,
    pub policy: Policy,
    pub thresholds: Thresholds,
    pub pairs: Vec<PairCfg>,
    pub budget_ms: u64,
    pub jobs: Option<usize>,
}

impl Effective {
    pub fn scan_options(&self, categories: Vec<Category>) -> ScanOptions {
        ScanOptions {
            repo_root: self.repo_root.clone(),
            registry: self.registry.clone(),
            roots: self.roots.clone(),
            categories,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            component_patterns: self.component_patterns.clone(),
            policy: self.policy.clone(),
            registry_options: self.registry_options.clone(),
            budget_ms: self.budget_ms,
            jobs: self.jobs,
            fix: self.fix,
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.repo_root.join(&self.registry)
    }

    /// Where `--json` writes. Relative paths are taken from `cwd`, not the repo root.
    pub fn json_path(&self, cwd: &Path) -> Option<PathBuf> {
        self.json.as_ref().map(|p| cwd.join(p))
    }
}

/// Flags given on the command line; `None`/empty means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub repo_root: Option<String>,
    pub registry: Option<String>,
    pub roots: Vec<String>,
    pub output: Option<String>,
    pub json: Option<String>,
    pub fix: bool,
    pub threshold: Option<f64>,
    pub strict: bool,
    pub jobs: Option<usize>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `tokenguard.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => cur = p,
            _ => return start.to_path_buf(),
        }
    }
}

/// Load the config file from `root` if present. A file that exists but does
/// not parse is an error, never silently ignored.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, TokenguardConfig)>, ConfigError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let bad = |message: String| ConfigError::BadConfig {
            path: path.clone(),
            message,
        };
        let s = fs::read_to_string(&path).map_err(|e| bad(e.to_string()))?;
        let cfg: TokenguardConfig = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|e| bad(e.to_string()))?
        } else {
            serde_yaml::from_str(&s).map_err(|e| bad(e.to_string()))?
        };
        return Ok(Some((path, cfg)));
    }
    Ok(None)
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let start = fs::canonicalize(&start).unwrap_or(start);
    let repo_root = detect_repo_root(&start);
    let (config_path, cfg) = match load_config(&repo_root)? {
        Some((p, c)) => (Some(p), c),
        None => (None, TokenguardConfig::default()),
    };
    let cfg_path = config_path
        .clone()
        .unwrap_or_else(|| repo_root.join(CONFIG_NAMES[0]));
    let invalid = |message: String| ConfigError::BadConfig {
        path: cfg_path.clone(),
        message,
    };

    let registry = cli
        .registry
        .clone()
        .or(cfg.registry)
        .unwrap_or_else(|| "styles/design-tokens.css".to_string());

    let roots = if cli.roots.is_empty() {
        cfg.roots.unwrap_or_else(|| strings(&["."]))
    } else {
        cli.roots.clone()
    };

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(invalid(format!("output must be 'human' or 'json', got '{}'", output)));
    }

    let pass_threshold = cli.threshold.or(cfg.pass_threshold).unwrap_or(1.0);
    if !(0.0..=1.0).contains(&pass_threshold) {
        return Err(invalid(format!("pass threshold {} is outside [0, 1]", pass_threshold)));
    }
    let strict = cli.strict || cfg.strict.unwrap_or(false);

    let required = match cfg.required_categories {
        Some(names) => names
            .iter()
            .map(|n| n.parse::<Category>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?,
        None => vec![Category::Color, Category::Spacing],
    };
    let rem_base = cfg.rem_base.unwrap_or(16.0);
    if rem_base <= 0.0 {
        return Err(invalid("rem_base must be positive".to_string()));
    }

    let mut policy = Policy {
        rem_base,
        ..Policy::default()
    };
    if let Some(v) = cfg.border.and_then(|b| b.min_opacity) {
        policy.min_border_opacity = v;
    }
    if let Some(v) = cfg.color.and_then(|c| c.max_delta_e) {
        policy.max_color_delta_e = v;
    }
    if let Some(v) = cfg.ignore_var_prefixes {
        policy.ignore_var_prefixes = v;
    }

    let contrast = cfg.contrast.unwrap_or_default();
    let defaults = Thresholds::default();
    let thresholds = Thresholds {
        text: contrast.text.unwrap_or(defaults.text),
        large: contrast.large.unwrap_or(defaults.large),
    };

    Ok(Effective {
        registry: PathBuf::from(registry),
        roots,
        output,
        json: cli.json.as_ref().map(PathBuf::from),
        fix: cli.fix,
        pass_threshold,
        strict,
        include: cfg
            .include
            .unwrap_or_else(|| strings(&["**/*.css", "**/*.tsx", "**/*.ts"])),
        exclude: cfg.exclude.unwrap_or_else(|| strings(&["**/*.d.ts"])),
        component_patterns: cfg
            .component_patterns
            .unwrap_or_else(|| strings(&["**/*.module.css", "**/components/**"])),
        registry_options: RegistryOptions { rem_base, required },
        policy,
        thresholds,
        pairs: contrast.pairs,
        budget_ms: cfg.file_budget_ms.unwrap_or(2000),
        jobs: cli.jobs.or(cfg.jobs),
        repo_root,
        config_path,
    })
}
