use std::io::IsTerminal;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use doctrack_check::{Checker, Report, StaticDiff};
use doctrack_core::{DocTrackConfig, OutputFormat, DEFAULT_CONFIG_FILE};
use doctrack_git::GitRepository;

#[derive(Parser)]
#[command(
    name = "doctrack",
    version,
    about = "Flag changes to code whose documentation must be reviewed",
    long_about = "doctrack reads a diff, finds the hunks that touch code marked with a\n\
                   documentation tag comment, and exits non-zero when there are any.\n\n\
                   A hunk is tracked when a tag comment sits on its lines, directly above\n\
                   them, or on the header of a function, class or element enclosing them.\n\n\
                   Examples:\n  \
                     doctrack check                         Working tree against HEAD\n  \
                     doctrack check --version-from main     Everything since main\n  \
                     git diff -U0 | doctrack check --diff-file -   Check a piped diff\n  \
                     doctrack init                          Write a default .doctrack.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .doctrack.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for check results.\n\n\
                       Formats:\n  \
                         text      Diff-style listing of tracked hunks (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Report diff hunks that touch documentation-tracked code
    #[command(long_about = "Report diff hunks that touch documentation-tracked code.\n\n\
        Compares --version-from (default HEAD) with --version-to, or with the\n\
        working tree and index when --version-to is omitted. Exits with the\n\
        configured fail status when any hunk is tracked.\n\n\
        Examples:\n  doctrack check\n  doctrack check --version-from v1.2 --version-to v1.3\n  \
        doctrack check --tag '# doc' --tag '// doc' --fail-status 3")]
    Check {
        /// Revision holding the pre-image (default: HEAD)
        #[arg(long)]
        version_from: Option<String>,

        /// Revision holding the post-image (default: working tree)
        #[arg(long)]
        version_to: Option<String>,

        /// Only check paths matching this pathspec
        #[arg(long)]
        path: Option<String>,

        /// Tag marker, repeatable; replaces the configured tags
        #[arg(long = "tag", value_name = "MARKER")]
        tags: Vec<String>,

        /// Exit status when tracked differences are found
        #[arg(long)]
        fail_status: Option<i32>,

        /// Ignore hunks that only change blank lines
        #[arg(long, value_name = "BOOL")]
        skip_blank_lines: Option<bool>,

        /// Read the diff from a file instead of git (use - for stdin)
        #[arg(long)]
        diff_file: Option<PathBuf>,

        /// Repository to read file contents from
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Print nothing; only set the exit status
        #[arg(long, short)]
        quiet: bool,
    },
    /// Create a default .doctrack.toml in the current directory
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

const DEFAULT_CONFIG: &str = r#"# doctrack configuration

# Literal markers; a comment containing any of them tags the code it
# precedes or sits on. Matching is case-sensitive substring search.
tags = ["doc-track"]

# Exit status of `doctrack check` when tracked differences are found.
fail_status = 1

# Ignore hunks whose added and removed lines are all blank.
skip_blank_lines = true

# Glob patterns of paths that are never checked.
exclude = []

# Map extra file extensions to a supported language.
# [languages]
# pyi = "python"
# vue = "html"
"#;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<DocTrackConfig> {
    let config = match explicit {
        Some(path) => DocTrackConfig::from_file(path)
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                DocTrackConfig::from_file(default_path)
                    .wrap_err(format!("loading {DEFAULT_CONFIG_FILE}"))?
            } else {
                DocTrackConfig::default()
            }
        }
    };
    Ok(config)
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mdoctrack\x1b[0m v{version} - keep documentation in step with the code it describes\n");

        println!("Quick start:");
        println!("  \x1b[36mdoctrack init\x1b[0m                 Create a .doctrack.toml config file");
        println!("  \x1b[36mdoctrack check\x1b[0m                Check working tree changes against HEAD\n");

        println!("All commands:");
        println!("  \x1b[32mcheck\x1b[0m     Report hunks touching documentation-tracked code");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("doctrack v{version} - keep documentation in step with the code it describes\n");

        println!("Quick start:");
        println!("  doctrack init                 Create a .doctrack.toml config file");
        println!("  doctrack check                Check working tree changes against HEAD\n");

        println!("All commands:");
        println!("  check     Report hunks touching documentation-tracked code");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'doctrack <command> --help' for details.");
}

fn read_diff_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .into_diagnostic()
            .wrap_err("reading stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
        }
        Some(Command::Check {
            version_from,
            version_to,
            ref path,
            ref tags,
            fail_status,
            skip_blank_lines,
            ref diff_file,
            ref repo,
            quiet,
        }) => {
            let mut config = load_config(cli.config.as_deref())?;
            if !tags.is_empty() {
                config.tags = tags.clone();
            }
            if let Some(status) = fail_status {
                config.fail_status = status;
            }
            if let Some(skip) = skip_blank_lines {
                config.skip_blank_lines = skip;
            }
            tracing::debug!(
                tags = ?config.markers()?.iter().collect::<Vec<_>>(),
                fail_status = config.fail_status,
                skip_blank_lines = config.skip_blank_lines,
                "resolved configuration"
            );

            let version_from =
                version_from.unwrap_or_else(|| doctrack_check::engine::DEFAULT_VERSION_FROM.into());
            let mut source = GitRepository::discover(repo)?
                .with_versions(version_from.clone(), version_to.clone());
            if let Some(spec) = path {
                source = source.with_pathspec(spec.clone());
            }

            let checker =
                Checker::from_config(&config)?.with_versions(Some(version_from), version_to);
            let outcome = match diff_file {
                Some(file) => {
                    if path.is_some() {
                        tracing::warn!("--path is ignored when the diff comes from --diff-file");
                    }
                    let diff = StaticDiff::new(read_diff_input(file)?);
                    checker.check(&diff, &source)?
                }
                None => checker.check(&source, &source)?,
            };

            for skipped in &outcome.skipped {
                tracing::debug!(path = %skipped.path.display(), reason = %skipped.reason, "skipped");
            }
            for file in &outcome.unsupported {
                tracing::debug!(path = %file.display(), "unsupported language");
            }

            if !quiet {
                let report = Report::new(&outcome);
                match cli.format {
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&report).into_diagnostic()?
                        );
                    }
                    OutputFormat::Markdown => {
                        print!("{}", report.to_markdown());
                    }
                    OutputFormat::Text => {
                        print!("{}", report.render_text(use_color));
                    }
                }
            }

            if !outcome.tracked.is_empty() {
                std::io::stdout().flush().into_diagnostic()?;
                std::process::exit(config.fail_status);
            }
        }
        Some(Command::Init) => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                miette::bail!("{DEFAULT_CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {DEFAULT_CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "doctrack", &mut std::io::stdout());
        }
    }

    Ok(())
}
