use bloat_ci::ci::{error_annotation, is_github_actions};
use bloat_ci::cmd;
use bloat_ci::config::ConfigLoader;
use bloat_ci::error::ErrorFormatter;
use bloat_ci::infra::ProcessEnv;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use std::process;

/// Binary size tracking for pull requests
///
/// bloat-ci measures workspace binaries with cargo-bloat, stores the result
/// for trunk builds and comments the size difference on pull requests.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI/CD or accessibility)
    #[arg(long, global = true)]
    no_emoji: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure the workspace and save or compare, depending on the CI event
    Run {
        /// Print the snapshot key or report instead of storing or posting it
        #[arg(short, long)]
        dry_run: bool,

        /// Path to Cargo.toml of the workspace to measure
        #[arg(long, value_name = "PATH")]
        manifest_path: Option<PathBuf>,
    },

    /// Render the report from snapshot files without touching the network
    Compare {
        /// Snapshot of the build to report on
        #[arg(value_name = "CURRENT")]
        current: PathBuf,

        /// Snapshot to compare against
        #[arg(short, long, value_name = "BASELINE")]
        baseline: Option<PathBuf>,

        /// Repository web URL used for the compare link
        #[arg(long, value_name = "URL")]
        repo_url: Option<String>,
    },

    /// Print the store keys for a repository and toolchain
    Key {
        /// Repository name (without owner)
        #[arg(long)]
        repo: String,

        /// Toolchain label, e.g. stable-x86_64-unknown-linux-gnu
        #[arg(long)]
        toolchain: String,

        /// Git ref of the build (defaults to the trunk)
        #[arg(long = "ref", value_name = "REF")]
        git_ref: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.no_emoji {
        bloat_ci::fmt::disable_emoji();
    }

    let result = match &cli.command {
        Some(Commands::Run {
            dry_run,
            manifest_path,
        }) => cmd::cmd_run(*dry_run, manifest_path.as_deref()),
        Some(Commands::Compare {
            current,
            baseline,
            repo_url,
        }) => cmd::cmd_compare(current, baseline.as_deref(), repo_url.as_deref()),
        Some(Commands::Key {
            repo,
            toolchain,
            git_ref,
        }) => ConfigLoader::load(Path::new(".")).map(|config| {
            cmd::cmd_key(repo, toolchain, git_ref.as_deref(), &config.default_branches)
        }),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(*shell, &mut Cli::command());
            Ok(())
        }
        None => {
            // No subcommand provided, show help
            println!("bloat-ci v{}", env!("CARGO_PKG_VERSION"));
            println!("Binary size tracking for pull requests\n");
            println!("Usage: bloat-ci <COMMAND>\n");
            println!("Commands:");
            println!("  run      Measure and save or compare, depending on the CI event");
            println!("  compare  Render the report from snapshot files");
            println!("  key      Print the store keys for a repository and toolchain");
            println!("\nRun 'bloat-ci <COMMAND> --help' for more information on a command.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", ErrorFormatter::format(&e));
        if is_github_actions(&ProcessEnv) {
            println!("{}", error_annotation(&format!("{:#}", e)));
        }
        process::exit(ErrorFormatter::exit_code(&e));
    }
}
