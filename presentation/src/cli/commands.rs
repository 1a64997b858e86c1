//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use crew_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for review results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Full report with every stage's analysis
    Report,
    /// Findings overview and saved file paths
    Summary,
    /// JSON output
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Report => OutputFormat::Report,
            FormatArg::Summary => OutputFormat::Summary,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for review-crew
#[derive(Parser, Debug)]
#[command(name = "review-crew")]
#[command(author, version, about = "Multi-agent code review: bugs, security, performance, docs")]
#[command(long_about = r#"
Review Crew runs a source file through four review agents in sequence:

1. Bug Detection: logic errors, crashes, unhandled edge cases
2. Security: injection, secrets, unsafe input handling
3. Performance: complexity, wasted work, resource leaks
4. Documentation & QA: compiles the final report from all earlier findings

Each agent sees the findings of the agents before it. The final report is
written as markdown plus a raw text dump to the output directory.

Configuration files are loaded from (in priority order):
1. REVIEW_CREW_* environment variables
2. --config <path>                        Explicit config file
3. ./review-crew.toml                     Project-level config
4. ~/.config/review-crew/config.toml      Global config

Example:
  review-crew review src/calculator.py
  review-crew github https://github.com/org/project --files app.py,db.py
  review-crew serve --port 8000
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Model every stage uses (overrides [llm].model)
    #[arg(short, long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Crew definition file replacing the built-in agents and tasks
    #[arg(long, global = true, value_name = "PATH")]
    pub crew: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review a local source file
    Review {
        /// File to review
        path: PathBuf,

        /// Directory for the report files (overrides [output].dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// What to print once the review finishes
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Review files from a GitHub repository
    Github {
        /// Repository URL (http or https)
        repo_url: String,

        /// Comma-separated files to review (default: the first few discovered)
        #[arg(long, value_name = "FILES")]
        files: Option<String>,

        /// Directory for the report files (overrides [output].dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// What to print once the review finishes
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// List the reviewable files in a repository
    Files {
        /// Repository URL (http or https)
        repo_url: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Bind address (overrides [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the loaded crew definition
    Crew,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_review_command() {
        let cli = Cli::parse_from([
            "review-crew",
            "-vv",
            "review",
            "calc.py",
            "--format",
            "summary",
            "--model",
            "claude-haiku-4-5",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("claude-haiku-4-5"));
        match cli.command {
            Some(Command::Review { path, output, format }) => {
                assert_eq!(path, PathBuf::from("calc.py"));
                assert!(output.is_none());
                assert_eq!(format, Some(FormatArg::Summary));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_github_command() {
        let cli = Cli::parse_from([
            "review-crew",
            "github",
            "https://github.com/org/project",
            "--files",
            "a.py,b.py",
            "-o",
            "out",
        ]);
        match cli.command {
            Some(Command::Github {
                repo_url,
                files,
                output,
                ..
            }) => {
                assert_eq!(repo_url, "https://github.com/org/project");
                assert_eq!(files.as_deref(), Some("a.py,b.py"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_show_config_without_subcommand() {
        let cli = Cli::parse_from(["review-crew", "--show-config"]);
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_format_arg_maps_to_output_format() {
        assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(FormatArg::Report), OutputFormat::Report);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
