use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::llm::Template;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "aicommit",
    version,
    about = "AI-powered git commit message generator",
    long_about = "aicommit uses AI models to generate meaningful commit messages based on your staged changes"
)]
pub struct Cli {
    /// Show the generated message without committing or tagging
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Config file (default is $HOME/.config/aicommit/aicommit.toml)
    #[arg(short = 'c', long, env = "AICOMMIT_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also require a Conventional Commits subject line
    #[arg(long, global = true)]
    pub strict: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `aicommit tag v1.2.0`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an annotated git tag message with AI and create the tag
    #[command(disable_version_flag = true)]
    Tag {
        /// Tag version, e.g. v1.2.0
        version: Option<String>,

        /// Tag version (if not provided as an argument)
        #[arg(long = "version", value_name = "VERSION")]
        version_flag: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print version information
    Version,

    /// Select the prompt template used for commit messages
    Prompt {
        template: PromptChoice,

        /// Print the template without saving it to the config file
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize configuration file
    Init,
}

/// Built-in templates selectable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptChoice {
    Default,
    Chinese,
    Detailed,
    Minimal,
}

impl PromptChoice {
    pub fn template(self) -> Template {
        match self {
            PromptChoice::Default => Template::Default,
            PromptChoice::Chinese => Template::Chinese,
            PromptChoice::Detailed => Template::Detailed,
            PromptChoice::Minimal => Template::Minimal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags() {
        let cli = Cli::parse_from(["aicommit", "-d", "-c", "/tmp/a.toml", "-vv", "--strict"]);
        assert!(cli.dry_run);
        assert!(cli.strict);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.toml")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn tag_accepts_positional_or_flag() {
        let cli = Cli::parse_from(["aicommit", "tag", "v1.2.0"]);
        match cli.command {
            Some(Command::Tag {
                version,
                version_flag,
            }) => {
                assert_eq!(version.as_deref(), Some("v1.2.0"));
                assert_eq!(version_flag, None);
            }
            other => panic!("unexpected: {other:?}"),
        }

        let cli = Cli::parse_from(["aicommit", "tag", "--version", "v2.0.0", "--dry-run"]);
        assert!(cli.dry_run);
        match cli.command {
            Some(Command::Tag { version_flag, .. }) => {
                assert_eq!(version_flag.as_deref(), Some("v2.0.0"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn prompt_choice_maps_to_template() {
        let cli = Cli::parse_from(["aicommit", "prompt", "chinese", "--show"]);
        match cli.command {
            Some(Command::Prompt { template, show }) => {
                assert!(show);
                assert_eq!(template.template(), Template::Chinese);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(Cli::try_parse_from(["aicommit", "prompt", "fancy"]).is_err());
    }
}
