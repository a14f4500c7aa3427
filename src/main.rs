use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use aicommit::cli_args::{Cli, Command, ConfigAction, PromptChoice};
use aicommit::config::{self, Config};
use aicommit::flow::{self, FlowOptions};
use aicommit::git::Git;
use aicommit::llm::{Template, build_llm_client};
use aicommit::logging::init_logger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose).context("failed to initialize logging")?;

    match &cli.command {
        None => run_commit(&cli),
        Some(Command::Tag {
            version,
            version_flag,
        }) => run_tag(&cli, version.as_deref(), version_flag.as_deref()),
        Some(Command::Config {
            action: ConfigAction::Init,
        }) => init_config(cli.config.clone()),
        Some(Command::Version) => {
            println!("aicommit version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Prompt { template, show }) => select_prompt(&cli, *template, *show),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::load(cli.config.as_deref()).context("failed to load config")
}

fn flow_options(cli: &Cli, cfg: &Config) -> FlowOptions {
    FlowOptions {
        dry_run: cli.dry_run,
        strict: cli.strict || cfg.strict,
        editor: cfg.editor.clone(),
    }
}

fn run_commit(cli: &Cli) -> Result<()> {
    let cfg = load_config(cli)?;
    let template = cfg.template_selection()?.into_template();
    info!("Using {template} prompt template");

    let git = Git::new(".");
    flow::commit::run(&git, || build_llm_client(&cfg, template), &flow_options(cli, &cfg))?;
    Ok(())
}

fn run_tag(cli: &Cli, positional: Option<&str>, flag: Option<&str>) -> Result<()> {
    let version = flow::tag::resolve_version(
        positional,
        flag,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )?;

    let cfg = load_config(cli)?;
    let git = Git::new(".");
    flow::tag::run(
        &git,
        &version,
        || build_llm_client(&cfg, Template::Tag),
        &flow_options(cli, &cfg),
    )?;
    Ok(())
}

fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(config::default_config_path()?),
    }
}

fn init_config(explicit: Option<PathBuf>) -> Result<()> {
    let path = config_path(explicit)?;
    config::init_config_file(&path)?;

    println!("Configuration file created: {}", path.display());
    println!("Please edit the file to add your API keys");
    Ok(())
}

fn select_prompt(cli: &Cli, choice: PromptChoice, show: bool) -> Result<()> {
    let template = choice.template();

    if !show {
        let path = config_path(cli.config.clone())?;
        config::persist_template(&path, template.name())?;
        println!("Prompt template set to {template} in {}", path.display());
    }

    println!("\nSystem prompt:\n{}", template.system_prompt());
    println!("\nUser prompt:\n{}", template.user_format());
    Ok(())
}
