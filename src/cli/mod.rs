pub mod badges;
pub mod catalog;
pub mod challenges;
pub mod home;
pub mod machines;
pub mod platform;
pub mod pwnbox;
pub mod review;
pub mod season;
pub mod sherlocks;
pub mod tracks;
pub mod universities;
pub mod user;
pub mod vm;
pub mod vpn;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use serde::de::DeserializeOwned;

use crate::api::catalog::Catalog;
use crate::api::save_download;
use crate::client::{ApiResponse, Download, HtbClient};
use crate::config::{
    config_path, load_stored, load_stored_from, mask_secret, parse_timeout, resolve_base_url,
    resolve_timeout, resolve_token, save_stored_to, v5_base_url, Config,
};
use crate::error::{HtbError, Result};
use crate::format::{build_document, build_panel, build_table, cell, truncate};
use crate::resolve::{resolve, EntityKind, Target};
use crate::submit::{read_flag, submit_flag, FlagTarget, Outcome};
use crate::swagger;

#[derive(Parser)]
#[command(
    name = "htbcli",
    version,
    about = "Command-line client for the HackTheBox labs API"
)]
pub struct Cli {
    /// Print the raw HTTP status and body instead of rendered output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print the response body as JSON instead of a table
    #[arg(long, global = true, conflicts_with = "debug")]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse machines and submit machine flags
    Machines {
        #[command(subcommand)]
        action: machines::MachinesAction,
    },
    /// Browse challenges, manage instances and submit challenge flags
    Challenges {
        #[command(subcommand)]
        action: challenges::ChallengesAction,
    },
    /// Browse sherlocks, download archives and submit task flags
    Sherlocks {
        #[command(subcommand)]
        action: sherlocks::SherlocksAction,
    },
    /// Seasonal rankings and machines
    Season {
        #[command(subcommand)]
        action: season::SeasonAction,
    },
    /// Account and public profiles
    User {
        #[command(subcommand)]
        action: user::UserAction,
    },
    /// Spawn, reset, extend or terminate machine instances
    Vm {
        #[command(subcommand)]
        action: vm::VmCommand,
    },
    /// ProLabs
    Prolabs {
        #[command(subcommand)]
        action: catalog::CatalogAction,
    },
    /// Fortresses
    Fortresses {
        #[command(subcommand)]
        action: catalog::FortressAction,
    },
    /// Starting Point tiers
    StartingPoint {
        #[command(subcommand)]
        action: catalog::StartingPointAction,
    },
    /// Career paths
    Career {
        #[command(subcommand)]
        action: catalog::CatalogAction,
    },
    /// Global rankings
    Ranking {
        #[command(subcommand)]
        action: catalog::CatalogAction,
    },
    /// Teams
    Team {
        #[command(subcommand)]
        action: catalog::CatalogAction,
    },
    /// Learning tracks
    Tracks {
        #[command(subcommand)]
        action: tracks::TracksAction,
    },
    /// Universities and their rankings
    Universities {
        #[command(subcommand)]
        action: universities::UniversitiesAction,
    },
    /// Platform badges
    Badges {
        #[command(subcommand)]
        action: badges::BadgesAction,
    },
    /// Dashboard banners and changelog
    Home {
        #[command(subcommand)]
        action: home::HomeAction,
    },
    /// Announcements, notices, search and other platform feeds
    Platform {
        #[command(subcommand)]
        action: platform::PlatformAction,
    },
    /// Pwnbox instances and terminals
    Pwnbox {
        #[command(subcommand)]
        action: pwnbox::PwnboxAction,
    },
    /// Rate machine reviews
    Review {
        #[command(subcommand)]
        action: review::ReviewAction,
    },
    /// VPN servers, assignments and connection packs
    #[command(visible_alias = "connection")]
    Vpn {
        #[command(subcommand)]
        action: vpn::VpnAction,
    },
    /// Manage htbcli stored config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show the effective configuration without contacting the API
    Info,
    /// List API tags from the OpenAPI document
    Endpoints {
        /// OpenAPI YAML document
        #[arg(long)]
        swagger: Option<PathBuf>,
    },
    /// List the endpoints of one API tag
    ModuleInfo {
        tag: String,

        /// OpenAPI YAML document
        #[arg(long)]
        swagger: Option<PathBuf>,
    },
    /// Generate a shell completion script
    Completion { shell: Shell },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print config file path
    Path,
    /// Show stored config values
    Show,
    /// Set stored config values
    Set(ConfigSetArgs),
}

#[derive(Args, Default)]
pub struct ConfigSetArgs {
    /// HackTheBox app token
    #[arg(long)]
    pub token: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<String>,

    /// Remove stored token
    #[arg(long)]
    pub clear_token: bool,

    /// Remove stored base URL
    #[arg(long)]
    pub clear_base_url: bool,

    /// Remove stored timeout
    #[arg(long)]
    pub clear_timeout: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
    Debug,
}

impl OutputMode {
    pub fn from_flags(debug: bool, json: bool) -> Self {
        if debug {
            OutputMode::Debug
        } else if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// What every API command handler receives: one client, one output mode.
pub struct Context {
    pub client: HtbClient,
    pub mode: OutputMode,
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

impl Context {
    pub fn load(mode: OutputMode) -> Result<Self> {
        let config = Config::load()?;
        Ok(Self {
            client: HtbClient::from_config(&config)?,
            mode,
        })
    }

    pub fn resolve(&self, target: &Target, kind: EntityKind) -> Result<u64> {
        resolve(&self.client, target, kind)
    }

    /// Renders a read response, or dumps it verbatim in `--debug`/`--json`.
    pub fn emit<T: DeserializeOwned>(
        &self,
        response: ApiResponse,
        render: impl FnOnce(T) -> Vec<String>,
    ) -> Result<()> {
        match self.mode {
            OutputMode::Debug => println!("{}", response.raw_exchange()),
            OutputMode::Json => println!("{}", serde_json::to_string_pretty(&response.body)?),
            OutputMode::Table => {
                let decoded: T = response.decode()?;
                print_lines(&render(decoded));
            }
        }
        Ok(())
    }

    /// Payloads without a fixed shape, shown as indented JSON.
    pub fn emit_document(&self, response: ApiResponse, title: &str) -> Result<()> {
        self.emit(response, |body: serde_json::Value| build_document(title, &body))
    }

    /// For writes: the server's message, or `fallback` when it sent none.
    pub fn emit_message(&self, response: ApiResponse, fallback: &str) -> Result<()> {
        match self.mode {
            OutputMode::Debug => println!("{}", response.raw_exchange()),
            OutputMode::Json => println!("{}", serde_json::to_string_pretty(&response.body)?),
            OutputMode::Table => {
                println!("{}", response.message().unwrap_or_else(|| fallback.to_string()))
            }
        }
        Ok(())
    }

    pub fn download(
        &self,
        label: &str,
        path: &Path,
        fetch: impl FnOnce(&HtbClient) -> Result<Download>,
    ) -> Result<()> {
        let pb = spinner(label);
        let result = fetch(&self.client);
        pb.finish_and_clear();
        let file = result?;

        save_download(path, &file.bytes)?;
        if self.mode == OutputMode::Debug {
            println!("HTTP {}\n({} bytes)", file.status, file.bytes.len());
        }
        println!("Saved {} ({} bytes)", path.display(), file.bytes.len());
        Ok(())
    }

    /// Flag from the argument or stdin, one submit call, rejection as error.
    pub fn submit(&self, target: FlagTarget, flag: Option<&str>) -> Result<()> {
        let flag = read_flag(flag, std::io::stdin().lock())?;
        let submission = submit_flag(&self.client, &target, &flag)?;
        log::debug!("submitted flag for id {}", submission.entity_id);
        if self.mode == OutputMode::Debug {
            println!("{}", submission.raw);
        }
        match submission.outcome {
            Outcome::Accepted { message } => {
                if self.mode != OutputMode::Debug {
                    println!("{message}");
                }
                Ok(())
            }
            Outcome::Rejected { status, message } => {
                Err(HtbError::FlagRejected { status, message })
            }
        }
    }
}

fn spinner(label: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner().with_finish(ProgressFinish::AndClear);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// `--output` wins; otherwise `default_name` in the current directory.
pub fn output_path(explicit: Option<PathBuf>, default_name: &str) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(default_name))
}

pub fn run(cli: Cli) -> Result<()> {
    let mode = OutputMode::from_flags(cli.debug, cli.json);
    match cli.command {
        Commands::Machines { action } => machines::execute(&Context::load(mode)?, action),
        Commands::Challenges { action } => challenges::execute(&Context::load(mode)?, action),
        Commands::Sherlocks { action } => sherlocks::execute(&Context::load(mode)?, action),
        Commands::Season { action } => season::execute(&Context::load(mode)?, action),
        Commands::User { action } => user::execute(&Context::load(mode)?, action),
        Commands::Vm { action } => vm::execute(&Context::load(mode)?, action),
        Commands::Vpn { action } => vpn::execute(&Context::load(mode)?, action),
        Commands::Prolabs { action } => {
            catalog::execute(&Context::load(mode)?, Catalog::Prolab, action)
        }
        Commands::Fortresses { action } => {
            catalog::execute(&Context::load(mode)?, Catalog::Fortress, action.into())
        }
        Commands::StartingPoint { action } => {
            catalog::execute(&Context::load(mode)?, Catalog::StartingPoint, action.into())
        }
        Commands::Career { action } => {
            catalog::execute(&Context::load(mode)?, Catalog::Career, action)
        }
        Commands::Ranking { action } => {
            catalog::execute(&Context::load(mode)?, Catalog::Ranking, action)
        }
        Commands::Team { action } => catalog::execute(&Context::load(mode)?, Catalog::Team, action),
        Commands::Tracks { action } => tracks::execute(&Context::load(mode)?, action),
        Commands::Universities { action } => {
            universities::execute(&Context::load(mode)?, action)
        }
        Commands::Badges { action } => badges::execute(&Context::load(mode)?, action),
        Commands::Home { action } => home::execute(&Context::load(mode)?, action),
        Commands::Platform { action } => platform::execute(&Context::load(mode)?, action),
        Commands::Pwnbox { action } => pwnbox::execute(&Context::load(mode)?, action),
        Commands::Review { action } => review::execute(&Context::load(mode)?, action),
        Commands::Config { action } => handle_config(action),
        Commands::Info => handle_info(),
        Commands::Endpoints { swagger } => handle_endpoints(swagger.as_deref()),
        Commands::ModuleInfo { tag, swagger } => handle_module_info(&tag, swagger.as_deref()),
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "htbcli", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn update_field(
    target: &mut Option<String>,
    value: Option<&str>,
    clear: bool,
    label: &str,
) -> Result<bool> {
    if clear && value.is_some() {
        return Err(HtbError::ConflictingFlags(format!(
            "cannot use --{label} and --clear-{label} together"
        )));
    }
    if clear {
        *target = None;
        return Ok(true);
    }
    match value {
        None => Ok(false),
        Some(v) => {
            *target = non_empty(v).map(str::to_owned);
            Ok(true)
        }
    }
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    handle_config_with_path(action, &config_path())
}

pub fn handle_config_with_path(action: ConfigAction, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let stored = load_stored_from(path);
            let unset = || "(unset)".to_string();
            println!("path: {}", path.display());
            println!(
                "token: {}",
                stored.token.as_deref().map(mask_secret).unwrap_or_else(unset)
            );
            println!("base_url: {}", stored.base_url.unwrap_or_else(unset));
            println!("timeout: {}", stored.timeout.unwrap_or_else(unset));
            Ok(())
        }
        ConfigAction::Set(args) => {
            if let Some(raw) = args.timeout.as_deref() {
                parse_timeout(raw)?;
            }

            let mut stored = load_stored_from(path);
            let mut updated = false;
            updated |= update_field(
                &mut stored.token,
                args.token.as_deref(),
                args.clear_token,
                "token",
            )?;
            updated |= update_field(
                &mut stored.base_url,
                args.base_url.as_deref(),
                args.clear_base_url,
                "base-url",
            )?;
            updated |= update_field(
                &mut stored.timeout,
                args.timeout.as_deref(),
                args.clear_timeout,
                "timeout",
            )?;
            if !updated {
                return Err(HtbError::NothingToUpdate);
            }
            save_stored_to(path, &stored)?;
            Ok(())
        }
    }
}

fn handle_info() -> Result<()> {
    let stored = load_stored();
    let base_url = resolve_base_url(&stored);
    let token = resolve_token(&stored)
        .map(|t| mask_secret(&t))
        .unwrap_or_else(|_| "(unset)".to_string());
    let timeout = resolve_timeout(&stored)?;
    print_lines(&build_panel(
        "htbcli",
        &[
            ("Version", env!("CARGO_PKG_VERSION").to_string()),
            ("Config file", config_path().display().to_string()),
            ("API base (v4)", base_url.clone()),
            ("API base (v5)", v5_base_url(&base_url)),
            ("Token", token),
            ("Timeout", format!("{timeout}s")),
        ],
    ));
    Ok(())
}

fn handle_endpoints(swagger_path: Option<&Path>) -> Result<()> {
    let doc = swagger::load(&swagger::resolve_path(swagger_path))?;
    let rows: Vec<Vec<String>> = doc
        .tag_summaries()
        .into_iter()
        .map(|tag| {
            vec![
                tag.name,
                cell(tag.description.as_deref()),
                tag.endpoints.to_string(),
            ]
        })
        .collect();
    print_lines(&build_table(
        "API modules",
        &["Tag", "Description", "Endpoints"],
        &rows,
    ));
    Ok(())
}

fn handle_module_info(tag: &str, swagger_path: Option<&Path>) -> Result<()> {
    let doc = swagger::load(&swagger::resolve_path(swagger_path))?;
    let endpoints = doc.endpoints_for(tag);
    if endpoints.is_empty() {
        println!("No endpoints found for tag '{tag}'.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = endpoints
        .into_iter()
        .map(|e| {
            vec![
                e.method,
                e.path,
                cell(e.summary.as_deref()),
                cell(e.description.as_deref().map(|d| truncate(d, 50))),
            ]
        })
        .collect();
    print_lines(&build_table(
        &format!("Endpoints for {tag}"),
        &["Method", "Path", "Summary", "Description"],
        &rows,
    ));
    Ok(())
}
