//! repodeps - git-repo manifests to JSON dependency lists
//!
//! Main entry point for the repodeps CLI.

use clap::{Parser, Subcommand};
use repodeps::config::RepoDepsConfig;
use repodeps::convert::{self, Overrides};
use repodeps::manifest::{self, RepositoryRecord};
use repodeps::web::WebServer;
use repodeps::RepoDepsError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

/// repodeps - Convert repository manifests into dependency lists
#[derive(Parser, Debug)]
#[command(name = "repodeps")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/repodeps/config.yaml)
    #[arg(short, long, env = "REPODEPS_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Run the web form
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long, env = "REPODEPS_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long, env = "REPODEPS_PORT")]
        port: Option<u16>,
    },

    /// Print the projects of a manifest as JSON
    Parse {
        /// Manifest file, or "-" for stdin
        file: PathBuf,
    },

    /// Convert a manifest into a dependency list
    Convert {
        /// Manifest file, or "-" for stdin
        file: PathBuf,

        /// Branch override for one repository (NAME=BRANCH, repeatable)
        #[arg(short, long = "branch", value_name = "NAME=BRANCH")]
        branches: Vec<String>,

        /// Remote override for one repository (NAME=REMOTE, repeatable)
        #[arg(short, long = "remote", value_name = "NAME=REMOTE")]
        remotes: Vec<String>,

        /// Branch for every repository
        #[arg(long)]
        branch_for_all: Option<String>,

        /// Remote for every repository
        #[arg(long)]
        remote_for_all: Option<String>,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = repodeps::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if let RepoDepsError::MissingFields { repositories } = &e {
            eprintln!("Error: {}", e);
            eprintln!("Missing remote or branch: {}", repositories.join(", "));
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> repodeps::Result<()> {
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(RepoDepsConfig::default_path);

    match cli.command {
        Commands::Init => handle_init_command(&config_path),
        Commands::Serve { host, port } => handle_serve_command(&config_path, host, port),
        Commands::Parse { file } => {
            let records = read_records(&file)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        Commands::Convert {
            file,
            branches,
            remotes,
            branch_for_all,
            remote_for_all,
            output,
        } => {
            let records = read_records(&file)?;

            let mut overrides = Overrides::new();
            for arg in &branches {
                let (name, branch) = split_assignment(arg)?;
                overrides.set_branch(name, branch);
            }
            for arg in &remotes {
                let (name, remote) = split_assignment(arg)?;
                overrides.set_remote(name, remote);
            }
            if let Some(ref branch) = branch_for_all {
                overrides = overrides.with_branch_for_all(branch);
            }
            if let Some(ref remote) = remote_for_all {
                overrides = overrides.with_remote_for_all(remote);
            }

            let json = convert::convert(&records, &overrides)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", json))?;
                    eprintln!("✓ Wrote {} dependencies to {}", records.len(), path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
    }
}

fn handle_init_command(config_file: &Path) -> repodeps::Result<()> {
    if config_file.exists() {
        println!("Configuration already exists at {}", config_file.display());
        return Ok(());
    }

    RepoDepsConfig::new().save(config_file)?;

    println!("✓ Created configuration at {}", config_file.display());
    println!();
    println!("Start the web form with:");
    println!("  repodeps serve");
    Ok(())
}

fn handle_serve_command(
    config_file: &Path,
    host: Option<String>,
    port: Option<u16>,
) -> repodeps::Result<()> {
    let mut config = RepoDepsConfig::load_or_default(config_file)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    println!("Serving on http://{}", config.server.bind_addr());

    let server = WebServer::new(config.server)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run())
}

/// Read a manifest from a file, or stdin for "-"
fn read_records(file: &Path) -> repodeps::Result<Vec<RepositoryRecord>> {
    if file == Path::new("-") {
        let mut xml = String::new();
        std::io::stdin().read_to_string(&mut xml)?;
        manifest::parse_projects(&xml)
    } else {
        manifest::parse_projects_from_file(file)
    }
}

/// Split a `NAME=VALUE` argument
fn split_assignment(arg: &str) -> repodeps::Result<(&str, &str)> {
    arg.split_once('=').ok_or_else(|| {
        RepoDepsError::Config(format!("Expected NAME=VALUE, got '{}'", arg))
    })
}
