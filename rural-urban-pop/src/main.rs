//! Point d'entrée CLI pour rural-urban-pop

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, RunArgs};

/// Population rurale et urbaine par municipio et par année
#[derive(Parser)]
#[command(name = "rural-urban-pop")]
#[command(author, version)]
#[command(about = "Somme la population rurale et urbaine par zone pour chaque raster LandScan")]
#[command(long_about = "Découpe chaque raster de population sur l'emprise commune, le sépare selon le masque rural/urbain et somme chaque partie par zone.\n\nSans argument, lit l'arborescence data/ et écrit rural_urban_pop.csv.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: calcul complet)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments du calcul (commande par défaut)
    #[command(flatten)]
    run: RunArgs,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::List { args }) => cli::cmd_list(&args)?,
        None => cli::cmd_run(&cli.run, cli.quiet)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
