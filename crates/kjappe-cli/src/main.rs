//! kjappe CLI — play the daily five-question quiz from a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::Options;

#[derive(Parser)]
#[command(name = "kjappe", version, about = "Five quick questions, every day")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date (YYYYMMDD or YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a quiz
    Play {
        /// Quiz date (YYYYMMDD or YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Answers in question order; read from stdin when omitted
        #[arg(long = "answer")]
        answers: Vec<String>,

        /// Use the local question directory and skip the server
        #[arg(long)]
        offline: bool,
    },

    /// Show stored answers and verdicts
    Show {
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        offline: bool,
    },

    /// Mark an answer as correct yourself, or undo that
    Overturn {
        /// Question number, starting at 1
        #[arg(long)]
        index: usize,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        offline: bool,
    },

    /// Print shareable result text
    Share {
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        offline: bool,
    },

    /// List quiz dates
    Dates {
        /// Show neighbours of this date
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        offline: bool,
    },

    /// Compare your week with everyone else's
    Weekly {
        /// Show the summary on days other than Friday
        #[arg(long)]
        force: bool,
    },

    /// Validate question files
    Validate {
        /// Question directory, defaults to the configured one
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Create starter config and example question file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kjappe=info".parse().unwrap())
                .add_directive("kjappe_core=info".parse().unwrap())
                .add_directive("kjappe_client=info".parse().unwrap()),
        )
        .init();

    let Cli {
        config,
        today,
        command,
    } = Cli::parse();
    let opts = |offline| Options {
        config: config.clone(),
        today: today.clone(),
        offline,
    };

    let result = match command {
        Commands::Play {
            date,
            answers,
            offline,
        } => commands::play::execute(opts(offline), date, answers).await,
        Commands::Show { date, offline } => commands::show::execute(opts(offline), date).await,
        Commands::Overturn {
            index,
            date,
            offline,
        } => commands::overturn::execute(opts(offline), date, index).await,
        Commands::Share { date, offline } => commands::share::execute(opts(offline), date).await,
        Commands::Dates { date, offline } => commands::dates::execute(opts(offline), date).await,
        Commands::Weekly { force } => commands::weekly::execute(opts(false), force).await,
        Commands::Validate { questions } => commands::validate::execute(opts(true), questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
