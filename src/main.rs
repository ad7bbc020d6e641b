use clap::Parser;

use splitbook::cli::{self, Cli, Commands, RulesCommands, SettleCommands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Init {
            data_dir,
            party_a,
            party_b,
        }) => cli::init::run(data_dir, party_a, party_b),
        Some(Commands::Add {
            amount,
            payer,
            category,
            split,
            date,
            description,
        }) => cli::add::run(amount, payer, &category, split, date, &description),
        Some(Commands::Edit {
            id,
            amount,
            payer,
            category,
            split,
            clear_split,
            date,
            description,
        }) => cli::edit::run(
            id,
            cli::edit::EditArgs {
                amount,
                payer,
                category,
                split,
                clear_split,
                date,
                description,
            },
        ),
        Some(Commands::Remove { id }) => cli::remove::run(id),
        // bare `splitbook` shows the balance
        Some(Commands::Balance) | None => cli::balance::run(),
        Some(Commands::Rules { command }) => match command {
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Get { category } => cli::rules::get(&category),
            RulesCommands::Set {
                category,
                percent_a,
                percent_b,
            } => cli::rules::set(&category, percent_a, percent_b),
        },
        Some(Commands::Settle { command }) => match command {
            SettleCommands::Preview => cli::settle::preview(),
            SettleCommands::Confirm { watermark } => cli::settle::confirm(watermark),
        },
        Some(Commands::Pay {
            amount,
            from,
            description,
        }) => cli::pay::run(amount, from, &description),
        Some(Commands::History { all }) => cli::history::run(all),
        Some(Commands::Demo) => cli::demo::run(),
        Some(Commands::Status) => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
