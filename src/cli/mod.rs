use std::fs::File;
use std::io::{stdout, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{LedgerService, MissingAccountPolicy};
use crate::config::{Config, Overrides, DEFAULT_CONFIG_PATH};
use crate::domain::{flatten_tree, format_cents, sum_amounts, Cents};
use crate::io::{write_earnings_csv, Exporter, Importer};
use crate::logging::init_tracing;

/// Saldo - balance sheets from a double-entry ledger
#[derive(Parser)]
#[command(name = "saldo")]
#[command(about = "Aggregate ledger entries per account into a balance sheet")]
#[command(version)]
pub struct Cli {
    /// Configuration file (ignored if missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Database file path (overrides config file)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Log level (overrides config file)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Import a ledger document (accounts and events)
    Import {
        /// Input file
        file: PathBuf,

        /// Input format: json, tappio
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Print the account tree
    Accounts,

    /// Compute the balance sheet and write it to an output collection
    BalanceSheet {
        /// Output collection (defaults to the configured one)
        #[arg(long)]
        collection: Option<String>,

        /// Fail when a ledger entry references an unknown account
        #[arg(long)]
        strict: bool,
    },

    /// Print an output collection
    Show {
        /// Collection to print (defaults to the configured one)
        #[arg(long)]
        collection: Option<String>,

        /// Output format: table, csv, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print earnings per result-type account
    Earnings {
        /// Output format: table, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Export accounts and events as a JSON snapshot or a Tappio document
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, tappio
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Break lines and indent Tappio output
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load(
            &self.config,
            &Overrides {
                database: self.database.clone(),
                log_level: self.log_level.clone(),
            },
        )?;
        init_tracing(&config.logging);

        let database = config.database.path.as_str();

        match self.command {
            Commands::Init => {
                LedgerService::init(database).await?;
                println!("Database initialized: {}", database);
            }

            Commands::Import { file, format } => {
                let service = LedgerService::connect(database).await?;
                let reader = File::open(&file)
                    .with_context(|| format!("Failed to open {}", file.display()))?;
                let reader = BufReader::new(reader);
                let importer = Importer::new(&service);
                let result = match format.as_str() {
                    "json" => importer.import_json(reader).await?,
                    "tappio" => importer.import_tappio(reader).await?,
                    other => anyhow::bail!("Unknown format '{}'. Use json or tappio", other),
                };
                println!(
                    "Imported {} account(s), {} event(s), {} entr{}",
                    result.accounts,
                    result.events,
                    result.entries,
                    if result.entries == 1 { "y" } else { "ies" }
                );
            }

            Commands::Accounts => {
                let service = LedgerService::connect(database).await?;
                run_accounts_command(&service).await?;
            }

            Commands::BalanceSheet { collection, strict } => {
                let service = LedgerService::connect(database).await?;
                let collection =
                    collection.unwrap_or_else(|| config.balance_sheet.collection.clone());
                let policy = if strict {
                    MissingAccountPolicy::Fail
                } else {
                    config.balance_sheet.missing_accounts
                };
                run_balance_sheet_command(&service, &collection, policy).await?;
            }

            Commands::Show { collection, format } => {
                let service = LedgerService::connect(database).await?;
                let collection =
                    collection.unwrap_or_else(|| config.balance_sheet.collection.clone());
                run_show_command(&service, &collection, &format).await?;
            }

            Commands::Earnings { format } => {
                let service = LedgerService::connect(database).await?;
                run_earnings_command(&service, &format).await?;
            }

            Commands::Export {
                output,
                format,
                pretty,
            } => {
                let service = LedgerService::connect(database).await?;
                let writer: Box<dyn Write> = match output {
                    Some(ref path) => Box::new(
                        File::create(path)
                            .with_context(|| format!("Failed to create {}", path.display()))?,
                    ),
                    None => Box::new(stdout()),
                };
                let exporter = Exporter::new(&service);
                let (accounts, events) = match format.as_str() {
                    "json" => {
                        let snapshot = exporter.export_full_json(writer).await?;
                        (snapshot.accounts.len(), snapshot.events.len())
                    }
                    "tappio" => {
                        let document = exporter.export_tappio(writer, pretty).await?;
                        let stored: usize = document
                            .accounts
                            .iter()
                            .map(|group| accounts_in(&group.subaccounts))
                            .sum();
                        (stored, document.events.len())
                    }
                    other => anyhow::bail!("Unknown format '{}'. Use json or tappio", other),
                };
                if let Some(path) = output {
                    eprintln!(
                        "Exported {} account(s) and {} event(s) to {}",
                        accounts,
                        events,
                        path.display()
                    );
                }
            }
        }

        Ok(())
    }
}

async fn run_accounts_command(service: &LedgerService) -> Result<()> {
    let accounts = service.list_accounts().await?;
    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    for node in flatten_tree(&accounts) {
        let indent = " ".repeat(node.depth * 2);
        match node.account.number {
            Some(number) => println!("{}{} {}", indent, number, node.account.name),
            None => println!("{}{}", indent, node.account.name),
        }
    }
    Ok(())
}

async fn run_balance_sheet_command(
    service: &LedgerService,
    collection: &str,
    policy: MissingAccountPolicy,
) -> Result<()> {
    let report = service.run_balance_sheet(collection, policy).await?;

    println!(
        "Wrote {} row(s) to '{}' (total {})",
        report.written.len(),
        report.collection,
        display_total(report.total().ok())
    );
    if !report.excluded.is_empty() {
        println!("Excluded {} result account(s)", report.excluded.len());
    }
    if !report.missing.is_empty() {
        let numbers: Vec<String> = report.missing.iter().map(|n| n.to_string()).collect();
        println!("Skipped unknown account(s): {}", numbers.join(", "));
    }
    Ok(())
}

async fn run_show_command(service: &LedgerService, collection: &str, format: &str) -> Result<()> {
    let exporter = Exporter::new(service);

    match format {
        "csv" => {
            exporter.export_collection_csv(collection, stdout()).await?;
        }
        "json" => {
            exporter.export_collection_json(collection, stdout()).await?;
        }
        "table" => {
            let rows = service.balance_rows(collection).await?;
            if rows.is_empty() {
                println!("Collection '{}' is empty.", collection);
                return Ok(());
            }
            println!("{:<8} {:<32} {:>14}", "NUMBER", "ACCOUNT", "AMOUNT");
            println!("{}", "-".repeat(56));
            for row in &rows {
                println!(
                    "{:<8} {:<32} {:>14}",
                    row.account.number,
                    truncate(&row.account.name, 32),
                    format_cents(row.amount)
                );
            }
            println!("{}", "-".repeat(56));
            let total = sum_amounts(rows.iter().map(|r| Some(r.amount)));
            println!("{:<41} {:>14}", "TOTAL", display_total(total));
        }
        other => anyhow::bail!("Unknown format '{}'. Use table, csv or json", other),
    }
    Ok(())
}

async fn run_earnings_command(service: &LedgerService, format: &str) -> Result<()> {
    let report = service.earnings_report().await?;

    match format {
        "csv" => {
            write_earnings_csv(&report, stdout())?;
        }
        "table" => {
            if report.rows.is_empty() {
                println!("No result accounts found.");
                return Ok(());
            }
            for row in &report.rows {
                let label = format!("{}{} {}", " ".repeat(row.depth * 2), row.number, row.name);
                println!("{:<44} {:>14}", truncate(&label, 44), format_cents(row.amount));
            }
            println!("{}", "-".repeat(59));
            println!("{:<44} {:>14}", "TOTAL", format_cents(report.total));
        }
        other => anyhow::bail!("Unknown format '{}'. Use table or csv", other),
    }
    Ok(())
}

/// Number of accounts in a Tappio account forest.
fn accounts_in(accounts: &[crate::io::tappio::Account]) -> usize {
    accounts
        .iter()
        .map(|account| 1 + accounts_in(&account.subaccounts))
        .sum()
}

fn display_total(total: Option<Cents>) -> String {
    total.map_or_else(|| "out of range".to_string(), format_cents)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
