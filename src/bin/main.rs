// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, Trim, Writer};
use money_transfer_rs::{AccountId, Engine, LedgerError, api};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Money Transfer - In-memory multi-currency ledger
///
/// Serves the ledger over HTTP, or replays a CSV of ledger commands and
/// prints the resulting accounts to stdout.
#[derive(Parser, Debug)]
#[command(name = "money-transfer")]
#[command(about = "An in-memory ledger with GBP/EUR/USD transfers", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
    /// Replay ledger commands from a CSV file
    ///
    /// Expected format: type,sender,receiver,amount,currency
    /// Example: cargo run -- batch commands.csv > accounts.csv
    Batch {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

/// Logs go to stderr so batch output on stdout stays parseable.
/// Filter comes from `RUST_LOG`, defaulting to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Serve { host, port } => {
            let listener = match TcpListener::bind((host.as_str(), port)).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Error binding {}:{}: {}", host, port, e);
                    process::exit(1);
                }
            };
            if let Err(e) = api::serve(listener, Arc::new(Engine::new())).await {
                error!("Server error: {}", e);
                process::exit(1);
            }
        }
        Command::Batch { input } => {
            let file = match File::open(&input) {
                Ok(f) => f,
                Err(e) => {
                    error!("Error opening file '{}': {}", input.display(), e);
                    process::exit(1);
                }
            };

            let engine = match process_commands(BufReader::new(file)) {
                Ok(engine) => engine,
                Err(e) => {
                    error!("Error processing commands: {}", e);
                    process::exit(1);
                }
            };

            if let Err(e) = write_accounts(&engine, std::io::stdout()) {
                error!("Error writing output: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, sender, receiver, amount, currency`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    command: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    sender: Option<u64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    receiver: Option<u64>,
    amount: Decimal,
    currency: String,
}

/// A ledger command decoded from one CSV row.
#[derive(Debug)]
enum LedgerCommand {
    Create {
        amount: Decimal,
        currency: String,
    },
    Transfer {
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
        currency: String,
    },
}

impl CsvRecord {
    /// Returns `None` for unknown commands or missing account columns.
    fn into_command(self) -> Option<LedgerCommand> {
        match self.command.to_lowercase().as_str() {
            "create" => Some(LedgerCommand::Create {
                amount: self.amount,
                currency: self.currency,
            }),
            "transfer" => Some(LedgerCommand::Transfer {
                sender: AccountId(self.sender?),
                receiver: AccountId(self.receiver?),
                amount: self.amount,
                currency: self.currency,
            }),
            _ => None,
        }
    }
}

impl LedgerCommand {
    fn apply(&self, engine: &Engine) -> Result<(), LedgerError> {
        match self {
            LedgerCommand::Create { amount, currency } => {
                engine.create_account(*amount, currency).map(|_| ())
            }
            LedgerCommand::Transfer {
                sender,
                receiver,
                amount,
                currency,
            } => engine.transfer(*sender, *receiver, *amount, currency),
        }
    }
}

/// Replay ledger commands from a CSV reader.
///
/// Rows are streamed, so the input can be arbitrarily large. Malformed rows
/// and rejected commands are skipped.
///
/// # CSV Format
///
/// Expected columns: `type, sender, receiver, amount, currency`
/// - `type`: `create` or `transfer`
/// - `sender`, `receiver`: Account IDs (empty for `create`)
/// - `amount`: Decimal amount
/// - `currency`: GBP, EUR or USD, any case
///
/// # Example
///
/// ```csv
/// type,sender,receiver,amount,currency
/// create,,,1000,GBP
/// create,,,500,GBP
/// transfer,1000000,1000001,200,GBP
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_commands<R: Read>(reader: R) -> Result<Engine, csv::Error> {
    let engine = Engine::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        match result {
            Ok(record) => {
                let Some(command) = record.into_command() else {
                    debug!(row, "skipping invalid command record");
                    continue;
                };

                if let Err(e) = command.apply(&engine) {
                    debug!(row, error = %e, "skipping rejected command");
                }
            }
            Err(e) => {
                debug!(row, error = %e, "skipping malformed row");
                continue;
            }
        }
    }

    Ok(engine)
}

/// Output row: `id, amount, currency`.
#[derive(Debug, Serialize)]
struct AccountRow {
    id: AccountId,
    amount: Decimal,
    currency: String,
}

/// Write account states to a CSV writer, ordered by ID with 4 decimal places.
///
/// # Example
///
/// ```csv
/// id,amount,currency
/// 1000000,800,GBP
/// 1000001,700,GBP
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_accounts<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for account in engine.accounts() {
        let balance = account.balance();
        wtr.serialize(AccountRow {
            id: account.id(),
            amount: balance.amount().round_dp(4),
            currency: balance.currency().to_string(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use money_transfer_rs::Currency;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const HEADER: &str = "type,sender,receiver,amount,currency\n";

    fn replay(rows: &str) -> Engine {
        process_commands(Cursor::new(format!("{HEADER}{rows}"))).unwrap()
    }

    #[test]
    fn parse_create() {
        let engine = replay("create,,,1000,gbp\n");

        let accounts = engine.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id(), AccountId(1_000_000));
        assert_eq!(accounts[0].balance().amount(), dec!(1000));
        assert_eq!(accounts[0].balance().currency(), Currency::Gbp);
    }

    #[test]
    fn parse_create_and_transfer() {
        let engine = replay(
            "create,,,1000,GBP\n\
             create,,,500,GBP\n\
             transfer,1000000,1000001,200,GBP\n",
        );

        let sender = engine.get_account(AccountId(1_000_000)).unwrap();
        let receiver = engine.get_account(AccountId(1_000_001)).unwrap();
        assert_eq!(sender.balance().amount(), dec!(800));
        assert_eq!(receiver.balance().amount(), dec!(700));
    }

    #[test]
    fn parse_with_whitespace() {
        let engine = replay(" create , , , 100.0 , EUR \n");

        let account = engine.get_account(AccountId(1_000_000)).unwrap();
        assert_eq!(account.balance().amount(), dec!(100.0));
        assert_eq!(account.balance().currency(), Currency::Eur);
    }

    #[test]
    fn skip_malformed_and_rejected_rows() {
        let engine = replay(
            "create,,,1000,GBP\n\
             invalid,row,data,here,x\n\
             create,,,50,CAD\n\
             transfer,,1000000,10,GBP\n\
             transfer,1000000,1000000,10,GBP\n\
             create,,,50,USD\n",
        );

        let accounts = engine.accounts();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].balance().amount(), dec!(1000));
        assert_eq!(accounts[1].id(), AccountId(1_000_001));
    }

    #[test]
    fn insufficient_balance_row_is_skipped() {
        let engine = replay(
            "create,,,500,GBP\n\
             create,,,0,GBP\n\
             transfer,1000000,1000001,501,GBP\n",
        );

        assert_eq!(
            engine.get_account(AccountId(1_000_000)).unwrap().balance().amount(),
            dec!(500)
        );
    }

    #[test]
    fn write_accounts_to_csv() {
        let engine = replay(
            "create,,,1000,GBP\n\
             create,,,500,GBP\n\
             transfer,1000000,1000001,300,EUR\n",
        );

        let mut output = Vec::new();
        write_accounts(&engine, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "id,amount,currency\n1000000,739.00,GBP\n1000001,761.00,GBP\n"
        );
    }

    #[test]
    fn write_rounds_to_four_decimal_places() {
        let engine = replay("create,,,0.123456,USD\n");

        let mut output = Vec::new();
        write_accounts(&engine, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("1000000,0.1235,USD"));
    }
}
