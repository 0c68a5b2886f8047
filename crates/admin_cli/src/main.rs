use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, RewardKind, RewardUpsertCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "bottega_admin")]
#[command(about = "Admin utilities for Bottega (bootstrap accounts/reward catalog)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./bottega.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    Reward(Reward),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Reward {
    #[command(subcommand)]
    command: RewardCommand,
}

#[derive(Subcommand, Debug)]
enum RewardCommand {
    Add(RewardAddArgs),
    List,
}

#[derive(Args, Debug)]
struct RewardAddArgs {
    #[arg(long)]
    name: String,
    /// Payout kind: "points" or "balance".
    #[arg(long)]
    kind: String,
    #[arg(long)]
    value: i64,
    #[arg(long)]
    probability: f64,
    #[arg(long, default_value = "#cccccc")]
    color: String,
    /// Create the entry deactivated (it will not appear on the wheel).
    #[arg(long)]
    inactive: bool,
}

fn parse_kind(raw: &str) -> Result<RewardKind, String> {
    match raw {
        "points" => Ok(RewardKind::Points),
        "balance" => Ok(RewardKind::Balance),
        other => Err(format!("unsupported reward kind: {other}")),
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build()?;

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            match engine.create_account(&args.username, &password).await {
                Ok(account) => println!("created account: {} ({})", account.username, account.id),
                Err(EngineError::ExistingKey(username)) => {
                    eprintln!("account already exists: {username}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Reward(Reward {
            command: RewardCommand::Add(args),
        }) => {
            let kind = match parse_kind(&args.kind) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let reward = engine
                .upsert_reward(RewardUpsertCmd {
                    id: None,
                    name: args.name,
                    kind,
                    value: args.value,
                    probability: args.probability,
                    color: args.color,
                    is_active: !args.inactive,
                })
                .await?;
            println!("created reward: {} ({})", reward.name, reward.id);
        }
        Command::Reward(Reward {
            command: RewardCommand::List,
        }) => {
            let rewards = engine.list_rewards().await?;
            let probability_sum: f64 = rewards
                .iter()
                .filter(|reward| reward.is_active)
                .map(|reward| reward.probability)
                .sum();

            for reward in &rewards {
                println!(
                    "{} {} kind={} value={} probability={} active={}",
                    reward.id,
                    reward.name,
                    reward.kind.as_str(),
                    reward.value,
                    reward.probability,
                    reward.is_active
                );
            }
            if (probability_sum - 1.0).abs() > f64::EPSILON {
                eprintln!("warning: active probabilities sum to {probability_sum}, not 1");
            }
        }
    }

    Ok(())
}
