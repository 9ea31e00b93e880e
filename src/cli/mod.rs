use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::application::{
    AccountService, AppError, SessionCache, check_integrity, open_account, render_statement,
};
use crate::domain::{
    AccountId, Cents, Clock, IdGenerator, SequentialIds, SystemClock, UuidIds, format_cents,
    parse_cents,
};
use crate::io::{export_snapshot_json, export_statement_csv};
use crate::storage::{MemoryStorage, Storage};
use crate::telemetry::{self, LogFormat};

/// Bankbook - interactive bank account ledger
#[derive(Parser)]
#[command(name = "bankbook")]
#[command(about = "An in-memory bank account ledger driven by an interactive menu")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Identifier scheme for new accounts and transactions
    #[arg(long, value_enum, default_value_t = IdScheme::Sequential)]
    pub ids: IdScheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdScheme {
    /// ACC000001, TX-ACC000001-000001, ...
    Sequential,
    /// Random UUID based identifiers
    Uuid,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        telemetry::init(self.verbose, self.log_format);

        let ids: Box<dyn IdGenerator> = match self.ids {
            IdScheme::Sequential => Box::new(SequentialIds::new()),
            IdScheme::Uuid => Box::new(UuidIds),
        };
        let storage = MemoryStorage::new();
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();

        Session::new(&storage, ids.as_ref(), &SystemClock, stdin.lock(), stdout.lock())
            .run()
            .await
    }
}

#[derive(Debug, Clone, Copy)]
enum Movement {
    Deposit,
    Withdraw,
}

/// One interactive menu session over arbitrary input and output streams.
///
/// Domain errors are printed and the loop continues; only I/O failures on the
/// session streams end it with an error. End of input ends it cleanly.
pub struct Session<'a, S: Storage, R, W> {
    storage: &'a S,
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
    input: R,
    output: W,
    cache: SessionCache,
    current: Option<AccountId>,
}

impl<'a, S, R, W> Session<'a, S, R, W>
where
    S: Storage,
    R: BufRead,
    W: Write,
{
    pub fn new(
        storage: &'a S,
        ids: &'a dyn IdGenerator,
        clock: &'a dyn Clock,
        input: R,
        output: W,
    ) -> Self {
        Self {
            storage,
            ids,
            clock,
            input,
            output,
            cache: SessionCache::new(),
            current: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        writeln!(self.output, "=== Bankbook ===")?;
        loop {
            let keep_going = match self.current.clone() {
                None => self.main_menu().await?,
                Some(id) => self.account_menu(id).await?,
            };
            if !keep_going {
                break;
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Returns `Ok(None)` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report(&mut self, err: &AppError) -> Result<()> {
        writeln!(self.output, "Error: {}", err)?;
        Ok(())
    }

    async fn main_menu(&mut self) -> Result<bool> {
        writeln!(self.output)?;
        writeln!(self.output, "--- Main menu ---")?;
        writeln!(self.output, "1. Create account")?;
        writeln!(self.output, "2. Select account")?;
        writeln!(self.output, "3. List all accounts")?;
        writeln!(self.output, "4. Check ledger integrity")?;
        writeln!(self.output, "5. Export snapshot (JSON)")?;
        writeln!(self.output, "6. Exit")?;

        let Some(choice) = self.prompt("Choose an option: ")? else {
            return Ok(false);
        };

        match choice.as_str() {
            "1" => self.create_account().await?,
            "2" => self.select_account().await?,
            "3" => self.list_accounts().await?,
            "4" => self.check_integrity().await?,
            "5" => self.export_snapshot().await?,
            "6" => {
                writeln!(self.output, "Goodbye!")?;
                return Ok(false);
            }
            _ => writeln!(self.output, "Invalid choice, try again.")?,
        }
        Ok(true)
    }

    async fn account_menu(&mut self, id: AccountId) -> Result<bool> {
        writeln!(self.output)?;
        writeln!(self.output, "--- Account {} ---", id)?;
        writeln!(self.output, "1. Deposit")?;
        writeln!(self.output, "2. Withdraw")?;
        writeln!(self.output, "3. Transfer to another account")?;
        writeln!(self.output, "4. Show balance")?;
        writeln!(self.output, "5. Show statement")?;
        writeln!(self.output, "6. Export statement (CSV)")?;
        writeln!(self.output, "7. Back to main menu")?;

        let Some(choice) = self.prompt("Choose an option: ")? else {
            return Ok(false);
        };

        match choice.as_str() {
            "1" => self.move_money(&id, Movement::Deposit).await?,
            "2" => self.move_money(&id, Movement::Withdraw).await?,
            "3" => self.transfer(&id).await?,
            "4" => self.show_balance(&id).await?,
            "5" => self.show_statement(&id).await?,
            "6" => self.export_statement(&id).await?,
            "7" => {
                self.current = None;
                writeln!(self.output, "Returning to main menu...")?;
            }
            _ => writeln!(self.output, "Invalid choice, try again.")?,
        }
        Ok(true)
    }

    async fn create_account(&mut self) -> Result<()> {
        let Some(owner) = self.prompt("Owner name: ")? else {
            return Ok(());
        };

        match open_account(self.storage, self.ids, self.clock, &owner).await {
            Ok(account) => {
                writeln!(self.output, "Account created!")?;
                writeln!(self.output, "Account ID: {}", account.id())?;
                writeln!(self.output, "Owner: {}", account.owner_name())?;
                self.cache.checkin(account);
            }
            Err(err) => self.report(&err)?,
        }
        Ok(())
    }

    async fn select_account(&mut self) -> Result<()> {
        let Some(input) = self.prompt("Account ID: ")? else {
            return Ok(());
        };
        let id = AccountId::new(input);

        match self.cache.checkout(self.storage, &id).await {
            Ok(account) => {
                self.cache.checkin(account);
                writeln!(self.output, "Account {} selected", id)?;
                self.current = Some(id);
            }
            Err(err) => self.report(&err)?,
        }
        Ok(())
    }

    async fn list_accounts(&mut self) -> Result<()> {
        let mut accounts = match self.storage.list_all().await {
            Ok(accounts) => accounts,
            Err(err) => return self.report(&AppError::from(err)),
        };
        if accounts.is_empty() {
            writeln!(self.output, "No accounts found")?;
            return Ok(());
        }

        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        writeln!(self.output, "--- All accounts ---")?;
        for account in &accounts {
            writeln!(
                self.output,
                "ID: {} | Owner: {} | Balance: {}",
                account.id(),
                account.owner_name(),
                format_cents(account.balance())
            )?;
        }
        Ok(())
    }

    async fn check_integrity(&mut self) -> Result<()> {
        let report = match check_integrity(self.storage).await {
            Ok(report) => report,
            Err(err) => return self.report(&err),
        };

        if report.is_ok() {
            writeln!(
                self.output,
                "Ledger OK: {} account(s), {} transaction(s)",
                report.account_count, report.transaction_count
            )?;
        } else {
            writeln!(
                self.output,
                "Ledger has {} issue(s):",
                report.issues.len()
            )?;
            for issue in &report.issues {
                writeln!(self.output, "  - {}", issue)?;
            }
        }
        Ok(())
    }

    async fn export_snapshot(&mut self) -> Result<()> {
        let Some(path) = self.prompt("Output file: ")? else {
            return Ok(());
        };
        let accounts = match self.storage.list_all().await {
            Ok(accounts) => accounts,
            Err(err) => return self.report(&AppError::from(err)),
        };

        let written = File::create(&path)
            .with_context(|| format!("Failed to create '{}'", path))
            .and_then(|file| export_snapshot_json(accounts, self.clock.now(), BufWriter::new(file)));
        match written {
            Ok(snapshot) => writeln!(
                self.output,
                "Exported {} account(s) to {}",
                snapshot.accounts.len(),
                path
            )?,
            Err(err) => writeln!(self.output, "Error: {:#}", err)?,
        }
        Ok(())
    }

    fn read_amount(&mut self, text: &str) -> Result<Option<Cents>> {
        let Some(input) = self.prompt(text)? else {
            return Ok(None);
        };
        match parse_cents(&input) {
            Ok(amount) => Ok(Some(amount)),
            Err(err) => {
                writeln!(self.output, "Error: {}", err)?;
                Ok(None)
            }
        }
    }

    async fn move_money(&mut self, id: &AccountId, movement: Movement) -> Result<()> {
        let text = match movement {
            Movement::Deposit => "Amount to deposit: ",
            Movement::Withdraw => "Amount to withdraw: ",
        };
        let Some(amount) = self.read_amount(text)? else {
            return Ok(());
        };

        let mut account = match self.cache.checkout(self.storage, id).await {
            Ok(account) => account,
            Err(err) => return self.report(&err),
        };
        let mut service =
            AccountService::new(&mut account, self.storage, self.ids).with_clock(self.clock);
        let result = match movement {
            Movement::Deposit => service.deposit(amount).await,
            Movement::Withdraw => service.withdraw(amount).await,
        };
        self.cache.checkin(account);

        match (result, movement) {
            (Ok(_), Movement::Deposit) => {
                writeln!(self.output, "Deposited {}", format_cents(amount))?
            }
            (Ok(_), Movement::Withdraw) => {
                writeln!(self.output, "Withdrew {}", format_cents(amount))?
            }
            (Err(err), _) => self.report(&err)?,
        }
        Ok(())
    }

    async fn transfer(&mut self, id: &AccountId) -> Result<()> {
        let Some(amount) = self.read_amount("Amount to transfer: ")? else {
            return Ok(());
        };
        let Some(target_input) = self.prompt("Target account ID: ")? else {
            return Ok(());
        };
        let target_id = AccountId::new(target_input);

        let mut source = match self.cache.checkout(self.storage, id).await {
            Ok(account) => account,
            Err(err) => return self.report(&err),
        };
        // A self-transfer still goes through the engine so it is rejected
        // there; the copy is discarded afterwards.
        let same_account = target_id == *id;
        let mut target = if same_account {
            source.clone()
        } else {
            match self.cache.checkout(self.storage, &target_id).await {
                Ok(account) => account,
                Err(err) => {
                    self.cache.checkin(source);
                    return self.report(&err);
                }
            }
        };

        let result = AccountService::new(&mut source, self.storage, self.ids)
            .with_clock(self.clock)
            .transfer(&mut target, amount)
            .await;
        self.cache.checkin(source);
        if !same_account {
            self.cache.checkin(target);
        }

        match result {
            Ok(_) => writeln!(
                self.output,
                "Transferred {} to {}",
                format_cents(amount),
                target_id
            )?,
            Err(err) => self.report(&err)?,
        }
        Ok(())
    }

    async fn show_balance(&mut self, id: &AccountId) -> Result<()> {
        let account = match self.cache.checkout(self.storage, id).await {
            Ok(account) => account,
            Err(err) => return self.report(&err),
        };
        writeln!(
            self.output,
            "Current balance: {}",
            format_cents(account.balance())
        )?;
        self.cache.checkin(account);
        Ok(())
    }

    async fn show_statement(&mut self, id: &AccountId) -> Result<()> {
        let account = match self.cache.checkout(self.storage, id).await {
            Ok(account) => account,
            Err(err) => return self.report(&err),
        };
        let statement = render_statement(&account);
        self.cache.checkin(account);
        writeln!(self.output, "{}", statement.trim_end())?;
        Ok(())
    }

    async fn export_statement(&mut self, id: &AccountId) -> Result<()> {
        let Some(path) = self.prompt("Output file: ")? else {
            return Ok(());
        };
        let account = match self.cache.checkout(self.storage, id).await {
            Ok(account) => account,
            Err(err) => return self.report(&err),
        };

        let written = File::create(&path)
            .with_context(|| format!("Failed to create '{}'", path))
            .and_then(|file| export_statement_csv(&account, BufWriter::new(file)));
        self.cache.checkin(account);
        match written {
            Ok(rows) => writeln!(self.output, "Exported {} transaction(s) to {}", rows, path)?,
            Err(err) => writeln!(self.output, "Error: {:#}", err)?,
        }
        Ok(())
    }
}
