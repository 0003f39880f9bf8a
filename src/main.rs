use std::io::{BufRead, Write};

use chrono::{DateTime, Local};

use passbook::errors::LedgerError;
use passbook::io::Store;
use passbook::types::{Ledger, Money, TxKind};

fn main() {
    env_logger::init();
    let store = Store::new();
    let mut ledger = store.load();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print_menu();
        let Some(Ok(line)) = lines.next() else { break };
        match line.trim() {
            "1" => {
                if let Some(amount) = prompt_amount(&mut lines, "Enter amount to deposit (e.g., 100 or 100.50): ") {
                    apply(&mut ledger, TxKind::Deposit, amount);
                }
            }
            "2" => {
                if let Some(amount) = prompt_amount(&mut lines, "Enter amount to withdraw (e.g., 50 or 50.00): ") {
                    apply(&mut ledger, TxKind::Withdraw, amount);
                }
            }
            "3" => print_history(&ledger),
            "4" => println!("Current balance: {}", ledger.balance()),
            "0" => break,
            "" => continue,
            _ => println!("Unknown option. Please choose from the menu."),
        }
    }

    if store.save(&ledger).is_err() {
        eprintln!("Warning: some history files could not be written.");
    }
    println!("Goodbye! Data saved.");
}

fn print_menu() {
    println!();
    println!("==============================");
    println!("        PASSBOOK MENU");
    println!("==============================");
    println!("1) Deposit");
    println!("2) Withdraw");
    println!("3) View transactions");
    println!("4) View balance");
    println!("0) Exit");
    print!("Select an option: ");
    let _ = std::io::stdout().flush();
}

/// Prompts for a decimal amount, returning `None` on EOF or bad input
fn prompt_amount(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    prompt: &str,
) -> Option<Money> {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    let line = lines.next()?.ok()?;
    match Money::parse_decimal(&line) {
        Ok(amount) => Some(amount),
        Err(err) => {
            println!("Invalid amount ({err}). Please try again.");
            None
        }
    }
}

fn apply(ledger: &mut Ledger, kind: TxKind, amount: Money) {
    let result = match kind {
        TxKind::Deposit => ledger.deposit(amount),
        TxKind::Withdraw => ledger.withdraw(amount),
    };
    match result {
        Ok(tx) => {
            let verb = match kind {
                TxKind::Deposit => "Deposited",
                TxKind::Withdraw => "Withdrew",
            };
            println!("{verb} {}. New balance: {}", tx.amount(), tx.balance_after());
        }
        Err(err @ LedgerError::InsufficientFunds { .. }) => println!("{err}."),
        Err(err) => println!("Rejected: {err}."),
    }
}

fn print_history(ledger: &Ledger) {
    if ledger.is_empty() {
        println!("No transactions yet.");
        return;
    }
    println!();
    println!("--- Transaction History (most recent last) ---");
    for (index, tx) in ledger.history().enumerate() {
        let when = DateTime::from_timestamp(tx.timestamp(), 0)
            .map(|utc| {
                utc.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "(time unavailable)".to_string());
        let label = match tx.kind() {
            TxKind::Deposit => "DEPOSIT ",
            TxKind::Withdraw => "WITHDRAW",
        };
        println!(
            "[{:3}] {when}  |  {label} {}  |  Balance: {}",
            index + 1,
            tx.amount(),
            tx.balance_after()
        );
    }
    println!("---------------------------------------------");
}
