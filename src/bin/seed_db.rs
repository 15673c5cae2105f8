use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use financeflow::{
    balance::{NewBalanceSnapshot, create_balance},
    budget::{BudgetExpense, NewBudget, create_budget},
    debt::{NewDebt, create_debt},
    earning::{NewEarning, Recurrence, create_earning},
    goal::{NewSavingsGoal, create_goal},
    initialize_db,
    lending::{LendingStatus, NewLending, create_lending},
    transaction::{NewTransaction, PaymentChannel, TransactionKind, create_transaction},
};

/// A utility for creating a test database for the REST API server of financeflow.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Inserting sample records...");

    create_balance(
        NewBalanceSnapshot {
            date: date!(2025 - 06 - 01),
            bank: 2500.0,
            upi: 300.0,
            cash: 120.0,
        },
        &conn,
    )?;

    create_transaction(
        NewTransaction {
            description: "Monthly salary".to_string(),
            amount: 3200.0,
            date: date!(2025 - 06 - 02),
            category: "Salary".to_string(),
            kind: TransactionKind::Income,
            channel: PaymentChannel::Other,
        },
        &conn,
    )?;
    create_transaction(
        NewTransaction {
            description: "Groceries".to_string(),
            amount: 84.2,
            date: date!(2025 - 06 - 03),
            category: "Food".to_string(),
            kind: TransactionKind::Expense,
            channel: PaymentChannel::Card,
        },
        &conn,
    )?;
    create_transaction(
        NewTransaction {
            description: "Coffee".to_string(),
            amount: 4.5,
            date: date!(2025 - 06 - 04),
            category: "Food".to_string(),
            kind: TransactionKind::Expense,
            channel: PaymentChannel::Upi,
        },
        &conn,
    )?;

    create_goal(
        NewSavingsGoal {
            name: "Emergency fund".to_string(),
            current_amount: 1500.0,
            target_amount: 5000.0,
            deadline: Some(date!(2026 - 01 - 01)),
        },
        &conn,
    )?;

    create_debt(
        NewDebt {
            name: "Car loan".to_string(),
            initial_amount: 12000.0,
            current_balance: 8400.0,
            interest_rate: 6.5,
        },
        &conn,
    )?;

    create_lending(
        NewLending {
            borrower: "Sam".to_string(),
            amount: 200.0,
            status: LendingStatus::Pending,
            date: date!(2025 - 05 - 20),
        },
        &conn,
    )?;

    create_earning(
        NewEarning {
            description: "Freelance article".to_string(),
            amount: 150.0,
            date: date!(2025 - 06 - 05),
            recurrence: Recurrence::OneTime,
        },
        &conn,
    )?;

    create_budget(
        NewBudget {
            name: "June".to_string(),
            expenses: vec![
                BudgetExpense {
                    category: "Rent".to_string(),
                    amount: 1200.0,
                },
                BudgetExpense {
                    category: "Food".to_string(),
                    amount: 400.0,
                },
            ],
        },
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
