use chrono::{Datelike, NaiveDate};

use super::types::{
    Account, AccountKind, DashboardSummary, FinancialGoal, GoalProgress, Ledger, Transaction,
    TransactionFilter, TransactionType,
};

/// Applies the type and search filters, newest first.
///
/// The query is matched case-insensitively against description, category and
/// the amount's decimal rendering. A blank query matches everything.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    let query = filter
        .query
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<Transaction> = transactions
        .iter()
        .filter(|t| filter.kind.is_none_or(|kind| t.kind == kind))
        .filter(|t| match &query {
            Some(q) => transaction_matches(t, q),
            None => true,
        })
        .cloned()
        .collect();

    filtered.sort_by(|a, b| b.date.cmp(&a.date));
    filtered
}

fn transaction_matches(transaction: &Transaction, query: &str) -> bool {
    transaction.description.to_lowercase().contains(query)
        || transaction.category.to_lowercase().contains(query)
        || transaction.amount.to_string().contains(query)
}

/// Appends `transaction`. A blank id is replaced by one past the largest
/// numeric id already present.
pub fn add_transaction(
    mut transactions: Vec<Transaction>,
    mut transaction: Transaction,
) -> Vec<Transaction> {
    if transaction.id.trim().is_empty() {
        let next = transactions
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        transaction.id = next.to_string();
    }
    transactions.push(transaction);
    transactions
}

/// Replaces every transaction sharing `transaction.id`; unknown ids leave the list unchanged.
pub fn update_transaction(
    transactions: Vec<Transaction>,
    transaction: Transaction,
) -> Vec<Transaction> {
    transactions
        .into_iter()
        .map(|t| {
            if t.id == transaction.id {
                transaction.clone()
            } else {
                t
            }
        })
        .collect()
}

pub fn delete_transaction(mut transactions: Vec<Transaction>, id: &str) -> Vec<Transaction> {
    transactions.retain(|t| t.id != id);
    transactions
}

pub fn summarize_dashboard(ledger: &Ledger, year: i32, month: u32) -> DashboardSummary {
    let total_balance = ledger.accounts.iter().map(|a| a.balance).sum();

    let in_month = |t: &&Transaction| t.date.year() == year && t.date.month() == month;
    let monthly_total = |kind: TransactionType| -> f64 {
        ledger
            .transactions
            .iter()
            .filter(in_month)
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    };
    let monthly_income = monthly_total(TransactionType::Income);
    let monthly_expenses = monthly_total(TransactionType::Expense);

    let monthly_net = monthly_income - monthly_expenses;
    let savings_rate_percent = if monthly_income > 0.0 {
        monthly_net / monthly_income * 100.0
    } else {
        0.0
    };

    DashboardSummary {
        total_balance,
        monthly_income,
        monthly_expenses,
        monthly_net,
        savings_rate_percent,
        goals: ledger.goals.iter().map(goal_progress).collect(),
    }
}

pub fn goal_progress(goal: &FinancialGoal) -> GoalProgress {
    let progress_percent = if goal.target_amount > 0.0 {
        (goal.current_amount / goal.target_amount * 100.0).clamp(0.0, 100.0)
    } else if goal.current_amount >= 0.0 {
        100.0
    } else {
        0.0
    };

    GoalProgress {
        id: goal.id.clone(),
        name: goal.name.clone(),
        progress_percent,
        remaining: (goal.target_amount - goal.current_amount).max(0.0),
    }
}

/// Demo records for one user, rebuilt on every call.
pub fn sample_ledger(user_id: &str) -> Ledger {
    let transaction = |id: &str,
                       amount: f64,
                       kind: TransactionType,
                       category: &str,
                       description: &str,
                       date: NaiveDate| Transaction {
        id: id.to_string(),
        amount,
        kind,
        category: category.to_string(),
        description: description.to_string(),
        date,
        user_id: user_id.to_string(),
    };
    let account = |id: &str, name: &str, kind: AccountKind, balance: f64| Account {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        balance,
        user_id: user_id.to_string(),
    };
    let goal = |id: &str, name: &str, target: f64, current: f64, deadline: NaiveDate| {
        FinancialGoal {
            id: id.to_string(),
            name: name.to_string(),
            target_amount: target,
            current_amount: current,
            deadline,
            user_id: user_id.to_string(),
        }
    };

    use TransactionType::{Expense, Income, Investment};
    Ledger {
        transactions: vec![
            transaction("1", 5000.0, Income, "salary", "Monthly Salary", ymd(2023, 4, 1)),
            transaction("2", 75.0, Expense, "food", "Grocery Shopping", ymd(2023, 4, 3)),
            transaction("3", 200.0, Expense, "utilities", "Electricity Bill", ymd(2023, 4, 5)),
            transaction("4", 1000.0, Investment, "stocks", "Technology ETF", ymd(2023, 4, 10)),
            transaction("5", 120.0, Expense, "entertainment", "Concert Tickets", ymd(2023, 4, 15)),
            transaction("6", 300.0, Income, "dividend", "Quarterly Dividend", ymd(2023, 4, 15)),
            transaction("7", 500.0, Investment, "bonds", "Government Bonds", ymd(2023, 4, 20)),
            transaction("8", 150.0, Expense, "transportation", "Car Maintenance", ymd(2023, 4, 22)),
        ],
        accounts: vec![
            account("1", "Main Checking", AccountKind::Checking, 4500.0),
            account("2", "Savings Account", AccountKind::Savings, 12500.0),
            account("3", "Investment Portfolio", AccountKind::Investment, 32000.0),
            account("4", "Credit Card", AccountKind::Credit, -2300.0),
        ],
        goals: vec![
            goal("1", "Emergency Fund", 15000.0, 12500.0, ymd(2023, 12, 31)),
            goal("2", "Down Payment", 50000.0, 20000.0, ymd(2025, 6, 30)),
            goal("3", "Vacation", 5000.0, 2500.0, ymd(2023, 8, 31)),
        ],
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
