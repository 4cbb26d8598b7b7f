use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContributionFrequency {
    #[default]
    Monthly,
    Yearly,
}

impl ContributionFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            ContributionFrequency::Monthly => 12,
            ContributionFrequency::Yearly => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FilingStatus {
    #[default]
    Single,
    Married,
    HeadOfHousehold,
}

/// Inputs to a growth projection. Rates are percents, e.g. `7.0` for 7%.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInputs {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub years: u32,
    pub contribution_amount: f64,
    pub contribution_frequency: ContributionFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBalance {
    pub year: u32,
    pub amount: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProjection {
    pub final_amount: f64,
    pub total_interest: f64,
    pub total_contributions: f64,
    pub yearly_breakdown: Vec<YearlyBalance>,
}

#[derive(Debug, Clone, Copy)]
pub struct TaxInputs {
    pub salary: f64,
    pub other_income: f64,
    pub deductions: f64,
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxComponent {
    pub name: &'static str,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub total_income: f64,
    pub taxable_income: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub breakdown: Vec<TaxComponent>,
}

impl TaxEstimate {
    pub fn component(&self, name: &str) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.amount)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Investment,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
    Investment,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: f64,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ledger {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub goals: Vec<FinancialGoal>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: String,
    pub name: String,
    pub progress_percent: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_net: f64,
    /// Net as a share of income; 0 when the month has no income.
    pub savings_rate_percent: f64,
    pub goals: Vec<GoalProgress>,
}
