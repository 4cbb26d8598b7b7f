mod investment;
mod ledger;
mod tax;
mod types;

pub use investment::project_investment_growth;
pub use ledger::{
    add_transaction, delete_transaction, filter_transactions, goal_progress, sample_ledger,
    summarize_dashboard, update_transaction,
};
pub use tax::{
    FEDERAL_INCOME_TAX, MEDICARE, SINGLE_FEDERAL_BRACKETS, SOCIAL_SECURITY, STATE_INCOME_TAX,
    TaxBracket, estimate_tax, federal_income_tax, medicare_tax, social_security_tax,
    state_income_tax,
};
pub use types::{
    Account, AccountKind, ContributionFrequency, DashboardSummary, FilingStatus, FinancialGoal,
    GoalProgress, InvestmentProjection, Ledger, ProjectionInputs, TaxComponent, TaxEstimate,
    TaxInputs, Transaction, TransactionFilter, TransactionType, YearlyBalance,
};
