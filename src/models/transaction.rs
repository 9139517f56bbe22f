use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Anything that is not literally "expense" counts as income,
    /// matching how the store's rows have always been classified.
    pub fn parse(s: &str) -> Self {
        match s {
            "expense" => Self::Expense,
            _ => Self::Income,
        }
    }
}

impl std::fmt::Display for TxnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub kind: TxnKind,
    pub category: String,
    pub quantity: Option<Decimal>,
    pub amount: Decimal,
    pub description: String,
    pub created_at: String,
    pub is_outlier: bool,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxnKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnKind::Expense
    }

    /// An expense that participates in clean totals and the category breakdown.
    /// The outlier flag is only meaningful on expenses.
    pub fn is_clean_expense(&self) -> bool {
        self.is_expense() && !self.is_outlier
    }

    pub fn is_outlier_expense(&self) -> bool {
        self.is_expense() && self.is_outlier
    }
}
