mod transaction;

pub use transaction::{Transaction, TxnKind};
