mod summary;
mod transaction;

pub use summary::{MtdAdjustment, SummaryRow};
pub use transaction::Transaction;

#[cfg(test)]
mod tests;
