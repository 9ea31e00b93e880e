mod account;
mod ids;
mod ledger;
mod money;
mod transaction;

pub use account::Account;
pub use ids::*;
pub use ledger::*;
pub use money::*;
pub use transaction::*;
