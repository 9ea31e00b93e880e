// Application layer: the transaction engine and the pieces a caller needs
// around it (account opening, statements, session cache, integrity checks).

pub mod error;
mod integrity;
mod service;
mod session;
mod statement;

pub use error::*;
pub use integrity::check_integrity;
pub use service::{AccountService, TransferReceipt, open_account};
pub use session::SessionCache;
pub use statement::{EMPTY_HISTORY, render_statement};
