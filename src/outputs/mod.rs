//! Output artifacts.
//!
//! - [`alert`]: the Markdown alert document consumed by the notifier
//!
//! ```text
//! alert.md     # written only when something new opened this run
//! status.json  # notified-years ledger (see `crate::state`)
//! ```

pub mod alert;
