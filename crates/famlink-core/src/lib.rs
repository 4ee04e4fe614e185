//! Rule resolution and reconciliation for famlink
//!
//! Given a validated rule table and an evaluation instant, this crate
//! computes the effective [`Policy`] per app, diffs it against the
//! remote catalog, and issues (or simulates) the minimal set of
//! corrective actions.

mod reconcile;
mod resolver;

pub use reconcile::*;
pub use resolver::*;
