pub mod db;

pub mod identity;
pub mod ledger;
pub mod notifications;
pub mod portfolio;
pub mod properties;
pub mod trading;
pub mod wallets;

pub mod constants;
pub mod errors;
pub mod response;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use errors::{Error, Result};
pub use response::ResponseMessage;
