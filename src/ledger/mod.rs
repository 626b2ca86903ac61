pub(crate) mod ledger_errors;
pub(crate) mod ledger_model;
pub(crate) mod ledger_repository;
pub(crate) mod ledger_service;

pub use ledger_errors::LedgerError;
pub use ledger_model::{
    LedgerEntryDB, LedgerEvent, LedgerEventType, LedgerEventView, LedgerSearchFilter,
    LedgerSearchResponse, LedgerSearchResponseMeta, NewLedgerEvent,
};
pub use ledger_repository::LedgerRepository;
pub use ledger_service::LedgerService;
