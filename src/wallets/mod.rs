pub(crate) mod wallets_errors;
pub(crate) mod wallets_model;
pub(crate) mod wallets_repository;
pub(crate) mod wallets_service;

pub use wallets_errors::{Result, WalletError};
pub use wallets_model::{
    Position, PositionDB, PositionSnapshot, Wallet, WalletDB, WalletSnapshot,
};
pub use wallets_repository::WalletRepository;
pub use wallets_service::WalletService;
