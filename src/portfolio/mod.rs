pub(crate) mod portfolio_errors;
pub(crate) mod portfolio_model;
pub(crate) mod portfolio_service;
pub mod returns_calculator;

pub use portfolio_errors::PortfolioError;
pub use portfolio_model::{
    InvestmentProgress, PortfolioPositionView, PropertyWalletValue, WalletView,
};
pub use portfolio_service::PortfolioService;
