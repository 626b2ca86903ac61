use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use async_trait::async_trait;

use super::trading_errors::TradingError;
use super::trading_model::{BalanceReceipt, TradeReceipt};
use super::trading_traits::TradingServiceTrait;
use crate::db::WriteHandle;
use crate::errors::Result;
use crate::identity::IdentityProvider;
use crate::ledger::{LedgerRepository, NewLedgerEvent};
use crate::notifications::NotificationSink;
use crate::properties::{Property, PropertyRepository};
use crate::wallets::{Position, Wallet, WalletRepository};

/// The trading engine: validates and executes buys, sells, deposits and
/// withdrawals against the wallet, the property share inventory and the
/// unified ledger.
///
/// Every mutation runs as one job on the single-writer actor, inside one
/// immediate transaction: validation failures short-circuit with no side
/// effects, and the wallet, inventory and ledger writes of a successful
/// operation become visible together or not at all.
pub struct TradingService {
    writer: WriteHandle,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn NotificationSink>,
}

impl TradingService {
    pub fn new(
        writer: WriteHandle,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            writer,
            identity,
            notifier,
        }
    }

    /// Buys `quantity` shares of a property at its current price
    pub async fn buy(
        &self,
        credential: &str,
        property_id: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt> {
        let user_id = self.identity.resolve_user(credential)?;
        if quantity <= Decimal::ZERO {
            return Err(TradingError::InvalidAmount(format!(
                "Buy quantity must be positive, got {}",
                quantity
            ))
            .into());
        }

        debug!("Executing buy of {} shares of {} for user {}", quantity, property_id, user_id);

        let job_user_id = user_id.clone();
        let job_property_id = property_id.to_string();

        let receipt = self
            .writer
            .exec(move |conn| {
                let wallet = WalletRepository::get_for_update(conn, &job_user_id)?;
                let property = PropertyRepository::get_for_update(conn, &job_property_id)?;

                let available_shares =
                    PropertyRepository::resolve_available_shares(conn, &property)?;
                if available_shares < quantity {
                    return Err(TradingError::InsufficientInventory(format!(
                        "Only {} shares of property {} are available, please enter less quantity",
                        available_shares, job_property_id
                    ))
                    .into());
                }

                let cost = quantity * property.price;
                if cost > wallet.balance {
                    return Err(TradingError::InsufficientFunds(format!(
                        "You need at least {} to buy {} shares",
                        cost, quantity
                    ))
                    .into());
                }

                let position =
                    match WalletRepository::get_position(conn, &job_user_id, &job_property_id)? {
                        Some(mut position) => {
                            position.apply_buy(quantity, property.price);
                            position
                        }
                        None => Position::open(&job_user_id, &job_property_id, quantity, property.price),
                    };
                WalletRepository::upsert_position(conn, &position)?;
                WalletRepository::update_balance(conn, &job_user_id, wallet.balance - cost)?;
                PropertyRepository::adjust_available_shares(conn, &job_property_id, -quantity)?;

                let event = LedgerRepository::append(
                    conn,
                    NewLedgerEvent::buy(
                        &job_user_id,
                        &job_property_id,
                        quantity,
                        property.price,
                        cost,
                        wallet.balance,
                    ),
                )?;

                let user_wallet = WalletRepository::snapshot(conn, &job_user_id)?;
                Ok(TradeReceipt {
                    transaction_id: event.id,
                    user_wallet,
                })
            })
            .await?;

        self.notifier.notify(
            &user_id,
            "investment",
            "Shares purchased",
            &format!("Bought {} shares of property {}", quantity, property_id),
        );

        Ok(receipt)
    }

    /// Sells `quantity` shares of a property at its current price
    pub async fn sell(
        &self,
        credential: &str,
        property_id: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt> {
        let user_id = self.identity.resolve_user(credential)?;
        if quantity <= Decimal::ZERO {
            return Err(TradingError::InvalidAmount(format!(
                "Sell quantity must be positive, got {}",
                quantity
            ))
            .into());
        }

        debug!("Executing sell of {} shares of {} for user {}", quantity, property_id, user_id);

        let job_user_id = user_id.clone();
        let job_property_id = property_id.to_string();

        let receipt = self
            .writer
            .exec(move |conn| {
                let wallet = WalletRepository::get_for_update(conn, &job_user_id)?;
                let property: Property =
                    PropertyRepository::get_for_update(conn, &job_property_id)?;

                let mut position =
                    WalletRepository::get_position(conn, &job_user_id, &job_property_id)?
                        .filter(|p| p.quantity > Decimal::ZERO)
                        .ok_or_else(|| {
                            TradingError::InsufficientHoldings(format!(
                                "You do not have any shares of property {}",
                                job_property_id
                            ))
                        })?;
                if position.quantity < quantity {
                    return Err(TradingError::InsufficientHoldings(format!(
                        "You hold {} shares, cannot sell {}",
                        position.quantity, quantity
                    ))
                    .into());
                }

                position.apply_sell(quantity);
                let proceeds = quantity * property.price;

                WalletRepository::upsert_position(conn, &position)?;
                WalletRepository::update_balance(conn, &job_user_id, wallet.balance + proceeds)?;
                PropertyRepository::adjust_available_shares(conn, &job_property_id, quantity)?;

                let event = LedgerRepository::append(
                    conn,
                    NewLedgerEvent::sell(
                        &job_user_id,
                        &job_property_id,
                        quantity,
                        property.price,
                        proceeds,
                        wallet.balance,
                    ),
                )?;

                let user_wallet = WalletRepository::snapshot(conn, &job_user_id)?;
                Ok(TradeReceipt {
                    transaction_id: event.id,
                    user_wallet,
                })
            })
            .await?;

        self.notifier.notify(
            &user_id,
            "investment",
            "Shares sold",
            &format!("Sold {} shares of property {}", quantity, property_id),
        );

        Ok(receipt)
    }

    /// Credits the wallet's cash balance
    pub async fn add_balance(&self, credential: &str, amount: Decimal) -> Result<BalanceReceipt> {
        let user_id = self.identity.resolve_user(credential)?;
        if amount <= Decimal::ZERO {
            return Err(TradingError::InvalidAmount(format!(
                "Deposit amount must be positive, got {}",
                amount
            ))
            .into());
        }

        debug!("Depositing {} for user {}", amount, user_id);

        self.writer
            .exec(move |conn| {
                let wallet = WalletRepository::get_for_update(conn, &user_id)?;
                let balance = wallet.balance + amount;

                WalletRepository::update_balance(conn, &user_id, balance)?;
                let event = LedgerRepository::append(
                    conn,
                    NewLedgerEvent::deposit(&user_id, amount, wallet.balance),
                )?;

                Ok(BalanceReceipt {
                    transaction_id: event.id,
                    balance,
                })
            })
            .await
    }

    /// Debits the wallet's cash balance
    pub async fn withdraw_balance(
        &self,
        credential: &str,
        amount: Decimal,
    ) -> Result<BalanceReceipt> {
        let user_id = self.identity.resolve_user(credential)?;
        if amount < Decimal::ZERO {
            return Err(TradingError::InvalidAmount(format!(
                "Withdrawal amount cannot be negative, got {}",
                amount
            ))
            .into());
        }

        debug!("Withdrawing {} for user {}", amount, user_id);

        self.writer
            .exec(move |conn| {
                let wallet: Wallet = WalletRepository::get_for_update(conn, &user_id)?;
                if amount > wallet.balance {
                    return Err(TradingError::InsufficientFunds(format!(
                        "Cannot withdraw {}, balance is {}",
                        amount, wallet.balance
                    ))
                    .into());
                }
                let balance = wallet.balance - amount;

                WalletRepository::update_balance(conn, &user_id, balance)?;
                let event = LedgerRepository::append(
                    conn,
                    NewLedgerEvent::withdraw(&user_id, amount, wallet.balance),
                )?;

                Ok(BalanceReceipt {
                    transaction_id: event.id,
                    balance,
                })
            })
            .await
    }
}

#[async_trait]
impl TradingServiceTrait for TradingService {
    async fn buy(
        &self,
        credential: &str,
        property_id: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt> {
        TradingService::buy(self, credential, property_id, quantity).await
    }

    async fn sell(
        &self,
        credential: &str,
        property_id: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt> {
        TradingService::sell(self, credential, property_id, quantity).await
    }

    async fn add_balance(&self, credential: &str, amount: Decimal) -> Result<BalanceReceipt> {
        TradingService::add_balance(self, credential, amount).await
    }

    async fn withdraw_balance(&self, credential: &str, amount: Decimal) -> Result<BalanceReceipt> {
        TradingService::withdraw_balance(self, credential, amount).await
    }
}
