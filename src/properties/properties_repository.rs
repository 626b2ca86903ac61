use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use rust_decimal::Decimal;

use super::properties_errors::{PropertyError, Result};
use super::properties_model::{
    Candle, CandleDB, NewProperty, Property, PropertyDB, ShareInventory,
};
use crate::constants::DECIMAL_PRECISION;
use crate::db::get_connection;
use crate::schema::{price_candles, properties};

/// Repository for the property reference catalog.
///
/// Reads go through the pool; the mutating helpers take an explicit
/// connection so the trading engine can call them inside the single-writer
/// transaction.
pub struct PropertyRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PropertyRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Adds a property to the catalog (embedding apps and fixtures)
    pub fn create(&self, new_property: NewProperty) -> Result<Property> {
        new_property.validate()?;

        let mut property_db: PropertyDB = new_property.into();
        if property_db.id.is_empty() {
            property_db.id = Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        diesel::insert_into(properties::table)
            .values(&property_db)
            .execute(&mut conn)?;

        let property = Self::get_for_update(&mut conn, &property_db.id)?;
        drop(conn);

        // Listing price becomes the first sample of the candle series
        self.add_candle(&property.id, property.price)?;
        Ok(property)
    }

    /// Re-prices a property and appends the new price to its candle series
    pub fn update_price(&self, property_id: &str, price: Decimal) -> Result<Candle> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(properties::table.find(property_id))
            .set((
                properties::price.eq(price.round_dp(DECIMAL_PRECISION).to_string()),
                properties::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;
        if affected == 0 {
            return Err(PropertyError::NotFound(format!(
                "Property with id {} not found",
                property_id
            )));
        }
        drop(conn);

        self.add_candle(property_id, price)
    }

    /// Retrieves a property by its ID
    pub fn get_by_id(&self, property_id: &str) -> Result<Property> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;
        Self::get_for_update(&mut conn, property_id)
    }

    /// Retrieves a property on an explicit connection (single-writer path)
    pub fn get_for_update(conn: &mut SqliteConnection, property_id: &str) -> Result<Property> {
        let property_db = properties::table
            .find(property_id)
            .first::<PropertyDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PropertyError::NotFound(format!(
                    "Property with id {} not found",
                    property_id
                )),
                _ => PropertyError::DatabaseError(e.to_string()),
            })?;

        property_db.try_into()
    }

    /// Resolves the tradable share inventory, deriving and persisting it from
    /// the category area on first resolution.
    pub fn resolve_available_shares(
        conn: &mut SqliteConnection,
        property: &Property,
    ) -> Result<Decimal> {
        match property.available_shares {
            ShareInventory::Initialized(n) => Ok(n),
            ShareInventory::Uninitialized => {
                let initial = property.initial_shares()?;
                debug!(
                    "Initializing share inventory for property {}: {}",
                    property.id, initial
                );
                Self::set_available_shares(conn, &property.id, initial)?;
                Ok(initial)
            }
        }
    }

    /// Applies a delta to the share inventory, rejecting any adjustment that
    /// would take it below zero.
    pub fn adjust_available_shares(
        conn: &mut SqliteConnection,
        property_id: &str,
        delta: Decimal,
    ) -> Result<Decimal> {
        let property = Self::get_for_update(conn, property_id)?;
        let current = property.available_shares.as_option().ok_or_else(|| {
            PropertyError::InvalidData(format!(
                "Share inventory for property {} was never initialized",
                property_id
            ))
        })?;

        let updated = current + delta;
        if updated < Decimal::ZERO {
            return Err(PropertyError::InsufficientShares(format!(
                "Property {} has {} shares available, cannot adjust by {}",
                property_id, current, delta
            )));
        }

        Self::set_available_shares(conn, property_id, updated)?;
        Ok(updated)
    }

    fn set_available_shares(
        conn: &mut SqliteConnection,
        property_id: &str,
        shares: Decimal,
    ) -> Result<()> {
        diesel::update(properties::table.find(property_id))
            .set((
                properties::available_shares
                    .eq(shares.round_dp(DECIMAL_PRECISION).to_string()),
                properties::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        Ok(())
    }

    /// Ordered price history for a property, oldest first
    pub fn get_price_history(&self, property_id: &str) -> Result<Vec<Candle>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        price_candles::table
            .filter(price_candles::property_id.eq(property_id))
            .order(price_candles::sampled_at.asc())
            .load::<CandleDB>(&mut conn)?
            .into_iter()
            .map(Candle::try_from)
            .collect()
    }

    /// Appends a price sample to a property's history
    pub fn add_candle(&self, property_id: &str, price: Decimal) -> Result<Candle> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let candle_db = CandleDB {
            id: Uuid::new_v4().to_string(),
            property_id: property_id.to_string(),
            sampled_at: chrono::Utc::now().naive_utc(),
            price: price.round_dp(DECIMAL_PRECISION).to_string(),
        };

        diesel::insert_into(price_candles::table)
            .values(&candle_db)
            .execute(&mut conn)?;

        candle_db.try_into()
    }

    /// Titles for a set of properties, keyed by property id. Used to
    /// denormalize ledger pages without a join per row.
    pub fn get_titles(&self, property_ids: &[String]) -> Result<HashMap<String, String>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let rows = properties::table
            .filter(properties::id.eq_any(property_ids))
            .select((properties::id, properties::title))
            .load::<(String, String)>(&mut conn)?;

        Ok(rows.into_iter().collect())
    }
}
