use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::properties_errors::{PropertyError, Result};
use crate::constants::{
    CATEGORY_COMMERCIAL, CATEGORY_FARM, CATEGORY_RESIDENTIAL, DECIMAL_PRECISION,
};

/// Category of a listed property. Determines which area attribute seeds the
/// share inventory when it has never been traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyCategory {
    Residential,
    Commercial,
    Farm,
}

impl PropertyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCategory::Residential => CATEGORY_RESIDENTIAL,
            PropertyCategory::Commercial => CATEGORY_COMMERCIAL,
            PropertyCategory::Farm => CATEGORY_FARM,
        }
    }
}

impl FromStr for PropertyCategory {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            CATEGORY_RESIDENTIAL => Ok(PropertyCategory::Residential),
            CATEGORY_COMMERCIAL => Ok(PropertyCategory::Commercial),
            CATEGORY_FARM => Ok(PropertyCategory::Farm),
            other => Err(PropertyError::InvalidData(format!(
                "Unknown property category: {}",
                other
            ))),
        }
    }
}

/// Remaining tradable share inventory for a property.
///
/// Inventory starts `Uninitialized` and transitions to `Initialized` exactly
/// once, when the first trade derives the share count from the category area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShareInventory {
    Uninitialized,
    Initialized(Decimal),
}

impl ShareInventory {
    pub fn as_option(&self) -> Option<Decimal> {
        match self {
            ShareInventory::Uninitialized => None,
            ShareInventory::Initialized(n) => Some(*n),
        }
    }
}

/// Domain model for a property in the reference catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub category: PropertyCategory,
    pub price: Decimal,
    pub available_shares: ShareInventory,
    pub carpet_area: Option<Decimal>,
    pub plot_area: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Property {
    /// Share count seeded on the first trade: carpet area for residential and
    /// commercial listings, plot area for farm land.
    pub fn initial_shares(&self) -> Result<Decimal> {
        let area = match self.category {
            PropertyCategory::Residential | PropertyCategory::Commercial => self.carpet_area,
            PropertyCategory::Farm => self.plot_area,
        };
        area.ok_or_else(|| {
            PropertyError::MissingArea(format!(
                "Property {} has no {} area to derive available shares from",
                self.id,
                self.category.as_str()
            ))
        })
    }
}

/// Input model for adding a property to the reference catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub category: PropertyCategory,
    pub price: Decimal,
    pub available_shares: Option<Decimal>,
    pub carpet_area: Option<Decimal>,
    pub plot_area: Option<Decimal>,
}

impl NewProperty {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(PropertyError::InvalidData(
                "Property title cannot be empty".to_string(),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(PropertyError::InvalidData(
                "Property price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One price sample in a property's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub sampled_at: NaiveDateTime,
    pub price: Decimal,
}

/// Database model for properties
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::properties)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropertyDB {
    pub id: String,
    pub title: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub category: String,
    pub price: String,
    pub available_shares: Option<String>,
    pub carpet_area: Option<String>,
    pub plot_area: Option<String>,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

/// Database model for price candles
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::price_candles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CandleDB {
    pub id: String,
    pub property_id: String,
    pub sampled_at: NaiveDateTime,
    pub price: String,
}

impl TryFrom<PropertyDB> for Property {
    type Error = PropertyError;

    fn try_from(db: PropertyDB) -> Result<Self> {
        let category = db.category.parse::<PropertyCategory>()?;
        let available_shares = match db.available_shares.as_deref() {
            None => ShareInventory::Uninitialized,
            Some(raw) => ShareInventory::Initialized(parse_decimal(raw, "available_shares")?),
        };
        Ok(Self {
            id: db.id,
            title: db.title,
            address: db.address,
            logo_url: db.logo_url,
            category,
            price: parse_decimal(&db.price, "price")?,
            available_shares,
            carpet_area: db
                .carpet_area
                .as_deref()
                .map(|raw| parse_decimal(raw, "carpet_area"))
                .transpose()?,
            plot_area: db
                .plot_area
                .as_deref()
                .map(|raw| parse_decimal(raw, "plot_area"))
                .transpose()?,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewProperty> for PropertyDB {
    fn from(domain: NewProperty) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            title: domain.title,
            address: domain.address,
            logo_url: domain.logo_url,
            category: domain.category.as_str().to_string(),
            price: domain.price.round_dp(DECIMAL_PRECISION).to_string(),
            available_shares: domain
                .available_shares
                .map(|n| n.round_dp(DECIMAL_PRECISION).to_string()),
            carpet_area: domain.carpet_area.map(|n| n.to_string()),
            plot_area: domain.plot_area.map(|n| n.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CandleDB> for Candle {
    type Error = PropertyError;

    fn try_from(db: CandleDB) -> Result<Self> {
        Ok(Self {
            sampled_at: db.sampled_at,
            price: parse_decimal(&db.price, "price")?,
        })
    }
}

pub(crate) fn parse_decimal(raw: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| PropertyError::InvalidData(format!("Bad {} value '{}': {}", field, raw, e)))
}
