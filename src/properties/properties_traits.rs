use std::collections::HashMap;

use rust_decimal::Decimal;

use super::properties_model::{Candle, Property};
use super::properties_errors::Result;

/// Read surface of the property reference consumed by the valuator and the
/// ledger history queries.
pub trait PropertyReferenceTrait: Send + Sync {
    fn get_property(&self, property_id: &str) -> Result<Property>;
    fn get_price_history(&self, property_id: &str) -> Result<Vec<Candle>>;
    fn get_titles(&self, property_ids: &[String]) -> Result<HashMap<String, String>>;
    fn add_candle(&self, property_id: &str, price: Decimal) -> Result<Candle>;
}

impl PropertyReferenceTrait for super::PropertyRepository {
    fn get_property(&self, property_id: &str) -> Result<Property> {
        self.get_by_id(property_id)
    }

    fn get_price_history(&self, property_id: &str) -> Result<Vec<Candle>> {
        self.get_price_history(property_id)
    }

    fn get_titles(&self, property_ids: &[String]) -> Result<HashMap<String, String>> {
        self.get_titles(property_ids)
    }

    fn add_candle(&self, property_id: &str, price: Decimal) -> Result<Candle> {
        self.add_candle(property_id, price)
    }
}
