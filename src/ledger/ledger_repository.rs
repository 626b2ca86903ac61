use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{Bool, Double};
use diesel::sqlite::SqliteConnection;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

use super::ledger_errors::{LedgerError, Result};
use super::ledger_model::{
    LedgerEntryDB, LedgerEvent, LedgerSearchFilter, NewLedgerEvent,
};
use crate::db::get_connection;
use crate::schema::ledger_entries;

/// Repository for the append-only unified ledger
pub struct LedgerRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Appends one event inside the single-writer transaction. Entries are
    /// immutable once written; there is no update or delete surface.
    pub fn append(conn: &mut SqliteConnection, new_event: NewLedgerEvent) -> Result<LedgerEvent> {
        let entry_db: LedgerEntryDB = new_event.into();

        diesel::insert_into(ledger_entries::table)
            .values(&entry_db)
            .execute(conn)?;

        entry_db.try_into()
    }

    /// Retrieves one event by its transaction id
    pub fn get_by_id(&self, transaction_id: &str) -> Result<LedgerEvent> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        ledger_entries::table
            .find(transaction_id)
            .first::<LedgerEntryDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => LedgerError::NotFound(format!(
                    "Transaction with id {} not found",
                    transaction_id
                )),
                _ => LedgerError::DatabaseError(e.to_string()),
            })?
            .try_into()
    }

    /// Paginated history for a user, newest first. Returns the page plus the
    /// total match count for client-side pagination controls.
    pub fn search(
        &self,
        user_id: &str,
        filter: &LedgerSearchFilter,
        page: i64,      // Page number, 1-based
        page_size: i64, // Number of items per page
    ) -> Result<(Vec<LedgerEvent>, i64)> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        let offset = (page.max(1) - 1) * page_size;

        // Boxed queries are not Clone, so the builder runs once for the count
        // and once for the page.
        let create_base_query = || {
            let mut query = ledger_entries::table
                .filter(ledger_entries::user_id.eq(user_id.to_string()))
                .into_boxed();

            if let Some(ref property_id) = filter.property_id {
                query = query.filter(ledger_entries::property_id.eq(property_id.clone()));
            }
            if let Some(ref event_types) = filter.event_types {
                let names: Vec<String> =
                    event_types.iter().map(|t| t.as_str().to_string()).collect();
                query = query.filter(ledger_entries::event_type.eq_any(names));
            }
            // Monetary columns are stored as TEXT; floors compare numerically
            if let Some(min_quantity) = filter.min_quantity.and_then(|d| d.to_f64()) {
                query = query.filter(
                    diesel::dsl::sql::<Bool>("CAST(quantity AS REAL) >= ")
                        .bind::<Double, _>(min_quantity),
                );
            }
            if let Some(min_amount) = filter.min_amount.and_then(|d| d.to_f64()) {
                query = query.filter(
                    diesel::dsl::sql::<Bool>("CAST(amount AS REAL) >= ")
                        .bind::<Double, _>(min_amount),
                );
            }
            if let Some(min_price) = filter.min_price.and_then(|d| d.to_f64()) {
                query = query.filter(
                    diesel::dsl::sql::<Bool>("CAST(price AS REAL) >= ")
                        .bind::<Double, _>(min_price),
                );
            }

            query
        };

        let total_row_count = create_base_query().count().get_result::<i64>(&mut conn)?;

        let results = create_base_query()
            .order(ledger_entries::event_date.desc())
            .then_order_by(ledger_entries::created_at.desc())
            .limit(page_size)
            .offset(offset)
            .load::<LedgerEntryDB>(&mut conn)?;

        let events = results
            .into_iter()
            .map(LedgerEvent::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((events, total_row_count))
    }
}
