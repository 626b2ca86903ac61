use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::ledger_model::{
    LedgerEventType, LedgerEventView, LedgerSearchFilter, LedgerSearchResponse,
    LedgerSearchResponseMeta,
};
use super::ledger_repository::LedgerRepository;
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::errors::Result;
use crate::identity::IdentityProvider;
use crate::properties::PropertyReferenceTrait;

/// Read-only history queries over the unified ledger
pub struct LedgerService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    identity: Arc<dyn IdentityProvider>,
    property_reference: Arc<dyn PropertyReferenceTrait>,
}

impl LedgerService {
    pub fn new(
        pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
        identity: Arc<dyn IdentityProvider>,
        property_reference: Arc<dyn PropertyReferenceTrait>,
    ) -> Self {
        Self {
            pool,
            identity,
            property_reference,
        }
    }

    /// One page of the caller's history, newest first, with property titles
    /// denormalized by a secondary lookup over the page's distinct ids.
    pub fn search_entries(
        &self,
        credential: &str,
        filter: LedgerSearchFilter,
        page: i64,
        page_size: i64,
    ) -> Result<LedgerSearchResponse> {
        let user_id = self.identity.resolve_user(credential)?;
        debug!("Searching ledger history for user {}", user_id);

        let page_size = if page_size > 0 {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        let repo = LedgerRepository::new(self.pool.clone());
        let (events, total_row_count) = repo.search(&user_id, &filter, page, page_size)?;

        let mut property_ids: Vec<String> = events
            .iter()
            .filter_map(|e| e.property_id.clone())
            .collect();
        property_ids.sort();
        property_ids.dedup();

        let titles = if property_ids.is_empty() {
            Default::default()
        } else {
            self.property_reference.get_titles(&property_ids)?
        };

        let data = events
            .into_iter()
            .map(|event| {
                let property_title = event
                    .property_id
                    .as_ref()
                    .and_then(|id| titles.get(id).cloned());
                LedgerEventView {
                    event,
                    property_title,
                }
            })
            .collect();

        Ok(LedgerSearchResponse {
            data,
            meta: LedgerSearchResponseMeta { total_row_count },
        })
    }

    /// Share-trade history (the original share-transaction ledger view)
    pub fn get_share_transactions(
        &self,
        credential: &str,
        mut filter: LedgerSearchFilter,
        page: i64,
        page_size: i64,
    ) -> Result<LedgerSearchResponse> {
        filter.event_types = Some(LedgerEventType::trades());
        self.search_entries(credential, filter, page, page_size)
    }

    /// Cash-movement history (the original fiat ledger view)
    pub fn get_cash_movements(
        &self,
        credential: &str,
        mut filter: LedgerSearchFilter,
        page: i64,
        page_size: i64,
    ) -> Result<LedgerSearchResponse> {
        filter.event_types = Some(LedgerEventType::cash_movements());
        self.search_entries(credential, filter, page, page_size)
    }
}
