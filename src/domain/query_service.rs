//! Read-only query facade over cards, ledger entries, and block requests.
//!
//! Every accessor enforces visibility: owners see their own records, admins
//! see everything. Listings use cursor pagination; the cursor is the id of
//! the last item on the previous page.

use chrono::Local;

use crate::domain::commands::block_requests::RequestListQuery;
use crate::domain::commands::cards::{
    CardDetails, CardListQuery, CardListResult, CardView, PaginationInfo,
};
use crate::domain::commands::transfers::{DateRangeQuery, EntryListQuery, EntryListResult};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BlockRequest, CallerContext, Card, CardId, EntryId, LedgerEntry,
};
use crate::storage::memory::{
    AccountHolderRepository, BlockRequestRepository, CardRepository, LedgerRepository,
    MemoryConnection,
};
use crate::storage::traits::{
    AccountHolderStorage, BlockRequestStorage, CardStorage, LedgerStorage,
};
use crate::util::local_day_bounds;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct QueryService {
    cards: CardRepository,
    ledger: LedgerRepository,
    requests: BlockRequestRepository,
    holders: AccountHolderRepository,
}

impl QueryService {
    pub fn new(connection: MemoryConnection) -> Self {
        QueryService {
            cards: CardRepository::new(connection.clone()),
            ledger: LedgerRepository::new(connection.clone()),
            requests: BlockRequestRepository::new(connection.clone()),
            holders: AccountHolderRepository::new(connection),
        }
    }

    /// Fetch a single card as seen by its owner or an admin.
    pub fn get_card(&self, caller: &CallerContext, card_id: CardId) -> DomainResult<CardView> {
        let card = self.get_visible_card(caller, card_id)?;
        Ok(CardView::of(&card, Local::now().date_naive()))
    }

    /// Detail view: the card plus today's completed outgoing total and the
    /// owner's contact fields.
    pub fn get_card_details(
        &self,
        caller: &CallerContext,
        card_id: CardId,
    ) -> DomainResult<CardDetails> {
        let card = self.get_visible_card(caller, card_id)?;
        let (start, end) = local_day_bounds(Local::now());
        let today_spent = self.ledger.completed_outgoing_total(card.id, start, end)?;
        let owner = self
            .holders
            .get_holder(card.owner_id)?
            .ok_or_else(|| DomainError::NotFound("Account holder not found".to_string()))?;
        Ok(CardDetails {
            card: CardView::of(&card, Local::now().date_naive()),
            today_spent,
            owner_name: owner.full_name,
            owner_email: owner.email,
            block_reason: card.block_reason,
            blocked_at: card.blocked_at,
        })
    }

    /// The caller's own cards, newest first.
    pub fn list_owned_cards(
        &self,
        caller: &CallerContext,
        query: &CardListQuery,
    ) -> DomainResult<CardListResult> {
        let cards = self.cards.list_cards_by_owner(caller.account_holder_id)?;
        Ok(paginate_cards(cards, query))
    }

    /// Every card in the system. Admin only.
    pub fn list_all_cards(
        &self,
        caller: &CallerContext,
        query: &CardListQuery,
    ) -> DomainResult<CardListResult> {
        require_admin(caller, "You don't have permission to list all cards")?;
        let cards = self.cards.list_all_cards()?;
        Ok(paginate_cards(cards, query))
    }

    /// Fetch one ledger entry. Visible to admins and to holders who own a
    /// card on either side of the entry.
    pub fn get_transaction_details(
        &self,
        caller: &CallerContext,
        entry_id: EntryId,
    ) -> DomainResult<LedgerEntry> {
        let entry = self
            .ledger
            .get_entry(entry_id)?
            .ok_or_else(|| DomainError::NotFound("Transaction not found".to_string()))?;
        if !caller.is_admin() {
            let own_ids = self.owned_card_ids(caller)?;
            if !entry.involves_any(&own_ids) {
                return Err(DomainError::Forbidden(
                    "You don't have permission to view this transaction".to_string(),
                ));
            }
        }
        Ok(entry)
    }

    /// Entries involving any of the caller's cards, newest first.
    pub fn list_own_transactions(
        &self,
        caller: &CallerContext,
        query: &EntryListQuery,
    ) -> DomainResult<EntryListResult> {
        let own_ids = self.owned_card_ids(caller)?;
        let entries = self.ledger.list_entries_for_cards(&own_ids)?;
        Ok(paginate_entries(entries, query))
    }

    /// Entries involving one card. Owner or admin.
    pub fn list_card_transactions(
        &self,
        caller: &CallerContext,
        card_id: CardId,
        query: &EntryListQuery,
    ) -> DomainResult<EntryListResult> {
        let card = self.get_visible_card(caller, card_id)?;
        let entries = self.ledger.list_entries_for_card(card.id)?;
        Ok(paginate_entries(entries, query))
    }

    /// Every ledger entry. Admin only.
    pub fn list_all_transactions(
        &self,
        caller: &CallerContext,
        query: &EntryListQuery,
    ) -> DomainResult<EntryListResult> {
        require_admin(caller, "You don't have permission to list all transactions")?;
        let entries = self.ledger.list_all_entries()?;
        Ok(paginate_entries(entries, query))
    }

    /// Entries created in `[start, end)`, oldest first. Admin only.
    pub fn list_transactions_between(
        &self,
        caller: &CallerContext,
        query: &DateRangeQuery,
    ) -> DomainResult<Vec<LedgerEntry>> {
        require_admin(caller, "You don't have permission to list all transactions")?;
        if query.end <= query.start {
            return Err(DomainError::BadRequest(
                "End of the date range must be after its start".to_string(),
            ));
        }
        Ok(self.ledger.list_entries_between(query.start, query.end)?)
    }

    /// Block requests across all holders, optionally filtered by status.
    /// Admin only.
    pub fn list_requests(
        &self,
        caller: &CallerContext,
        query: &RequestListQuery,
    ) -> DomainResult<Vec<BlockRequest>> {
        require_admin(caller, "You don't have permission to list block requests")?;
        Ok(self.requests.list_requests(query.status)?)
    }

    /// The caller's own block requests, newest first.
    pub fn list_own_requests(&self, caller: &CallerContext) -> DomainResult<Vec<BlockRequest>> {
        Ok(self
            .requests
            .list_requests_by_holder(caller.account_holder_id)?)
    }

    fn get_visible_card(&self, caller: &CallerContext, card_id: CardId) -> DomainResult<Card> {
        let card = self
            .cards
            .get_card(card_id)?
            .ok_or_else(|| DomainError::NotFound("Card not found".to_string()))?;
        if !caller.is_admin() && !card.is_owned_by(caller.account_holder_id) {
            return Err(DomainError::Forbidden(
                "You don't have permission to view this card".to_string(),
            ));
        }
        Ok(card)
    }

    fn owned_card_ids(&self, caller: &CallerContext) -> DomainResult<Vec<CardId>> {
        Ok(self
            .cards
            .list_cards_by_owner(caller.account_holder_id)?
            .into_iter()
            .map(|card| card.id)
            .collect())
    }
}

fn require_admin(caller: &CallerContext, message: &str) -> DomainResult<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(message.to_string()))
    }
}

fn effective_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE).max(1) as usize
}

fn paginate_cards(cards: Vec<Card>, query: &CardListQuery) -> CardListResult {
    let today = Local::now().date_naive();
    let needle = query.search.as_deref().map(str::to_lowercase);

    let mut views: Vec<CardView> = cards
        .iter()
        .map(|card| CardView::of(card, today))
        .filter(|view| !query.active_only || view.status == crate::domain::models::CardStatus::Active)
        .filter(|view| match &needle {
            Some(needle) => {
                view.masked_number.to_lowercase().contains(needle)
                    || view.holder_name.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    if let Some(after) = query.after {
        if let Some(pos) = views.iter().position(|view| view.id == after) {
            views.drain(..=pos);
        }
    }

    let limit = effective_limit(query.limit);
    let has_more = views.len() > limit;
    views.truncate(limit);
    let next_cursor = if has_more {
        views.last().map(|view| view.id.to_string())
    } else {
        None
    };
    CardListResult {
        cards: views,
        pagination: PaginationInfo {
            has_more,
            next_cursor,
        },
    }
}

fn paginate_entries(entries: Vec<LedgerEntry>, query: &EntryListQuery) -> EntryListResult {
    let mut entries: Vec<LedgerEntry> = entries
        .into_iter()
        .filter(|entry| match query.status {
            Some(status) => entry.status == status,
            None => true,
        })
        .collect();

    if let Some(after) = query.after {
        if let Some(pos) = entries.iter().position(|entry| entry.id == after) {
            entries.drain(..=pos);
        }
    }

    let limit = effective_limit(query.limit);
    let has_more = entries.len() > limit;
    entries.truncate(limit);
    let next_cursor = if has_more {
        entries.last().map(|entry| entry.id.to_string())
    } else {
        None
    };
    EntryListResult {
        entries,
        pagination: PaginationInfo {
            has_more,
            next_cursor,
        },
    }
}
