//! Process-local invoice store.
//!
//! Every operation takes the single lock once, so a write is visible either
//! completely or not at all. Used for database-less runs and in tests.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::invoice::{
  Invoice, InvoiceAggregate, InvoiceItem, InvoiceNumber, ListOrder, errors::InvoiceError,
  ports::{InvoicePage, InvoiceQuery, InvoiceRepository},
};

#[derive(Default)]
struct Store {
  invoices: HashMap<Uuid, Invoice>,
  items: HashMap<Uuid, Vec<InvoiceItem>>,
}

impl Store {
  fn number_taken(&self, number: &InvoiceNumber, except: Option<Uuid>) -> bool {
    self
      .invoices
      .values()
      .any(|invoice| invoice.invoice_number == *number && Some(invoice.id) != except)
  }

  fn aggregate(&self, invoice: &Invoice) -> InvoiceAggregate {
    InvoiceAggregate {
      invoice: invoice.clone(),
      items: self.items.get(&invoice.id).cloned().unwrap_or_default(),
    }
  }
}

#[derive(Clone, Default)]
pub struct InMemoryInvoiceRepository {
  store: Arc<RwLock<Store>>,
}

impl InMemoryInvoiceRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn create(&self, aggregate: InvoiceAggregate) -> Result<InvoiceAggregate, InvoiceError> {
    let mut store = self.store.write().await;

    if store.number_taken(&aggregate.invoice.invoice_number, None) {
      return Err(InvoiceError::Conflict(
        aggregate.invoice.invoice_number.value().to_string(),
      ));
    }

    let mut items = aggregate.items.clone();
    items.sort_by_key(|item| item.line_order);
    store.items.insert(aggregate.id(), items);
    store
      .invoices
      .insert(aggregate.id(), aggregate.invoice.clone());

    Ok(aggregate)
  }

  async fn replace(
    &self,
    aggregate: InvoiceAggregate,
  ) -> Result<Option<InvoiceAggregate>, InvoiceError> {
    let mut store = self.store.write().await;
    let id = aggregate.id();

    let Some(existing) = store.invoices.get(&id) else {
      tracing::warn!("Invoice {} not found for update", id);
      return Ok(None);
    };
    let created_at = existing.created_at;

    if store.number_taken(&aggregate.invoice.invoice_number, Some(id)) {
      return Err(InvoiceError::Conflict(
        aggregate.invoice.invoice_number.value().to_string(),
      ));
    }

    let InvoiceAggregate { mut invoice, mut items } = aggregate;
    invoice.created_at = created_at;
    items.sort_by_key(|item| item.line_order);

    store.items.insert(id, items);
    store.invoices.insert(id, invoice);

    Ok(store.invoices.get(&id).map(|invoice| store.aggregate(invoice)))
  }

  async fn delete(&self, id: Uuid) -> Result<bool, InvoiceError> {
    let mut store = self.store.write().await;

    store.items.remove(&id);
    Ok(store.invoices.remove(&id).is_some())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceAggregate>, InvoiceError> {
    let store = self.store.read().await;
    Ok(store.invoices.get(&id).map(|invoice| store.aggregate(invoice)))
  }

  async fn find_items_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceItem>, InvoiceError> {
    let store = self.store.read().await;
    Ok(store.items.get(&invoice_id).cloned().unwrap_or_default())
  }

  async fn find_last_invoice_number(&self) -> Result<Option<InvoiceNumber>, InvoiceError> {
    let store = self.store.read().await;
    Ok(
      store
        .invoices
        .values()
        .map(|invoice| &invoice.invoice_number)
        .max()
        .cloned(),
    )
  }

  async fn search(&self, query: &InvoiceQuery) -> Result<InvoicePage, InvoiceError> {
    let store = self.store.read().await;
    let needle = query.search.as_ref().map(|s| s.to_lowercase());

    let mut matches: Vec<&Invoice> = store
      .invoices
      .values()
      .filter(|invoice| match &needle {
        Some(needle) => invoice
          .invoice_number
          .value()
          .to_lowercase()
          .contains(needle.as_str()),
        None => true,
      })
      .collect();

    match query.order {
      ListOrder::InvoiceNumberDesc => {
        matches.sort_by(|a, b| b.invoice_number.cmp(&a.invoice_number))
      }
      ListOrder::CreatedAtDesc => matches.sort_by_key(|invoice| {
        (
          Reverse(invoice.created_at),
          Reverse(invoice.invoice_number.clone()),
        )
      }),
    }

    let total_count = matches.len() as i64;
    let items = matches
      .into_iter()
      .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
      .take(usize::try_from(query.limit).unwrap_or(0))
      .map(|invoice| store.aggregate(invoice))
      .collect();

    Ok(InvoicePage { items, total_count })
  }
}
