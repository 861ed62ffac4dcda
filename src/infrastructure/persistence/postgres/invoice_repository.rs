use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  ClientName, Invoice, InvoiceAggregate, InvoiceItem, InvoiceNumber, InvoiceStatus,
  LineItemDescription, ListOrder, Money, Quantity, errors::InvoiceError,
  ports::{InvoicePage, InvoiceQuery, InvoiceRepository},
};

const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_invoice_number_key";

const INVOICE_COLUMNS: &str = "id, invoice_number, client_name, client_address, invoice_date, \
   issue_date, due_date, total_amount, status, created_at, updated_at";

const ITEM_COLUMNS: &str =
  "id, invoice_id, description, quantity, unit_price, line_total, line_order";

// Same order as `InvoiceNumber`'s `Ord`: prefix before the last '/', then the
// sequence after it by length and bytes, so INV/100000 sorts above INV/99999
const NUMBER_ORDER: &str = r#"regexp_replace(invoice_number, '/[^/]*$', '') COLLATE "C" DESC,
   char_length(substring(invoice_number from '[^/]*$')) DESC,
   substring(invoice_number from '[^/]*$') COLLATE "C" DESC,
   invoice_number COLLATE "C" DESC"#;

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  invoice_number: String,
  client_name: String,
  client_address: String,
  invoice_date: NaiveDate,
  issue_date: NaiveDate,
  due_date: NaiveDate,
  total_amount: Decimal,
  status: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    Ok(Invoice {
      id: row.id,
      invoice_number: InvoiceNumber::new(row.invoice_number)?,
      client_name: ClientName::new(row.client_name)?,
      client_address: row.client_address,
      invoice_date: row.invoice_date,
      issue_date: row.issue_date,
      due_date: row.due_date,
      total_amount: Money::new(row.total_amount)?,
      status: InvoiceStatus::from_str(&row.status)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct ItemRow {
  id: Uuid,
  invoice_id: Uuid,
  description: String,
  quantity: i32,
  unit_price: Decimal,
  line_total: Decimal,
  line_order: i32,
}

impl TryFrom<ItemRow> for InvoiceItem {
  type Error = InvoiceError;

  fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
    Ok(InvoiceItem {
      id: row.id,
      invoice_id: row.invoice_id,
      description: LineItemDescription::new(row.description)?,
      quantity: Quantity::new(i64::from(row.quantity))?,
      unit_price: Money::new(row.unit_price)?,
      line_total: Money::new(row.line_total)?,
      line_order: row.line_order,
    })
  }
}

/// Maps a unique violation on the invoice number to `Conflict`.
fn map_write_error(e: sqlx::Error, invoice_number: &InvoiceNumber) -> InvoiceError {
  if let sqlx::Error::Database(db_err) = &e {
    // PostgreSQL unique violation code
    if db_err.code().as_deref() == Some("23505")
      && db_err.constraint() == Some(INVOICE_NUMBER_CONSTRAINT)
    {
      return InvoiceError::Conflict(invoice_number.value().to_string());
    }
  }
  tracing::error!("Failed to write invoice {}: {}", invoice_number, e);
  InvoiceError::Database(e)
}

/// Escapes LIKE metacharacters and wraps the term for a substring match.
fn like_pattern(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len() + 2);
  escaped.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn insert_items(
    conn: &mut PgConnection,
    items: &[InvoiceItem],
    invoice_number: &InvoiceNumber,
  ) -> Result<Vec<InvoiceItem>, InvoiceError> {
    let sql = format!(
      "INSERT INTO invoice_items ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
      cols = ITEM_COLUMNS
    );

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
      let row = sqlx::query_as::<_, ItemRow>(&sql)
        .bind(item.id)
        .bind(item.invoice_id)
        .bind(item.description.value())
        .bind(item.quantity.value())
        .bind(item.unit_price.amount())
        .bind(item.line_total.amount())
        .bind(item.line_order)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, invoice_number))?;
      inserted.push(row.try_into()?);
    }

    Ok(inserted)
  }

  async fn load_items(
    &self,
    invoice_ids: &[Uuid],
  ) -> Result<HashMap<Uuid, Vec<InvoiceItem>>, InvoiceError> {
    let mut grouped: HashMap<Uuid, Vec<InvoiceItem>> = HashMap::new();
    if invoice_ids.is_empty() {
      return Ok(grouped);
    }

    let rows = sqlx::query_as::<_, ItemRow>(&format!(
      "SELECT {} FROM invoice_items WHERE invoice_id = ANY($1) ORDER BY invoice_id, line_order",
      ITEM_COLUMNS
    ))
    .bind(invoice_ids)
    .fetch_all(&self.pool)
    .await?;

    for row in rows {
      let item: InvoiceItem = row.try_into()?;
      grouped.entry(item.invoice_id).or_default().push(item);
    }

    Ok(grouped)
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(&self, aggregate: InvoiceAggregate) -> Result<InvoiceAggregate, InvoiceError> {
    let InvoiceAggregate { invoice, items } = aggregate;
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            INSERT INTO invoices ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {cols}
            "#,
      cols = INVOICE_COLUMNS
    ))
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.client_name.value())
    .bind(&invoice.client_address)
    .bind(invoice.invoice_date)
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.total_amount.amount())
    .bind(invoice.status.as_str())
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_write_error(e, &invoice.invoice_number))?;

    let items = Self::insert_items(&mut *tx, &items, &invoice.invoice_number).await?;
    tx.commit().await?;

    Ok(InvoiceAggregate {
      invoice: row.try_into()?,
      items,
    })
  }

  async fn replace(
    &self,
    aggregate: InvoiceAggregate,
  ) -> Result<Option<InvoiceAggregate>, InvoiceError> {
    let InvoiceAggregate { invoice, items } = aggregate;
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET invoice_number = $2, client_name = $3, client_address = $4,
                invoice_date = $5, issue_date = $6, due_date = $7,
                total_amount = $8, status = $9, updated_at = $10
            WHERE id = $1
            RETURNING {}
            "#,
      INVOICE_COLUMNS
    ))
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.client_name.value())
    .bind(&invoice.client_address)
    .bind(invoice.invoice_date)
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.total_amount.amount())
    .bind(invoice.status.as_str())
    .bind(invoice.updated_at)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| map_write_error(e, &invoice.invoice_number))?;

    let Some(row) = row else {
      tracing::warn!("Invoice {} not found for update", invoice.id);
      tx.rollback().await?;
      return Ok(None);
    };

    sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
      .bind(invoice.id)
      .execute(&mut *tx)
      .await?;

    let items = Self::insert_items(&mut *tx, &items, &invoice.invoice_number).await?;
    tx.commit().await?;

    Ok(Some(InvoiceAggregate {
      invoice: row.try_into()?,
      items,
    }))
  }

  async fn delete(&self, id: Uuid) -> Result<bool, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
      .bind(id)
      .execute(&mut *tx)
      .await?;

    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
      .bind(id)
      .execute(&mut *tx)
      .await?;

    if result.rows_affected() == 0 {
      tx.rollback().await?;
      return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceAggregate>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {} FROM invoices WHERE id = $1",
      INVOICE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    let Some(row) = row else {
      return Ok(None);
    };

    let invoice: Invoice = row.try_into()?;
    let items = self.find_items_by_invoice_id(invoice.id).await?;
    Ok(Some(InvoiceAggregate { invoice, items }))
  }

  async fn find_items_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceItem>, InvoiceError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
      "SELECT {} FROM invoice_items WHERE invoice_id = $1 ORDER BY line_order",
      ITEM_COLUMNS
    ))
    .bind(invoice_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn find_last_invoice_number(&self) -> Result<Option<InvoiceNumber>, InvoiceError> {
    let number = sqlx::query_scalar::<_, String>(&format!(
      "SELECT invoice_number FROM invoices ORDER BY {} LIMIT 1",
      NUMBER_ORDER
    ))
    .fetch_optional(&self.pool)
    .await?;

    Ok(number.map(InvoiceNumber::new).transpose()?)
  }

  async fn search(&self, query: &InvoiceQuery) -> Result<InvoicePage, InvoiceError> {
    let pattern = query.search.as_deref().map(like_pattern);
    let filter = r#"($1::TEXT IS NULL OR invoice_number ILIKE $1 ESCAPE '\')"#;
    let order = match query.order {
      ListOrder::InvoiceNumberDesc => NUMBER_ORDER.to_string(),
      ListOrder::CreatedAtDesc => format!("created_at DESC, {}", NUMBER_ORDER),
    };

    let total_count = sqlx::query_scalar::<_, i64>(&format!(
      "SELECT COUNT(*) FROM invoices WHERE {}",
      filter
    ))
    .bind(pattern.as_deref())
    .fetch_one(&self.pool)
    .await?;

    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {} FROM invoices WHERE {} ORDER BY {} LIMIT $2 OFFSET $3",
      INVOICE_COLUMNS, filter, order
    ))
    .bind(pattern.as_deref())
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&self.pool)
    .await?;

    let invoices = rows
      .into_iter()
      .map(Invoice::try_from)
      .collect::<Result<Vec<_>, _>>()?;
    let ids: Vec<Uuid> = invoices.iter().map(|invoice| invoice.id).collect();
    let mut items = self.load_items(&ids).await?;

    Ok(InvoicePage {
      items: invoices
        .into_iter()
        .map(|invoice| InvoiceAggregate {
          items: items.remove(&invoice.id).unwrap_or_default(),
          invoice,
        })
        .collect(),
      total_count,
    })
  }
}
