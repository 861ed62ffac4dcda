use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::adapters::http::{
  dtos::{DeleteInvoiceQuery, ListInvoicesQuery, MutationResponse, UpdateInvoiceRequest},
  errors::ApiError,
  middleware::RequestIdExt,
};
use crate::application::invoice::{
  CreateInvoiceCommand, CreateInvoiceUseCase, DeleteInvoiceCommand, DeleteInvoiceUseCase,
  GetInvoiceCommand, GetInvoiceUseCase, GetLastInvoiceNumberUseCase, GetNextInvoiceNumberUseCase,
  ListInvoicesCommand, ListInvoicesUseCase, UpdateInvoiceCommand, UpdateInvoiceUseCase,
};
use crate::domain::invoice::InvoicePayload;

fn request_tag(req: &HttpRequest) -> String {
  req
    .request_id()
    .map(|id| id.to_string())
    .unwrap_or_else(|| "-".to_string())
}

/// Handler for invoice creation
///
/// POST /invoices
/// Body: invoice payload (JSON)
/// Response: MutationResponse (JSON) with status 201
pub async fn create_invoice_handler(
  request: web::Json<InvoicePayload>,
  use_case: web::Data<Arc<CreateInvoiceUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let command = CreateInvoiceCommand {
    payload: request.into_inner(),
  };

  let response = use_case.execute(command).await?;
  tracing::debug!(
    "[request_id={}] created invoice {}",
    request_tag(&http_req),
    response.invoice_id
  );

  Ok(HttpResponse::Created().json(MutationResponse::new(
    Some(response.invoice_id),
    format!("Invoice {} created successfully", response.invoice_number),
  )))
}

/// Handler for invoice replacement
///
/// PUT /invoices
/// Body: UpdateInvoiceRequest (JSON), the payload plus `invoiceId`
/// Response: MutationResponse (JSON) with status 200
pub async fn update_invoice_handler(
  request: web::Json<UpdateInvoiceRequest>,
  use_case: web::Data<Arc<UpdateInvoiceUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let (invoice_id, payload) = request.into_inner().into_parts();
  let command = UpdateInvoiceCommand {
    invoice_id,
    payload,
  };

  let response = use_case.execute(command).await?;
  tracing::debug!(
    "[request_id={}] updated invoice {}",
    request_tag(&http_req),
    response.invoice_id
  );

  Ok(HttpResponse::Ok().json(MutationResponse::new(
    Some(response.invoice_id),
    format!("Invoice {} updated successfully", response.invoice_number),
  )))
}

/// Handler for invoice deletion
///
/// DELETE /invoices?invoiceId=...
/// Response: MutationResponse (JSON) with status 200
pub async fn delete_invoice_handler(
  query: web::Query<DeleteInvoiceQuery>,
  use_case: web::Data<Arc<DeleteInvoiceUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let command = DeleteInvoiceCommand {
    invoice_id: query.into_inner().invoice_id,
  };
  let invoice_id = command.invoice_id.clone().unwrap_or_default();

  use_case.execute(command).await?;
  tracing::debug!(
    "[request_id={}] deleted invoice {}",
    request_tag(&http_req),
    invoice_id
  );

  Ok(HttpResponse::Ok().json(MutationResponse::new(
    None,
    "Invoice deleted successfully",
  )))
}

/// Handler for the paginated invoice listing
///
/// GET /invoices?search=&page=&limit=&sort=
/// Response: ListInvoicesResponse (JSON) with status 200
pub async fn list_invoices_handler(
  query: web::Query<ListInvoicesQuery>,
  use_case: web::Data<Arc<ListInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  query.validate()?;
  let query = query.into_inner();

  let command = ListInvoicesCommand {
    search: query.search,
    page: query.page,
    page_size: query.limit,
    sort: query.sort,
  };

  let response = use_case.execute(command).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// Handler for a single invoice with its items
///
/// GET /invoices/{invoice_id}
pub async fn get_invoice_handler(
  path: web::Path<String>,
  use_case: web::Data<Arc<GetInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let command = GetInvoiceCommand {
    invoice_id: path.into_inner(),
  };

  let response = use_case.execute(command).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// GET /invoices/last-number
pub async fn last_invoice_number_handler(
  use_case: web::Data<Arc<GetLastInvoiceNumberUseCase>>,
) -> Result<HttpResponse, ApiError> {
  Ok(HttpResponse::Ok().json(use_case.execute().await?))
}

/// GET /invoices/next-number
pub async fn next_invoice_number_handler(
  use_case: web::Data<Arc<GetNextInvoiceNumberUseCase>>,
) -> Result<HttpResponse, ApiError> {
  Ok(HttpResponse::Ok().json(use_case.execute().await?))
}
