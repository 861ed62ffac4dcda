use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::application::invoice::{
  CreateInvoiceUseCase, DeleteInvoiceUseCase, GetInvoiceUseCase, GetLastInvoiceNumberUseCase,
  GetNextInvoiceNumberUseCase, ListInvoicesUseCase, UpdateInvoiceUseCase,
};
use crate::domain::invoice::InvoiceService;

use super::errors::{json_error_handler, path_error_handler, query_error_handler};
use super::handlers::invoices::{
  create_invoice_handler, delete_invoice_handler, get_invoice_handler, last_invoice_number_handler,
  list_invoices_handler, next_invoice_number_handler, update_invoice_handler,
};

/// Use cases behind the invoice endpoints
#[derive(Clone)]
pub struct InvoiceRouteDependencies {
  pub create_invoice: Arc<CreateInvoiceUseCase>,
  pub update_invoice: Arc<UpdateInvoiceUseCase>,
  pub delete_invoice: Arc<DeleteInvoiceUseCase>,
  pub list_invoices: Arc<ListInvoicesUseCase>,
  pub get_invoice: Arc<GetInvoiceUseCase>,
  pub last_invoice_number: Arc<GetLastInvoiceNumberUseCase>,
  pub next_invoice_number: Arc<GetNextInvoiceNumberUseCase>,
}

impl InvoiceRouteDependencies {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self {
      create_invoice: Arc::new(CreateInvoiceUseCase::new(invoice_service.clone())),
      update_invoice: Arc::new(UpdateInvoiceUseCase::new(invoice_service.clone())),
      delete_invoice: Arc::new(DeleteInvoiceUseCase::new(invoice_service.clone())),
      list_invoices: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
      get_invoice: Arc::new(GetInvoiceUseCase::new(invoice_service.clone())),
      last_invoice_number: Arc::new(GetLastInvoiceNumberUseCase::new(invoice_service.clone())),
      next_invoice_number: Arc::new(GetNextInvoiceNumberUseCase::new(invoice_service)),
    }
  }
}

/// Configure invoice routes
///
/// Mounts all invoice endpoints under the provided scope (normally
/// `/invoices`). Body, query and path extraction failures answer with the
/// same JSON error shape as domain errors.
///
/// # Routes
///
/// - POST / - Create an invoice
/// - PUT / - Replace an invoice (id in the body)
/// - DELETE /?invoiceId= - Delete an invoice and its items
/// - GET /?search=&page=&limit=&sort= - Paginated listing
/// - GET /last-number - Greatest invoice number issued
/// - GET /next-number - Suggested number for the next invoice
/// - GET /{invoice_id} - One invoice with its items
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use invoicer::adapters::http::routes::{InvoiceRouteDependencies, configure_invoice_routes};
/// # use invoicer::domain::invoice::InvoiceService;
///
/// # fn example(service: Arc<InvoiceService>) {
/// let deps = InvoiceRouteDependencies::new(service);
/// let app = App::new().service(
///   web::scope("/invoices").configure(|cfg| configure_invoice_routes(cfg, deps)),
/// );
/// # }
/// ```
pub fn configure_invoice_routes(cfg: &mut web::ServiceConfig, deps: InvoiceRouteDependencies) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .app_data(web::Data::new(deps.create_invoice))
    .app_data(web::Data::new(deps.update_invoice))
    .app_data(web::Data::new(deps.delete_invoice))
    .app_data(web::Data::new(deps.list_invoices))
    .app_data(web::Data::new(deps.get_invoice))
    .app_data(web::Data::new(deps.last_invoice_number))
    .app_data(web::Data::new(deps.next_invoice_number))
    .route("", web::post().to(create_invoice_handler))
    .route("", web::put().to(update_invoice_handler))
    .route("", web::delete().to(delete_invoice_handler))
    .route("", web::get().to(list_invoices_handler))
    // Fixed paths before the id catch-all
    .route("/last-number", web::get().to(last_invoice_number_handler))
    .route("/next-number", web::get().to(next_invoice_number_handler))
    .route("/{invoice_id}", web::get().to(get_invoice_handler));
}

/// Configure the liveness probe
///
/// - GET /health - Returns `OK`
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
  cfg.route(
    "/health",
    web::get().to(|| async { HttpResponse::Ok().body("OK") }),
  );
}
