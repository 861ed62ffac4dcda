use actix_web::{
  Error, HttpMessage,
  body::MessageBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
  http::header::{HeaderName, HeaderValue},
};
use futures_util::future::LocalBoxFuture;
use std::{
  fmt,
  future::{Ready, ready},
  rc::Rc,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of one request, kept in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
  pub fn generate() -> Self {
    Self(Uuid::new_v4())
  }

  /// Accepts a caller-supplied id only when it is a UUID
  pub fn from_header(value: &HeaderValue) -> Option<Self> {
    let raw = value.to_str().ok()?;
    Uuid::parse_str(raw.trim()).ok().map(Self)
  }

  pub fn uuid(&self) -> Uuid {
    self.0
  }
}

impl fmt::Display for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Tags every request with a [`RequestId`] and echoes it back in the
/// `X-Request-ID` response header. A valid incoming id is reused so callers
/// can correlate their logs with ours.
///
/// ```no_run
/// use actix_web::App;
/// # use invoicer::adapters::http::middleware::RequestIdMiddleware;
///
/// let app = App::new().wrap(RequestIdMiddleware::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
  pub fn new() -> Self {
    Self
  }
}

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: MessageBody + 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Transform = RequestIdMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(RequestIdMiddlewareService {
      service: Rc::new(service),
    }))
  }
}

pub struct RequestIdMiddlewareService<S> {
  service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: MessageBody + 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);

    Box::pin(async move {
      let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(RequestId::from_header)
        .unwrap_or_else(RequestId::generate);

      req.extensions_mut().insert(request_id);
      tracing::debug!("{} {} [request_id={}]", req.method(), req.path(), request_id);

      let mut res = service.call(req).await?;

      if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        res
          .headers_mut()
          .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
      }

      Ok(res)
    })
  }
}

/// Reads the [`RequestId`] stored by [`RequestIdMiddleware`]
pub trait RequestIdExt {
  /// `None` when the middleware is not mounted
  fn request_id(&self) -> Option<RequestId>;
}

impl RequestIdExt for actix_web::HttpRequest {
  fn request_id(&self) -> Option<RequestId> {
    self.extensions().get::<RequestId>().copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{
    App, HttpRequest, HttpResponse,
    test::{self, TestRequest},
    web,
  };

  async fn echo_extension(req: HttpRequest) -> HttpResponse {
    match req.request_id() {
      Some(id) => HttpResponse::Ok().body(id.to_string()),
      None => HttpResponse::InternalServerError().finish(),
    }
  }

  fn header_of<B>(resp: &ServiceResponse<B>) -> String {
    resp
      .headers()
      .get(REQUEST_ID_HEADER)
      .expect("response should carry a request id")
      .to_str()
      .unwrap()
      .to_string()
  }

  #[actix_web::test]
  async fn test_generated_id_matches_extension() {
    let app = test::init_service(
      App::new()
        .wrap(RequestIdMiddleware::new())
        .route("/", web::get().to(echo_extension)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());
    let header = header_of(&resp);
    assert!(Uuid::parse_str(&header).is_ok());
    assert_eq!(test::read_body(resp).await, header.as_bytes());
  }

  #[actix_web::test]
  async fn test_caller_id_is_reused_when_valid() {
    let app = test::init_service(
      App::new()
        .wrap(RequestIdMiddleware::new())
        .route("/", web::get().to(echo_extension)),
    )
    .await;

    let incoming = Uuid::new_v4().to_string();
    let req = TestRequest::get()
      .uri("/")
      .insert_header(("X-Request-ID", incoming.as_str()))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(header_of(&resp), incoming);

    let req = TestRequest::get()
      .uri("/")
      .insert_header(("X-Request-ID", "not-a-uuid"))
      .to_request();
    let resp = test::call_service(&app, req).await;
    let replaced = header_of(&resp);
    assert_ne!(replaced, "not-a-uuid");
    assert!(Uuid::parse_str(&replaced).is_ok());
  }

  #[test]
  fn test_generated_ids_differ() {
    assert_ne!(RequestId::generate(), RequestId::generate());
  }

  #[test]
  fn test_from_header_trims() {
    let id = Uuid::new_v4();
    let value = HeaderValue::from_str(&format!(" {} ", id)).unwrap();
    assert_eq!(RequestId::from_header(&value).map(|r| r.uuid()), Some(id));
  }
}
