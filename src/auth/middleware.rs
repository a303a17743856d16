use actix_web::{
    body::EitherBody,
    cookie::Cookie,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap},
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{TokenManager, SESSION_COOKIE};
use crate::error::{AppError, INVALID_TOKEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Bearer,
    Session,
    LoginPage,
}

/// Guards a scope or resource with the session JWT.
///
/// - [`AuthMiddleware::bearer`] is for the JSON API: the token comes from
///   `Authorization: Bearer <token>` (or, failing that, the session cookie) and a missing or
///   invalid token is answered with a 401 envelope.
/// - [`AuthMiddleware::session`] is for pages: the token comes from the cookie and a failure
///   redirects to `/login`.
/// - [`AuthMiddleware::login_page`] sends visitors with a valid session straight to `/`.
///
/// On success the verified [`Claims`](crate::auth::Claims) are stored in the request
/// extensions for the [`AuthenticatedUser`](crate::auth::AuthenticatedUser) extractor.
#[derive(Debug, Clone, Copy)]
pub struct AuthMiddleware {
    mode: Mode,
}

impl AuthMiddleware {
    pub fn bearer() -> Self {
        Self { mode: Mode::Bearer }
    }

    pub fn session() -> Self {
        Self {
            mode: Mode::Session,
        }
    }

    pub fn login_page() -> Self {
        Self {
            mode: Mode::LoginPage,
        }
    }
}

/// The token of an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            mode: self.mode,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    mode: Mode,
}

type GuardFuture<B> = LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>;

impl<S, B> AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn forward(&self, req: ServiceRequest) -> GuardFuture<B> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }

    fn reject(req: ServiceRequest, error: AppError) -> GuardFuture<B> {
        Box::pin(ready(Ok(req.error_response(error).map_into_right_body())))
    }

    fn redirect(
        req: ServiceRequest,
        location: &'static str,
        cookie: Option<Cookie<'static>>,
    ) -> GuardFuture<B> {
        let mut response = HttpResponse::TemporaryRedirect();
        response.insert_header((header::LOCATION, location));
        if let Some(cookie) = cookie {
            response.cookie(cookie);
        }
        let response = response.finish().map_into_right_body();
        Box::pin(ready(Ok(req.into_response(response))))
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = GuardFuture<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let tokens = match req.app_data::<web::Data<TokenManager>>() {
            Some(tokens) => tokens.clone(),
            None => {
                let err = AppError::InternalServerError("TokenManager is not registered".into());
                return Self::reject(req, err);
            }
        };

        let cookie_token = req
            .cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        match self.mode {
            Mode::Bearer => {
                let token = bearer_token(req.headers())
                    .map(str::to_string)
                    .or(cookie_token);
                let Some(token) = token else {
                    return Self::reject(req, AppError::Unauthorized(INVALID_TOKEN.into()));
                };
                match tokens.verify(&token) {
                    Ok(claims) => {
                        req.extensions_mut().insert(claims);
                        self.forward(req)
                    }
                    Err(err) => Self::reject(req, err),
                }
            }
            Mode::Session => match cookie_token.map(|token| tokens.verify(&token)) {
                Some(Ok(claims)) => {
                    req.extensions_mut().insert(claims);
                    self.forward(req)
                }
                Some(Err(_)) => Self::redirect(req, "/login", Some(tokens.removal_cookie())),
                None => Self::redirect(req, "/login", None),
            },
            Mode::LoginPage => match cookie_token.map(|token| tokens.verify(&token)) {
                Some(Ok(_)) => Self::redirect(req, "/", None),
                _ => self.forward(req),
            },
        }
    }
}
