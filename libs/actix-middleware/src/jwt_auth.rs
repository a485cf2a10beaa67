//! Bearer-token authentication

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::{Claims, TokenVerifier};
use error_types::{ServiceError, ServiceResult};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use crate::{reject, SYSTEM};

/// JWT authentication middleware
///
/// Verifies `Authorization: Bearer <token>` with the injected verifier and
/// stores the resulting [`Claims<T>`] in request extensions. Requests without
/// a valid token are answered with a 401 JSON error; expired tokens carry the
/// `TOKEN_EXPIRED` code.
pub struct JwtAuth<T> {
    verifier: Arc<dyn TokenVerifier<T>>,
}

impl<T> Clone for JwtAuth<T> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
        }
    }
}

impl<T> JwtAuth<T> {
    pub fn new(verifier: Arc<dyn TokenVerifier<T>>) -> Self {
        Self { verifier }
    }
}

/// Verify the bearer token in `headers`
fn authenticate<T>(verifier: &dyn TokenVerifier<T>, headers: &HeaderMap) -> ServiceResult<Claims<T>> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ServiceError::unauthenticated(SYSTEM, "Missing Authorization header"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ServiceError::unauthenticated(SYSTEM, "Invalid Authorization header format")
        })?;

    Ok(verifier.verify(token)?)
}

impl<S, B, T> Transform<S, ServiceRequest> for JwtAuth<T>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    T: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthService<S, T>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
        }))
    }
}

pub struct JwtAuthService<S, T> {
    service: Rc<S>,
    verifier: Arc<dyn TokenVerifier<T>>,
}

impl<S, B, T> Service<ServiceRequest> for JwtAuthService<S, T>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    T: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = match authenticate(self.verifier.as_ref(), req.headers()) {
            Ok(claims) => claims,
            Err(error) => {
                tracing::debug!(path = %req.path(), "JWT authentication failed");
                let response = reject(req, error).map_into_right_body();
                return Box::pin(async move { Ok(response) });
            }
        };

        tracing::debug!(subject = %claims.sub, "JWT validated successfully");
        req.extensions_mut().insert(claims);

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Verified claims of the current request
///
/// Fails with 401 when the route is not behind [`JwtAuth`] for the same `T`.
#[derive(Debug, Clone)]
pub struct AuthClaims<T>(pub Claims<T>);

impl<T> AuthClaims<T> {
    pub fn into_inner(self) -> Claims<T> {
        self.0
    }
}

impl<T> Deref for AuthClaims<T> {
    type Target = Claims<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Clone + 'static> FromRequest for AuthClaims<T> {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims<T>>().cloned();
        ready(
            claims
                .map(AuthClaims)
                .ok_or_else(|| ServiceError::unauthenticated(SYSTEM, "User not authenticated").into()),
        )
    }
}
