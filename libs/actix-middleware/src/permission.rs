//! Bit-vector permission guard
//!
//! Must run after [`JwtAuth`](crate::JwtAuth) for the same claims type, e.g.
//! on a scope inside an app wrapped with `JwtAuth`.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use authorizer::{PermissionBearer, PermissionWord};
use crypto_core::Claims;
use error_types::ServiceError;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::{reject, SYSTEM};

/// Rejects requests whose claims do not overlap `required` (see
/// [`authorizer::valid`]) with 403, and unauthenticated requests with 401
pub struct PermissionGuard<T, W> {
    required: Rc<[W]>,
    _claims: PhantomData<fn() -> T>,
}

impl<T, W> Clone for PermissionGuard<T, W> {
    fn clone(&self) -> Self {
        Self {
            required: Rc::clone(&self.required),
            _claims: PhantomData,
        }
    }
}

impl<T, W: PermissionWord> PermissionGuard<T, W> {
    pub fn new(required: impl Into<Vec<W>>) -> Self {
        let words: Vec<W> = required.into();
        Self {
            required: Rc::from(words),
            _claims: PhantomData,
        }
    }

    /// Require a single permission index
    pub fn index(index: usize) -> Self {
        Self::new(authorizer::generate::<W>(index))
    }

    /// Require at least one of `indices`
    pub fn any_of(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::new(authorizer::sum(
            indices.into_iter().map(authorizer::generate::<W>),
        ))
    }

    pub fn required(&self) -> &[W] {
        &self.required
    }
}

impl<S, B, T, W> Transform<S, ServiceRequest> for PermissionGuard<T, W>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    T: PermissionBearer<W> + 'static,
    W: PermissionWord + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = PermissionGuardService<S, T, W>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PermissionGuardService {
            service: Rc::new(service),
            required: Rc::clone(&self.required),
            _claims: PhantomData,
        }))
    }
}

pub struct PermissionGuardService<S, T, W> {
    service: Rc<S>,
    required: Rc<[W]>,
    _claims: PhantomData<fn() -> T>,
}

impl<S, T, W> PermissionGuardService<S, T, W>
where
    T: PermissionBearer<W> + 'static,
    W: PermissionWord + 'static,
{
    fn check(&self, req: &ServiceRequest) -> Result<(), ServiceError> {
        let extensions = req.extensions();
        let claims = extensions
            .get::<Claims<T>>()
            .ok_or_else(|| ServiceError::unauthenticated(SYSTEM, "User not authenticated"))?;

        if claims.custom.has_permission(&self.required) {
            Ok(())
        } else {
            tracing::debug!(subject = %claims.sub, "Permission check failed");
            Err(ServiceError::permission_denied(
                SYSTEM,
                "Insufficient permissions",
            ))
        }
    }
}

impl<S, B, T, W> Service<ServiceRequest> for PermissionGuardService<S, T, W>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    T: PermissionBearer<W> + 'static,
    W: PermissionWord + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(error) = self.check(&req) {
            let response = reject(req, error).map_into_right_body();
            return Box::pin(async move { Ok(response) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) })
    }
}
