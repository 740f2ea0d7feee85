//! HMAC middleware for the payment gateway webhook.
//!
//! The gateway signs every webhook call with the shared `JP_WEBHOOK_SECRET`. The signature is the base64-encoded
//! HMAC-SHA256 of the raw request body, and arrives in the header named by `JP_WEBHOOK_HMAC_HEADER` (`X-Signature` by
//! default).
//!
//! Calls without a signature, or with one that does not match, are refused with 403 Forbidden before the body is
//! parsed. The body is buffered for the check and handed back to the request untouched.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use jardim_common::Secret;
use log::{trace, warn};

use crate::{errors::ServerError, helpers::verify_hmac};

/// Where to find the webhook signature, and the key it must verify against
#[derive(Clone)]
struct SignatureCheck {
    header: String,
    key: Secret<String>,
    enabled: bool,
}

impl SignatureCheck {
    /// Verifies the request signature and restores the body for the wrapped service.
    async fn verify(&self, req: &mut ServiceRequest) -> Result<(), ServerError> {
        if !self.enabled {
            trace!("🔐️ Webhook signature checks are disabled. Allowing request.");
            return Ok(());
        }
        let body = req.extract::<web::Bytes>().await.map_err(|e| {
            warn!("🔐️ Failed to extract webhook body: {e:?}");
            ServerError::InvalidRequestBody("Failed to extract request data.".into())
        })?;
        let Some(signature) = req.headers().get(&self.header) else {
            warn!("🔐️ Webhook call has no {} header. Denying access.", self.header);
            return Err(ServerError::InsufficientPermissions("No webhook signature found.".into()));
        };
        if !verify_hmac(self.key.reveal(), &body, signature.as_bytes()) {
            warn!("🔐️ Invalid webhook signature. Denying access.");
            return Err(ServerError::InsufficientPermissions("Invalid webhook signature.".into()));
        }
        trace!("🔐️ Webhook signature check ✅️");
        let (_, mut payload) = h1::Payload::create(true);
        payload.unread_data(body);
        req.set_payload(Payload::from(payload));
        Ok(())
    }
}

pub struct HmacMiddlewareFactory {
    check: SignatureCheck,
}

impl HmacMiddlewareFactory {
    /// With `enabled` set to false every call is let through unchecked.
    pub fn new(hmac_header: &str, key: Secret<String>, enabled: bool) -> Self {
        Self { check: SignatureCheck { header: hmac_header.into(), key, enabled } }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService { check: Rc::new(self.check.clone()), service: Rc::new(service) }))
    }
}

pub struct HmacMiddlewareService<S> {
    check: Rc<SignatureCheck>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let check = Rc::clone(&self.check);
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            check.verify(&mut req).await?;
            service.call(req).await
        })
    }
}
