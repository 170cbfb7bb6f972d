use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use shared::protocol::{OtpRequestForm, OtpSent, VerifyOtpForm, VerifyStatus};
use tracing::debug;
use url::Url;

pub mod config;
pub mod error;
pub mod events;
pub mod otp;
pub mod registration;
pub mod view;

pub use config::{load_settings, ClientSettings, Endpoints};
pub use error::{SettingsError, TransportError};
pub use events::{FlowContext, FlowError, FlowErrorCategory};
pub use otp::{Countdown, OtpController, OtpEntry, ResendOutcome, TimerPhase, VerifyOutcome};
pub use registration::{RegisterOutcome, RegistrationController};
pub use view::{CellView, OtpView, RegistrationView, Surface};

/// The two remote operations of the admin service.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn send_otp(&self, form: &OtpRequestForm) -> Result<OtpSent, TransportError>;
    async fn verify_otp(&self, form: &VerifyOtpForm) -> Result<VerifyStatus, TransportError>;
}

pub struct HttpAdminApi {
    http: Client,
    endpoints: Endpoints,
}

impl HttpAdminApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, SettingsError> {
        let endpoints = settings.endpoints()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(SettingsError::HttpClient)?;
        Ok(Self { http, endpoints })
    }

    // The status code is not inspected; the JSON body alone decides the outcome.
    async fn post_form<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        form: &T,
    ) -> Result<Value, TransportError> {
        let response = self.http.post(url.clone()).form(form).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        debug!(%url, %status, "admin service replied");
        if body.is_null() {
            return Err(TransportError::Decode("null response body".to_string()));
        }
        Ok(body)
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn send_otp(&self, form: &OtpRequestForm) -> Result<OtpSent, TransportError> {
        let body = self.post_form(&self.endpoints.send_otp, form).await?;
        Ok(OtpSent::from_body(&body))
    }

    async fn verify_otp(&self, form: &VerifyOtpForm) -> Result<VerifyStatus, TransportError> {
        let body = self.post_form(&self.endpoints.verify_otp, form).await?;
        Ok(VerifyStatus::from_body(&body))
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
