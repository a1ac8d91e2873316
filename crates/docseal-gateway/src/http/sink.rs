//! HTTP reporting sink.

use std::time::Duration;

use async_trait::async_trait;

use super::{build_client, check_status};
use crate::error::Result;
use crate::report::{Report, ReportSink};

/// POSTs each report as JSON. Attestation and verification reports go to
/// separate endpoints.
pub struct HttpReportSink {
    client: reqwest::Client,
    attestation_url: String,
    verification_url: String,
    authorization: Option<String>,
}

impl HttpReportSink {
    pub fn new(
        attestation_url: impl Into<String>,
        verification_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            attestation_url: attestation_url.into(),
            verification_url: verification_url.into(),
            authorization: None,
        })
    }

    /// Sent verbatim as the `Authorization` header, e.g. `token key:secret`.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

#[async_trait]
impl ReportSink for HttpReportSink {
    async fn send(&self, report: &Report) -> Result<()> {
        let request = match report {
            Report::Attestation(r) => self.client.post(&self.attestation_url).json(r),
            Report::Verification(r) => self.client.post(&self.verification_url).json(r),
        };
        let request = match &self.authorization {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        };

        check_status(request.send().await?).await?;
        Ok(())
    }
}
