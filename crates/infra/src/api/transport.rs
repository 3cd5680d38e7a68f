//! `RequestTransport` over reqwest
//!
//! Credentialed requests go through the client that owns the session cookie
//! jar; everything else uses a client without one, so the BFF cookie never
//! leaks onto requests the session controller did not mark.

use async_trait::async_trait;
use passage_core::RequestTransport;
use passage_domain::{HttpMethod, OutgoingRequest, Result, TransportResponse};
use reqwest::Method;
use tracing::instrument;

use crate::errors::InfraError;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    credentialed: HttpClient,
    anonymous: HttpClient,
}

impl ReqwestTransport {
    /// `credentialed` should be the cookie-store client shared with the
    /// auth API.
    pub fn new(credentialed: HttpClient, anonymous: HttpClient) -> Self {
        Self { credentialed, anonymous }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl RequestTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse> {
        let client = if request.with_credentials { &self.credentialed } else { &self.anonymous };

        let mut builder = client.request(method(request.method), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = client.send(builder).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(InfraError::from)?.to_vec();

        Ok(TransportResponse { status, body })
    }
}
