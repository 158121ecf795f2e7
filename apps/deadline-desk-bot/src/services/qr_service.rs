use crate::config::PaymentConfig;
use anyhow::{Context, Result};
use deadline_desk_core::PaymentRequest;
use reqwest::Client;
use std::time::Duration;

/// Renders UPI payment links as QR images through an HTTP QR endpoint.
#[derive(Clone)]
pub struct QrService {
    client: Client,
    config: PaymentConfig,
}

impl QrService {
    pub fn new(config: PaymentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build QR HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn payment_link(&self, request: &PaymentRequest) -> String {
        format!(
            "upi://pay?pa={}&pn={}&am={}&cu={}&tn={}",
            urlencoding::encode(&self.config.payee_id),
            urlencoding::encode(&self.config.payee_name),
            request.amount.as_amount_param(),
            urlencoding::encode(&self.config.currency),
            urlencoding::encode(&format!("Order {}", request.reference)),
        )
    }

    pub fn render_url(&self, link: &str) -> String {
        format!(
            "{}?size=400x400&data={}",
            self.config.qr_endpoint.trim_end_matches('?'),
            urlencoding::encode(link)
        )
    }

    pub async fn render(&self, request: &PaymentRequest) -> Result<Vec<u8>> {
        let url = self.render_url(&self.payment_link(request));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("QR endpoint unreachable")?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("QR render failed: {}", resp.status()));
        }

        let is_image = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(anyhow::anyhow!("QR endpoint did not return an image"));
        }

        let bytes = resp.bytes().await.context("Failed to read QR image")?;
        tracing::debug!(client = %request.client, size = bytes.len(), "Rendered payment QR");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadline_desk_core::{ClientId, Price};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn service_at(qr_endpoint: &str) -> QrService {
        QrService::new(PaymentConfig {
            payee_id: "desk@okbank".into(),
            payee_name: "Deadline Desk".into(),
            currency: "INR".into(),
            qr_endpoint: qr_endpoint.into(),
        })
        .unwrap()
    }

    fn service() -> QrService {
        service_at("https://qr.example/create")
    }

    /// Serves one canned HTTP response on a local port and returns its URL.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static [u8],
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/create", addr)
    }

    fn request() -> PaymentRequest {
        PaymentRequest {
            client: ClientId(12345),
            reference: "ab12cd34".into(),
            amount: Price::parse("499").unwrap(),
            origin: None,
        }
    }

    #[test]
    fn payment_link_encodes_payee_and_amount() {
        assert_eq!(
            service().payment_link(&request()),
            "upi://pay?pa=desk%40okbank&pn=Deadline%20Desk&am=499.00&cu=INR&tn=Order%20ab12cd34"
        );
    }

    #[test]
    fn render_url_wraps_link_as_data_param() {
        let service = service();
        let url = service.render_url("upi://pay?pa=a&am=1.00");
        assert_eq!(
            url,
            "https://qr.example/create?size=400x400&data=upi%3A%2F%2Fpay%3Fpa%3Da%26am%3D1.00"
        );
    }

    #[tokio::test]
    async fn render_returns_image_bytes() {
        let url = serve_once("200 OK", "image/png", b"\x89PNG").await;
        let image = service_at(&url).render(&request()).await.unwrap();
        assert_eq!(image, b"\x89PNG".to_vec());
    }

    #[tokio::test]
    async fn render_rejects_error_status() {
        let url = serve_once("500 Internal Server Error", "image/png", b"").await;
        let err = service_at(&url).render(&request()).await.unwrap_err();
        assert!(err.to_string().contains("500"), "{err}");
    }

    #[tokio::test]
    async fn render_rejects_non_image_body() {
        let url = serve_once("200 OK", "text/html", b"<html>busy</html>").await;
        let err = service_at(&url).render(&request()).await.unwrap_err();
        assert!(err.to_string().contains("did not return an image"), "{err}");
    }
}
