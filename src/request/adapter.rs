//! Conversion from buffered HTTP requests.
//!
//! # Responsibilities
//! - Derive the destination address (absolute URI, else Host + path)
//! - Copy headers in wire order, keeping duplicates
//! - Attach the body with its `Content-Type` as a raw payload
//!
//! # Design Decisions
//! - Empty body = bodyless request; headers are then not inspected at all
//! - Header values that are not visible ASCII are rejected, not lossily decoded

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap};

use crate::digest::error::DigestError;
use crate::request::{RequestBody, RequestView};

impl RequestView {
    /// Build a view from request parts and the fully buffered body.
    pub fn from_http(parts: &Parts, body: Bytes) -> Result<Self, DigestError> {
        let destination_address = destination_address(parts);

        if body.is_empty() {
            return Ok(Self {
                destination_address,
                headers: Vec::new(),
                body: None,
            });
        }

        let headers = header_pairs(&parts.headers)?;
        let media_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        Ok(Self {
            destination_address,
            headers,
            body: Some(RequestBody::raw(media_type, body)),
        })
    }
}

fn destination_address(parts: &Parts) -> Option<String> {
    if parts.uri.scheme().is_some() && parts.uri.authority().is_some() {
        return Some(parts.uri.to_string());
    }

    let host = parts.headers.get(header::HOST)?.to_str().ok()?;
    let path = parts
        .uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    Some(format!("http://{}{}", host, path))
}

fn header_pairs(headers: &HeaderMap) -> Result<Vec<(String, String)>, DigestError> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().map_err(|_| {
                DigestError::MalformedHeaders(format!("value of '{}' is not valid text", name))
            })?;
            Ok((name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts(req: Request<()>) -> Parts {
        req.into_parts().0
    }

    #[test]
    fn test_absolute_uri_is_destination() {
        let p = parts(
            Request::builder()
                .uri("http://svc/order?id=1")
                .header("Host", "ignored")
                .body(())
                .unwrap(),
        );
        let view = RequestView::from_http(&p, Bytes::from_static(b"<a/>")).unwrap();
        assert_eq!(view.destination_address.as_deref(), Some("http://svc/order?id=1"));
    }

    #[test]
    fn test_host_and_path_is_destination() {
        let p = parts(
            Request::builder()
                .uri("/order")
                .header("Host", "svc")
                .body(())
                .unwrap(),
        );
        let view = RequestView::from_http(&p, Bytes::new()).unwrap();
        assert_eq!(view.destination_address.as_deref(), Some("http://svc/order"));

        let p = parts(Request::builder().uri("/order").body(()).unwrap());
        assert_eq!(RequestView::from_http(&p, Bytes::new()).unwrap().destination_address, None);
    }

    #[test]
    fn test_headers_and_media_type_are_carried() {
        let p = parts(
            Request::builder()
                .uri("http://svc/order")
                .header("Content-Type", "application/json")
                .header("X-Tag", "a")
                .header("X-Tag", "b")
                .body(())
                .unwrap(),
        );
        let view = RequestView::from_http(&p, Bytes::from_static(b"{}")).unwrap();

        assert_eq!(view.headers.len(), 3);
        assert!(matches!(
            view.body,
            Some(RequestBody::Raw { media_type: Some(ref m), .. }) if m == "application/json"
        ));
    }

    #[test]
    fn test_non_text_header_is_malformed() {
        let mut p = parts(Request::builder().uri("http://svc/order").body(()).unwrap());
        p.headers
            .insert("x-bin", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let err = RequestView::from_http(&p, Bytes::from_static(b"<a/>")).unwrap_err();
        assert!(matches!(err, DigestError::MalformedHeaders(_)));

        // bodyless requests never look at headers
        let view = RequestView::from_http(&p, Bytes::new()).unwrap();
        assert!(view.body.is_none());
    }
}
