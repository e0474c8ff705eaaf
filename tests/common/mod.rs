//! Shared helpers for integration tests.

use request_digest::{FingerprintGenerator, GeneratorConfig, RequestBody, RequestView};

/// Generator with the built-in permanent list and the given extra exclusions.
#[allow(dead_code)]
pub fn generator_excluding(headers: &[&str]) -> FingerprintGenerator {
    FingerprintGenerator::new(&GeneratorConfig::excluding(headers.iter().copied()))
        .with_metrics(false)
}

/// A view with destination, headers (in the given order) and an XML body.
#[allow(dead_code)]
pub fn xml_view(address: Option<&str>, headers: &[(&str, &str)], body: &str) -> RequestView {
    let mut view = RequestView::new().with_body(RequestBody::xml(body));
    view.destination_address = address.map(str::to_string);
    for (name, value) in headers {
        view = view.with_header(*name, *value);
    }
    view
}

/// Order request used throughout the property tests.
#[allow(dead_code)]
pub fn order_request(trace: &str, body: &str) -> RequestView {
    xml_view(
        Some("http://svc/order"),
        &[("Content-Type", "text/xml"), ("X-Trace", trace)],
        body,
    )
}
