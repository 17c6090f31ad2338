//! HTTP span helpers.

use uuid::Uuid;

/// Path segments that are followed by a gateway-issued identifier.
const GATEWAY_ID_PARENTS: [&str; 2] = ["orders", "qr"];

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replace identifiers with placeholders so routes stay low-cardinality.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut previous = "";

    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            let normalised = if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else if GATEWAY_ID_PARENTS.contains(&previous) && !segment.is_empty() {
                "{id}"
            } else {
                segment
            };

            previous = segment;

            normalised
        })
        .collect();

    format!("/{}", segments.join("/"))
}
