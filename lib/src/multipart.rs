use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use hyper::body::Bytes;

static BOUNDARY_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// A `multipart/form-data` request body (RFC 7578).
#[derive(Debug, Clone)]
pub struct Form {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for Form {
    /// Form with a boundary derived from the clock and a process counter.
    fn default() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = BOUNDARY_SEQ.fetch_add(1, Ordering::Relaxed);
        Self::with_boundary(format!("waveup-{:x}-{:x}", nanos, seq))
    }
}

impl Form {
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Form {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            filename: None,
            content_type: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        });
        self
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_body(self) -> Bytes {
        let mut buf = Vec::new();
        for part in &self.parts {
            buf.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            buf.extend_from_slice(b"Content-Disposition: form-data; name=\"");
            buf.extend_from_slice(escape(&part.name).as_bytes());
            buf.push(b'"');
            if let Some(filename) = &part.filename {
                buf.extend_from_slice(b"; filename=\"");
                buf.extend_from_slice(escape(filename).as_bytes());
                buf.push(b'"');
            }
            buf.extend_from_slice(b"\r\n");
            if let Some(content_type) = &part.content_type {
                buf.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            buf.extend_from_slice(b"\r\n");
            buf.extend_from_slice(&part.data);
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Bytes::from(buf)
    }
}

// Quotes and line breaks would terminate the header parameter early.
fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
