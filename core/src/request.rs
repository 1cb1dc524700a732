//! Serializes one request into its wire form.
//!
//! Layout: `METHOD SP URI SP VERSION CRLF`, then `Host` and
//! `Connection: close`, then `Content-Length` for POST, then user headers in
//! insertion order, a blank line, and the raw body. The buffer is rebuilt
//! from scratch for every request, so nothing leaks between calls.

use crate::buffer::RequestBuffer;
use crate::error::Error;
use crate::headers::HeaderTable;
use crate::http::{HttpVersion, Method};

/// Builds the complete request bytes without touching the network.
///
/// An empty `uri` is sent as `/`. `body` is only written when non-empty;
/// for `Method::Post` a missing body is announced as `Content-Length: 0`.
pub fn build_request(
    method: Method,
    host: &str,
    uri: &str,
    version: HttpVersion,
    headers: &HeaderTable,
    body: Option<&[u8]>,
) -> Result<RequestBuffer, Error> {
    let uri = if uri.is_empty() { "/" } else { uri };
    let body = body.unwrap_or_default();

    let mut buf = RequestBuffer::new();
    buf.append_str(method.as_str())?;
    buf.append_str(" ")?;
    buf.append_str(uri)?;
    buf.append_str(" ")?;
    buf.append_str(version.as_str())?;
    buf.append_str("\r\n")?;

    append_header(&mut buf, "Host", host)?;
    append_header(&mut buf, "Connection", "close")?;
    if method == Method::Post {
        let mut len = itoa::Buffer::new();
        append_header(&mut buf, "Content-Length", len.format(body.len()))?;
    }
    for header in headers {
        append_header(&mut buf, &header.key, &header.value)?;
    }
    buf.append_str("\r\n")?;

    if !body.is_empty() {
        buf.append(body)?;
    }

    log::trace!("built {} request for {uri}: {} bytes", method.as_str(), buf.len());
    Ok(buf)
}

fn append_header(buf: &mut RequestBuffer, key: &str, value: &str) -> Result<(), Error> {
    buf.append_str(key)?;
    buf.append_str(": ")?;
    buf.append_str(value)?;
    buf.append_str("\r\n")
}
