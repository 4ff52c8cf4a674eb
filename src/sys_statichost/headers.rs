//! Response headers derived from the resolved file.

use std::path::Path;

use hyper::header::{
    CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue, LAST_MODIFIED,
};
use mime_guess::{Mime, mime};

use crate::sys_statichost::core::content_extension;
use crate::sys_statichost::fs::FileMeta;
use crate::sys_statichost::handlers::ResponseHandle;
use crate::sys_statichost::options::SendOptions;

/// Run the caller's hook, then fill in length, caching and type.
///
/// `Content-Length` always reflects the bytes about to be streamed; the
/// other headers are only set when the response does not carry them yet.
pub fn derive_headers(
    res: &mut dyn ResponseHandle,
    path: &Path,
    meta: &FileMeta,
    encoding_suffix: &str,
    options: &SendOptions,
) {
    if let Some(hook) = &options.set_headers {
        hook.call(res, path, meta);
    }

    res.set_header(CONTENT_LENGTH, HeaderValue::from(meta.size));

    if let Some(modified) = meta.modified {
        set_if_absent(res, LAST_MODIFIED, &httpdate::fmt_http_date(modified));
    }

    let mut cache_control = format!("max-age={}", options.max_age.as_secs());
    if options.immutable {
        cache_control.push_str(",immutable");
    }
    set_if_absent(res, CACHE_CONTROL, &cache_control);

    set_if_absent(res, CONTENT_TYPE, &content_type(path, encoding_suffix));
}

fn set_if_absent(res: &mut dyn ResponseHandle, name: HeaderName, value: &str) {
    if res.header(&name).is_some() {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(value) {
        res.set_header(name, value);
    }
}

/// MIME type of the underlying content, ignoring a `.br`/`.gz` wrapper.
pub fn content_type(path: &Path, encoding_suffix: &str) -> String {
    let mime = content_extension(path, encoding_suffix)
        .map(|ext| mime_guess::from_ext(ext).first_or_octet_stream())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    if is_textual(&mime) {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}

fn is_textual(mime: &Mime) -> bool {
    mime.type_() == mime::TEXT
        || mime.subtype() == mime::JSON
        || mime.subtype() == mime::JAVASCRIPT
}
