//! JSON minification.

use serde_json::Value;

/// Re-serializes JSON `content` in compact form.
///
/// Object keys keep their order, floats keep zero fraction (`1.0` stays
/// `1.0`). If `content` is not valid JSON or cannot be serialized back, it is
/// returned unchanged. This function never fails.
pub fn minify(content: Vec<u8>) -> Vec<u8> {
    let value = match serde_json::from_slice::<Value>(&content) {
        Ok(value) => value,
        Err(error) => {
            log::trace!("not minifying malformed json: {error}");
            return content;
        }
    };

    match serde_json::to_vec(&value) {
        Ok(minified) => minified,
        Err(_) => content,
    }
}
