//! SVG document assembly.

/// Wraps newline-joined path markup in an `<svg>` root of the given size.
pub fn wrap_document(width: u32, height: u32, markup: &str) -> String {
    format!("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">{markup}</svg>")
}
