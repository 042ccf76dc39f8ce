//! Raw path normalization.
//!
//! Front-end servers and path-segment decoders frequently collapse the `//`
//! of an embedded `http://` into a single slash. This is the only defect
//! repaired here.

const SCHEMES: [&str; 2] = ["https:/", "http:/"];

/// Repair the first `http:/x` or `https:/x` (single slash) in `raw` to the
/// canonical double-slash form. Any other input is returned unchanged.
pub fn extract_path(raw: &str) -> String {
    match find_collapsed_scheme(raw) {
        Some(slash) => {
            let mut path = String::with_capacity(raw.len() + 1);
            path.push_str(&raw[..slash]);
            path.push('/');
            path.push_str(&raw[slash..]);
            path
        }
        None => raw.to_string(),
    }
}

/// Byte offset of the lone slash following the first collapsed scheme marker.
fn find_collapsed_scheme(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();

    for start in 0..bytes.len() {
        for scheme in SCHEMES {
            if !bytes[start..].starts_with(scheme.as_bytes()) {
                continue;
            }
            let after = start + scheme.len();
            match bytes.get(after) {
                Some(b'/') | None => {}
                Some(_) => return Some(after - 1),
            }
        }
    }

    None
}
