//! Content digest of a paginated document, recorded for audit trails.

use sha2::{Digest, Sha256};

use crate::pagination::Page;

/// SHA-256 (lowercase hex) over the text of every placed element, in page
/// order. A page break contributes to the digest, so moving an element to
/// another page changes it.
pub fn content_digest(pages: &[Page]) -> String {
    let mut hasher = Sha256::new();
    for page in pages {
        hasher.update(format!("\u{c}page {}\n", page.number).as_bytes());
        for placed in &page.elements {
            hasher.update(placed.element.text.as_bytes());
            hasher.update(b"\n");
        }
    }
    format!("{:x}", hasher.finalize())
}
