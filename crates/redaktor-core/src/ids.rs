//! Identifier generation
//!
//! Ids are opaque strings. Callers must not assume they are numeric or
//! sortable; they are only guaranteed unique within their scope (the whole
//! document for pages, the owning page for elements).

use uuid::Uuid;

/// Generate a random identifier
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate an identifier that `is_taken` reports as unused
pub fn fresh_id(is_taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id();
        if !is_taken(&id) {
            return id;
        }
    }
}
