use uuid::Uuid;

/// Generate an opaque element id, prefixed with the element kind
/// (`"wall"`, `"room"`, ...). Ids never repeat within a process.
pub fn generate_id(kind: &str) -> String {
    format!("{}-{}", kind, Uuid::new_v4().simple())
}
