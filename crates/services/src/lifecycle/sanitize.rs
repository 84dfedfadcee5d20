/// Strip a caller-supplied room id down to the characters a room id may
/// contain. An id that sanitizes to the empty string is invalid and must
/// be rejected before any lookup.
pub fn sanitize_room_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
