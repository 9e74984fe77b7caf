/// Strips HTML markup from free-text fields before they are persisted or
/// rendered. Everything from a `<` through the next `>` is dropped, an
/// unterminated `<` drops the remainder, and stray `>` characters are
/// dropped as well, so the output never contains either character and
/// sanitizing twice is the same as sanitizing once.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            _ => out.push(ch),
        }
    }
    out
}
