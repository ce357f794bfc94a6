use ammonia;

/// Strips unsafe markup from teacher-authored text before it is stored.
///
/// Whitelist-based: harmless formatting tags survive, while `<script>`, `<iframe>`
/// and event-handler attributes are removed. Pending questions are rendered on the
/// teacher dashboard, so this blocks stored XSS there.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}
