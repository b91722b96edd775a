//! Diagnostic rendering of raw protocol bytes.

/// Glyph substituted for a carriage return.
pub const CR_GLYPH: char = '\u{240D}';

/// Glyph substituted for a line feed.
pub const LF_GLYPH: char = '\u{240A}';

/// Decodes `bytes` as text with CR and LF replaced by visible glyphs.
///
/// For logs and debugging only; never use the result for protocol decisions.
pub fn render_visible(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| match c {
            '\r' => CR_GLYPH,
            '\n' => LF_GLYPH,
            other => other,
        })
        .collect()
}
