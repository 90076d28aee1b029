//! `M117` display messages.

/// Build the `M117` line that shows `text` on the printer display.
///
/// A G-code line ends at the first newline and `;` starts a comment, so both
/// are replaced to keep the whole message on screen.
pub fn display_command(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '\r' | '\n' | '\t' => ' ',
            ';' => ',',
            other => other,
        })
        .collect();
    format!("M117 {}", cleaned)
}
