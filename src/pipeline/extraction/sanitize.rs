/// Sanitize extracted text before line parsing.
/// Strips control characters, trims and collapses blank lines, preserves the
/// punctuation lab values and reference ranges depend on.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '\\'
                        | '|'
                        | '('
                        | ')'
                        | '['
                        | ']'
                        | '+'
                        | '='
                        | '%'
                        | '#'
                        | '*'
                        | '\''
                        | '"'
                        | '!'
                        | '?'
                        | '<'
                        | '>'
                        | '≤'
                        | '≥'
                        | '_'
                        | '^'
                        | '°'
                        | '²'
                        | '³'
                        | 'µ'
                        | '×'
                        | '\u{2013}' // En-dash, common in printed ranges
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
