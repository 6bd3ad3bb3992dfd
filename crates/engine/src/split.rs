//! Splits a batch of semicolon-separated SQL text into individual
//! statements, the way `submit_sql` (spec.md §4.1) accepts "one or more
//! semicolon-separated statements" in a single call.

/// Splits `sql` at top-level `;` characters, skipping separators that
/// appear inside single- or double-quoted string literals or bracketed
/// identifiers. Empty/whitespace-only segments (a trailing `;`, blank
/// lines) are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in sql.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                ';' => {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        statements.push(trimmed.to_string());
                    }
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    statements
}
