//! Cookie consent banner dismissal
//!
//! Dismissal is best effort: a small script clicks the first visible button or
//! link whose text matches one of the configured accept patterns. Absence of a
//! banner, a script error, or a timeout are all ignored by the caller.

/// Accept-button texts tried by default
pub const DEFAULT_PATTERNS: &[&str] = &[
    "Accept all",
    "Accept all cookies",
    "Accept",
    "Allow all",
    "I agree",
    "Agree",
    "Hyväksy kaikki",
    "Hyväksy",
    "Godkänn alla",
];

/// Normalizes the configured patterns into the texts a button must equal
///
/// Texts are whitespace-collapsed and lowercased. Blank patterns are dropped
/// and duplicates keep their first position. A button matches only when its
/// whole visible text equals one of these, so "Accept all" does not fire on
/// "Read about how we accept all liability".
pub fn accept_texts(patterns: &[String]) -> Vec<String> {
    let mut texts: Vec<String> = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let text = collapse_whitespace(pattern).to_lowercase();
        if !text.is_empty() && !texts.contains(&text) {
            texts.push(text);
        }
    }
    texts
}

/// Builds the in-page script that clicks the first matching accept button
///
/// The script evaluates to `true` when it clicked something.
pub fn consent_script(patterns: &[String]) -> String {
    // serde_json gives correctly escaped JS string literals
    let list = serde_json::to_string(&accept_texts(patterns)).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"(() => {{
    const patterns = {list};
    const candidates = document.querySelectorAll('button, a, [role="button"], input[type="button"], input[type="submit"]');
    for (const el of candidates) {{
        const text = (el.innerText || el.value || '').replace(/\s+/g, ' ').trim().toLowerCase();
        if (text && patterns.includes(text) && el.offsetParent !== null) {{
            el.click();
            return true;
        }}
    }}
    return false;
}})()"#
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
    }

    /// Pulls the JSON pattern list back out of a generated script
    fn embedded_patterns(script: &str) -> Vec<String> {
        let start = script.find("const patterns = ").unwrap() + "const patterns = ".len();
        let end = start + script[start..].find(";\n").unwrap();
        serde_json::from_str(&script[start..end]).unwrap()
    }

    #[test]
    fn test_accept_texts_normalized() {
        let texts = accept_texts(&[
            "ACCEPT ALL".to_string(),
            "  Hyväksy   kaikki ".to_string(),
            "   ".to_string(),
            "accept all".to_string(),
        ]);
        assert_eq!(texts, vec!["accept all", "hyväksy kaikki"]);
    }

    #[test]
    fn test_blank_patterns_yield_nothing() {
        assert!(accept_texts(&["".to_string(), " \t ".to_string()]).is_empty());
    }

    #[test]
    fn test_script_embeds_exactly_accept_texts() {
        let patterns = defaults();
        let script = consent_script(&patterns);
        assert_eq!(embedded_patterns(&script), accept_texts(&patterns));
        assert!(script.contains("el.click()"));
    }

    #[test]
    fn test_script_matches_whole_text_only() {
        let script = consent_script(&["Accept  All".to_string(), "  ".to_string()]);
        assert_eq!(embedded_patterns(&script), vec!["accept all"]);
        assert!(script.contains("patterns.includes(text)"));
    }

    #[test]
    fn test_script_escapes_quotes() {
        let patterns = vec![r#"Say "yes""#.to_string()];
        let script = consent_script(&patterns);
        assert!(script.contains(r#"say \"yes\""#));
        assert_eq!(embedded_patterns(&script), vec![r#"say "yes""#]);
    }
}
