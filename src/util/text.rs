/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                if !buf.is_empty() {
                    buf.push(' ');
                }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}

/// Normalize free text extracted from a page: collapse whitespace and drop
/// control characters. Empty input stays empty.
pub fn clean_text(s: &str) -> String {
    let collapsed = collapse_whitespace(s);
    collapsed.chars().filter(|c| !c.is_control()).collect()
}

/// Truncate to `max` characters, appending an ellipsis when cut. Used for
/// synthetic titles derived from long description text.
pub fn truncate_title(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace() {
        let got = collapse_whitespace("  a\n\n b\t\tc  ");
        assert_eq!(got, "a b c");
    }

    #[test]
    fn clean_text_strips_controls() {
        let got = clean_text("sistema\u{0000} fora\u{0007} do ar");
        assert_eq!(got, "sistema fora do ar");
    }

    #[test]
    fn clean_text_empty_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n  "), "");
    }

    #[test]
    fn truncate_only_when_long() {
        assert_eq!(truncate_title("curto", 10), "curto");
        assert_eq!(truncate_title("abcdefghij", 5), "abcde...");
    }

    #[test]
    fn truncate_handles_multibyte() {
        let s = "lentidão no aplicativo do banco";
        let got = truncate_title(s, 8);
        assert_eq!(got, "lentidão...");
    }
}
