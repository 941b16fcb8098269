use std::sync::OnceLock;

use regex::Regex;

fn dash_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^\n])\n—").expect("static dash line regex"))
}

fn orphan_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"—[ \t]*\n(?:[ \t]*\n)+").expect("static orphan dash regex"))
}

/// Gives every dash-led dialogue line its own paragraph and pulls a dash left
/// alone before a blank line back onto the text that follows it.
pub fn separate_dialogue_lines(text: &str) -> String {
    let separated = dash_line_re().replace_all(text, "${1}\n\n—");
    orphan_dash_re().replace_all(&separated, "— ").into_owned()
}
