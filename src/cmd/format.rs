/*!
format.rs

Human output helpers for command handlers and usage text.

  - StyleOptions::detect(Stream) -> StyleOptions
  - color(role, text, &StyleOptions) -> String
  - family_list(rows, &StyleOptions) -> String

Colour is decided per stream: off when NO_COLOR is set or the stream the text
is written to is not a terminal. These helpers return strings and never print.
*/

use std::io::IsTerminal;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

/// Where the styled text ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn is_terminal(self) -> bool {
        match self {
            Stream::Stdout => std::io::stdout().is_terminal(),
            Stream::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
}

impl StyleOptions {
    pub fn detect(stream: Stream) -> Self {
        Self::resolve(std::env::var_os("NO_COLOR").is_some(), stream.is_terminal())
    }

    fn resolve(no_color: bool, is_terminal: bool) -> Self {
        StyleOptions {
            use_color: !no_color && is_terminal,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Accent,
    Error,
    Bold,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Accent => "38;5;213", // magenta/pink
        Role::Error => "38;5;196",  // red
        Role::Bold => "1",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Column families                                                            */
/* -------------------------------------------------------------------------- */

/// `FAMILY  GC RULE` header, then one `id  rule` line per family with the id
/// column padded to the longest id. Rules are never cut.
pub fn family_list(rows: &[(String, String)], style: &StyleOptions) -> String {
    const ID_HEADER: &str = "FAMILY";
    let width = rows
        .iter()
        .map(|(id, _)| id.chars().count())
        .fold(ID_HEADER.len(), usize::max);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(color(
        Role::Accent,
        format!("{ID_HEADER:<width$}  GC RULE"),
        style,
    ));
    lines.extend(rows.iter().map(|(id, rule)| format!("{id:<width$}  {rule}")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: StyleOptions = StyleOptions { use_color: false };

    #[test]
    fn family_list_aligns_ids() {
        let t = family_list(
            &[
                ("fam".into(), "max_num_versions: 10".into()),
                ("long_family".into(), "-".into()),
            ],
            &PLAIN,
        );
        assert_eq!(
            t,
            "FAMILY       GC RULE\n\
             fam          max_num_versions: 10\n\
             long_family  -"
        );
    }

    #[test]
    fn family_list_keeps_long_rules_whole() {
        let rule = format!("union {{ {} }}", "rules { max_num_versions: 1 } ".repeat(10));
        let t = family_list(&[("f".into(), rule.clone())], &PLAIN);
        assert!(t.ends_with(&rule));
    }

    #[test]
    fn colour_needs_a_terminal_and_no_no_color() {
        assert!(StyleOptions::resolve(false, true).use_color);
        assert!(!StyleOptions::resolve(false, false).use_color);
        assert!(!StyleOptions::resolve(true, true).use_color);
    }

    #[test]
    fn color_respects_style() {
        assert_eq!(color(Role::Error, "boom", &PLAIN), "boom");
        let colored = StyleOptions { use_color: true };
        assert_eq!(
            color(Role::Error, "boom", &colored),
            "\x1b[38;5;196mboom\x1b[0m"
        );
    }
}
