use smol_str::SmolStr;

/// The escape character. A package path containing it cannot be wrapped;
/// that is a caller bug and aborts.
pub const ESCAPE: char = '$';

const SLASH: &str = "$s";
const DOT: &str = "$d";

fn is_plain(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escapes a package path into a single identifier the canonical-ID grammar
/// can lex, deterministically and reversibly. Slash and dot get short forms;
/// any other non-identifier ASCII character escapes as `$x` plus two hex
/// digits.
///
/// A path of plain identifier characters is returned unchanged. *Panics* if
/// `path` already contains [ESCAPE] or a non-ASCII separator.
pub fn wrap(path: &str) -> SmolStr {
    assert!(
        !path.contains(ESCAPE),
        "package path contains the escape character {:?}: {}",
        ESCAPE,
        path
    );
    if path.chars().all(is_plain) {
        return SmolStr::new(path);
    }
    let mut out = String::with_capacity(path.len() + 8);
    out.push(ESCAPE);
    for c in path.chars() {
        match c {
            '/' => out.push_str(SLASH),
            '.' => out.push_str(DOT),
            c if is_plain(c) => out.push(c),
            c => {
                assert!(
                    c.is_ascii(),
                    "package path contains a non-ASCII separator {:?}: {}",
                    c,
                    path
                );
                out.push(ESCAPE);
                out.push('x');
                out.push_str(&format!("{:02x}", c as u32));
            }
        }
    }
    out.push(ESCAPE);
    SmolStr::new(out)
}

/// Exact inverse of [wrap]. Input without the surrounding markers is returned
/// unchanged, so callers may pass wrapped and unwrapped names interchangeably.
pub fn unwrap(id: &str) -> SmolStr {
    let inner = match id.strip_prefix(ESCAPE).and_then(|rest| rest.strip_suffix(ESCAPE)) {
        Some(inner) => inner,
        None => return SmolStr::new(id),
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push('/'),
            Some('d') => out.push('.'),
            Some('x') => {
                let code = match (chars.next(), chars.next()) {
                    (Some(hi), Some(lo)) => {
                        let hex: String = [hi, lo].iter().collect();
                        u8::from_str_radix(&hex, 16).ok()
                    }
                    _ => None,
                };
                match code {
                    Some(code) => out.push(code as char),
                    None => panic!("malformed hex escape in wrapped identifier {:?}", id),
                }
            }
            other => panic!(
                "malformed wrapped identifier {:?}: escape followed by {:?}",
                id, other
            ),
        }
    }
    SmolStr::new(out)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::ident::{unwrap, wrap};

    #[test]
    pub fn test_round_trip() {
        for path in [
            "net/url",
            "a.b.c/d",
            "github.com/user/repo",
            "github.com/user/my-repo",
            "gopkg.in/yaml.v3",
            "x",
        ] {
            assert_eq!(unwrap(&wrap(path)), path);
        }
    }

    #[test]
    pub fn test_wrapped_paths_lex_as_identifiers() {
        assert_eq!(wrap("net/url"), "$net$surl$");
        // Characters without a short form get a hex escape
        assert_eq!(
            wrap("github.com/user/my-repo"),
            "$github$dcom$suser$smy$x2drepo$"
        );
        assert!(wrap("a-b").chars().all(|c| c.is_alphanumeric() || c == '$'));
    }

    #[test]
    pub fn test_separator_free_path_is_unchanged() {
        assert_eq!(wrap("url"), "url");
        assert_eq!(wrap(""), "");
    }

    #[test]
    pub fn test_unwrap_is_identity_on_unwrapped_input() {
        assert_eq!(unwrap("url"), "url");
        assert_eq!(unwrap("$"), "$");
        let wrapped = wrap("net/url");
        assert_eq!(wrap(&unwrap(&wrapped)).as_str(), wrapped.as_str());
    }

    #[test]
    #[should_panic]
    pub fn test_escape_character_in_path_aborts() {
        wrap("bad$path/x");
    }
}
