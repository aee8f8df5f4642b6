//! Token validation with tiny character-class patterns.
//!
//! A pattern is a sequence of classes, one per token character; `*`
//! repeats the class before it zero or more times.
//!
//! | class | accepts               |
//! |-------|-----------------------|
//! | `a`   | letter                |
//! | `c`   | letter or digit       |
//! | `f`   | letter or `_`         |
//! | `v`   | letter, digit or `_`  |
//! | `s`   | sign or digit         |
//! | `d`   | digit                 |

#[derive(Debug, Clone, Copy)]
enum CharClass {
    Alpha,
    Alphanumeric,
    FirstVariable,
    Variable,
    Signed,
    Digit,
}

impl CharClass {
    fn from_pattern(p: char) -> CharClass {
        match p {
            'a' => CharClass::Alpha,
            'c' => CharClass::Alphanumeric,
            'f' => CharClass::FirstVariable,
            'v' => CharClass::Variable,
            's' => CharClass::Signed,
            'd' => CharClass::Digit,
            _ => panic!("unknown character class {:?} in token pattern", p),
        }
    }

    fn matches(self, c: char) -> bool {
        match self {
            CharClass::Alpha => c.is_ascii_alphabetic(),
            CharClass::Alphanumeric => c.is_ascii_alphanumeric(),
            CharClass::FirstVariable => c.is_ascii_alphabetic() || c == '_',
            CharClass::Variable => c.is_ascii_alphanumeric() || c == '_',
            CharClass::Signed => c.is_ascii_digit() || c == '-' || c == '+',
            CharClass::Digit => c.is_ascii_digit(),
        }
    }
}

/// Whether every character of `token` matches `pattern`
///
/// # Panics
///
/// * `pattern` holds an unknown class or starts with `*`.
pub(crate) fn check_token(token: &str, pattern: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let mut pos = 0;
    let mut last = None;

    for c in token.chars() {
        let class = match pattern.get(pos) {
            Some('*') => match last {
                Some(class) => class,
                None => panic!("token pattern starts with '*'"),
            },
            Some(&p) => {
                let class = CharClass::from_pattern(p);
                last = Some(class);
                pos += 1;
                class
            }
            None => return false,
        };
        if !class.matches(c) {
            return false;
        }
    }
    pattern[pos..].iter().all(|&p| p == '*')
}

/// C style identifier
pub(crate) fn variable_ok(token: &str) -> bool {
    check_token(token, "fv*")
}

pub(crate) fn positive_integer_ok(token: &str) -> bool {
    check_token(token, "d*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(variable_ok("AgentData"));
        assert!(variable_ok("_private"));
        assert!(variable_ok("Block_2"));
        assert!(variable_ok("x"));
        assert!(!variable_ok("2Block"));
        assert!(!variable_ok("Agent-Data"));
        assert!(!variable_ok(""));
    }

    #[test]
    fn integers() {
        assert!(positive_integer_ok("0"));
        assert!(positive_integer_ok("1024"));
        assert!(!positive_integer_ok("-1"));
        assert!(!positive_integer_ok("12a"));
        assert!(!positive_integer_ok(""));

        assert!(check_token("-12", "sd*"));
        assert!(check_token("+3", "sd*"));
        assert!(check_token("7", "sd*"));
        assert!(!check_token("3-", "sd*"));
        assert!(!check_token("-", "sd*"));
    }

    #[test]
    fn fixed_length_patterns() {
        assert!(check_token("ab", "aa"));
        assert!(!check_token("abc", "aa"));
        assert!(!check_token("a", "aa"));
        assert!(check_token("a1", "ac"));
    }

    #[test]
    #[should_panic(expected = "unknown character class")]
    fn unknown_class() {
        check_token("x", "q");
    }
}
