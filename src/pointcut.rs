//! Pointcut patterns.
//!
//! A pattern is matched against `Type.method` of a [`MethodInfo`],
//! where `*` matches any sequence of characters (including an empty one).
//! For example `UserService.*`, `*.save` and `*Repository.find*`.
//!
//! The container doesn't apply patterns itself, advices and join point builders call [`matches`].

use crate::aspect::MethodInfo;

#[must_use]
pub fn matches(pattern: &str, method: &MethodInfo) -> bool {
    let (type_pattern, method_pattern) = match pattern.split_once('.') {
        Some(parts) => parts,
        // `*` alone matches every method of every type
        None => return pattern.bytes().all(|byte| byte == b'*'),
    };

    glob(type_pattern.as_bytes(), method.type_name.as_bytes()) && glob(method_pattern.as_bytes(), method.name.as_bytes())
}

fn glob(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Position after the last `*` and the text position it resumes from
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                p += 1;
                backtrack = Some((p, t));
            }
            Some(&byte) if byte == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&byte| byte == b'*')
}
