//! Identifier derivation for generated code.

use std::collections::HashSet;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
    "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return", "static",
    "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual",
    "where", "while", "yield",
];

// Cannot be raw identifiers
const RESERVED_PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Every generated struct defines `new` as its constructor.
pub const CONSTRUCTOR: &str = "new";

/// Replace characters Rust does not allow in identifiers (`mib-2` -> `mib_2`).
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Candidate type name: first character upper-cased, the rest verbatim.
///
/// Keywords get a trailing `_`, so `self` becomes `Self_`.
pub fn class_name(name: &str) -> String {
    let mut chars = name.chars();
    let candidate = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    let candidate = sanitize(&candidate);
    if is_keyword(&candidate) {
        format!("{}_", candidate)
    } else {
        candidate
    }
}

fn is_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name) || RESERVED_PATH_KEYWORDS.contains(&name)
}

/// lowerCamelCase to snake_case: one `_` before every capital, no acronym merging.
///
/// `ifHCInOctets` becomes `if_h_c_in_octets`.
pub fn method_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            result.push('_');
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    let result = sanitize(&result);
    if RUST_KEYWORDS.contains(&result.as_str()) {
        format!("r#{}", result)
    } else if RESERVED_PATH_KEYWORDS.contains(&result.as_str()) || result == CONSTRUCTOR {
        format!("{}_", result)
    } else {
        result
    }
}

/// Identifiers handed out during one emission run.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark names as used without allocating them (runtime types, root struct).
    pub fn reserve<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.taken.extend(names.into_iter().map(str::to_string));
    }

    /// Allocate a unique identifier for `candidate`, appending the smallest
    /// positive integer suffix on collision.
    pub fn allocate(&mut self, candidate: &str) -> String {
        let name = if self.taken.contains(candidate) {
            (1..)
                .map(|n| format!("{}{}", candidate, n))
                .find(|name| !self.taken.contains(name))
                .unwrap_or_else(|| candidate.to_string())
        } else {
            candidate.to_string()
        };
        self.taken.insert(name.clone());
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
