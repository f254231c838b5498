//! Identifier allocation
//!
//! Every synthesis run owns its allocators; nothing is global, so two runs
//! over the same grammar produce the same names.

use ahash::RandomState;
use hashbrown::HashSet;

/// Strict, reserved and weak keywords
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
    "union", "_",
];

/// Prelude names generated code relies on
pub const PRELUDE_NAMES: &[&str] = &[
    "Box", "Vec", "Option", "Some", "None", "Result", "Ok", "Err", "String", "ToString",
    "Clone", "Copy", "Debug", "Default", "Eq", "PartialEq", "Ord", "PartialOrd", "Hash",
    "Iterator", "IntoIterator", "Sized", "Send", "Sync", "Drop", "Fn", "FnMut", "FnOnce",
];

/// Names imported from the runtime module by generated code
pub const RUNTIME_NAMES: &[&str] = &["Value", "FromValue", "BuildError", "Repetition"];

/// Replace characters that cannot appear in an identifier
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// `UpperCamelCase` form of `name`, for types and variants
pub fn to_type_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
    {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.is_empty() {
        return "Node".to_string();
    }
    sanitize(&out)
}

/// `snake_case` form of `name`, for fields
pub fn to_field_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_lower = true;
        } else {
            out.push('_');
            prev_lower = false;
        }
    }
    if out.is_empty() {
        return "field".to_string();
    }
    sanitize(&out)
}

/// Hands out unique identifiers, appending `_` on collision
#[derive(Debug, Clone)]
pub struct NameAllocator {
    used: HashSet<String, RandomState>,
}

impl NameAllocator {
    fn seeded(groups: &[&[&str]]) -> Self {
        let mut used = HashSet::with_hasher(RandomState::new());
        for group in groups {
            used.extend(group.iter().map(|name| name.to_string()));
        }
        Self { used }
    }

    /// Allocator for item names: keywords, prelude and runtime names are taken
    pub fn global() -> Self {
        Self::seeded(&[RUST_KEYWORDS, PRELUDE_NAMES, RUNTIME_NAMES])
    }

    /// Allocator for the fields or variants of one type: only keywords are taken
    pub fn local() -> Self {
        Self::seeded(&[RUST_KEYWORDS])
    }

    /// Reserve `base`, or the first free `base_`, `base__`, ...
    pub fn reserve(&mut self, base: &str) -> String {
        let mut name = sanitize(base);
        while self.used.contains(&name) {
            name.push('_');
        }
        self.used.insert(name.clone());
        name
    }

    /// Whether `name` is taken
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}
