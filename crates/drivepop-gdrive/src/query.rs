//! Drive search query (`q`) construction
//!
//! Drive's query language quotes string literals with `'` and escapes
//! `'` and `\` inside them with a backslash.

/// Escapes a value for use inside a single-quoted query literal
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Query for the non-trashed direct children of `parent_id`, optionally
/// restricted to an exact name
pub fn children(parent_id: &str, name: Option<&str>) -> String {
    let mut q = format!("'{}' in parents and trashed = false", escape(parent_id));
    if let Some(name) = name {
        q.push_str(&format!(" and name = '{}'", escape(name)));
    }
    q
}

/// Query for shared drives with an exact name
pub fn drive_named(name: &str) -> String {
    format!("name = '{}'", escape(name))
}
