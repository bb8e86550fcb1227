//! Shared utility functions
//!
//! Qualified-name and identifier helpers used by the store, the model and the
//! source builders.

/// Last segment of a dotted qualified name
///
/// # Examples
/// ```
/// use classforge::util::simple_name;
/// assert_eq!(simple_name("java.util.List"), "List");
/// assert_eq!(simple_name("Widget"), "Widget");
/// ```
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Everything before the last dot, or "" for unqualified names
///
/// # Examples
/// ```
/// use classforge::util::qualifier;
/// assert_eq!(qualifier("java.util.List"), "java.util");
/// assert_eq!(qualifier("Widget"), "");
/// ```
pub fn qualifier(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(idx) => &qualified[..idx],
        None => "",
    }
}

/// Convert a binary name (`a.b.Outer$Inner`) to its source form (`a.b.Outer.Inner`)
pub fn normalize_name(name: &str) -> String {
    name.trim().replace('$', ".")
}

/// Join a package and a simple name
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

/// Uppercase the first character
///
/// # Examples
/// ```
/// use classforge::util::capitalize;
/// assert_eq!(capitalize("name"), "Name");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert camelCase to UPPER_SNAKE_CASE
///
/// # Examples
/// ```
/// use classforge::util::to_upper_snake_case;
/// assert_eq!(to_upper_snake_case("maxSize"), "MAX_SIZE");
/// ```
pub fn to_upper_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            result.push('_');
        }
        result.push(c.to_ascii_uppercase());
    }
    result
}

/// Whether `name` is a legal identifier in the target language
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
