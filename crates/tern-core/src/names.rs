//! Helpers for working with qualified class names and accessor names.
//!
//! Class names are dot-separated (`java.util.List`), and nested classes use
//! a `$` separator (`Outer$Inner`). Property accessors follow the JavaBeans
//! convention: `getFoo`/`isFoo` for reads, `setFoo` for writes.

/// Returns the package portion of a qualified name, if any.
///
/// `package_of("java.util.List")` is `Some("java.util")`;
/// `package_of("List")` is `None`.
pub fn package_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[..idx])
}

/// Returns the simple (unqualified) portion of a name.
///
/// `simple_name_of("java.util.List")` is `"List"`.
pub fn simple_name_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Whether the name carries a package qualifier.
#[inline]
pub fn has_package(name: &str) -> bool {
    name.contains('.')
}

/// Whether the first character of the (simple) name is lower case.
///
/// Used as a cheap heuristic: names like `foo` are very unlikely to be
/// classes, so lookup for them skips expensive strategies.
pub fn starts_lower_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_lowercase())
}

/// Replace the last `.` in a name with `$`, producing the nested-class
/// spelling of the same name. Returns `None` when the name has no dot.
///
/// `replace_last_dot_with_dollar("a.b.Outer.Inner")` is
/// `Some("a.b.Outer$Inner")`.
pub fn replace_last_dot_with_dollar(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    let mut out = String::with_capacity(name.len());
    out.push_str(&name[..idx]);
    out.push('$');
    out.push_str(&name[idx + 1..]);
    Some(out)
}

/// Capitalize the first character of a name.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Decapitalize the first character of a name.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The conventional getter name for a property: `foo` becomes `getFoo`.
pub fn getter_name(property: &str) -> String {
    format!("get{}", capitalize(property))
}

/// The conventional boolean getter name for a property: `foo` becomes `isFoo`.
pub fn boolean_getter_name(property: &str) -> String {
    format!("is{}", capitalize(property))
}

/// The conventional setter name for a property: `foo` becomes `setFoo`.
pub fn setter_name(property: &str) -> String {
    format!("set{}", capitalize(property))
}

/// The accessor name for a property in read or write position.
pub fn accessor_name(property: &str, write: bool) -> String {
    if write {
        setter_name(property)
    } else {
        getter_name(property)
    }
}

/// Whether a method name is shaped like a property accessor.
///
/// Requires a `get`/`set` prefix with at least one following character, or
/// an `is` prefix likewise. The character after the prefix must not be
/// lower case, so `getaway` is not an accessor but `getAway` is.
pub fn is_valid_accessor_name(name: &str) -> bool {
    let rest = if let Some(rest) = name.strip_prefix("get").or_else(|| name.strip_prefix("set")) {
        rest
    } else if let Some(rest) = name.strip_prefix("is") {
        rest
    } else {
        return false;
    };
    rest.chars().next().is_some_and(|c| !c.is_lowercase())
}

/// The property name an accessor refers to, if the name is accessor-shaped.
///
/// `property_name_of_accessor("getFoo")` is `Some("foo")`.
pub fn property_name_of_accessor(name: &str) -> Option<String> {
    if !is_valid_accessor_name(name) {
        return None;
    }
    let rest = name
        .strip_prefix("get")
        .or_else(|| name.strip_prefix("set"))
        .or_else(|| name.strip_prefix("is"))?;
    Some(decapitalize(rest))
}
