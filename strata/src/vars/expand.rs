//! `${NAME}` token scanning.

/// Whether `name` is a valid variable name (`[A-Z0-9_]+`).
#[must_use]
pub fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Replace every `${NAME}` token in `input` using `lookup`.
///
/// When `lookup` returns `None` the token is kept verbatim. Text that merely
/// resembles a token, such as `${lower}` or an unterminated `${NAME`, is
/// copied unchanged.
///
/// # Examples
///
/// ```
/// use strata::vars::expand;
///
/// let out = expand("${A}-${b}-${C", |name| (name == "A").then(|| "x".to_owned()));
/// assert_eq!(out, "x-${b}-${C");
/// ```
pub fn expand<F>(input: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        let (before, candidate) = rest.split_at(start);
        out.push_str(before);
        let after_open = candidate.get(2..).unwrap_or_default();
        let name_len = after_open.bytes().take_while(|b| is_name_byte(*b)).count();
        let (name, tail) = after_open.split_at(name_len);
        match tail.strip_prefix('}') {
            Some(remaining) if !name.is_empty() => {
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = remaining;
            }
            _ => {
                out.push('$');
                rest = candidate.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);
    out
}
