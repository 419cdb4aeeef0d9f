use corrsum::NameMask;
use regex::RegexBuilder;

/// Compiles `pattern` with the requested flags and matches it against every
/// variable name.
pub fn name_mask(
    pattern: &str,
    ignore_case: bool,
    multi_line: bool,
    names: &[String],
) -> Result<NameMask, String> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .multi_line(multi_line)
        .build()
        .map_err(|e| format!("invalid regular expression '{}': {}", pattern, e))?;
    Ok(NameMask::from_names(names, |name| regex.is_match(name)))
}
