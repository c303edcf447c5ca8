//! Glob filters used to narrow the catalog at construction time.
use crate::error::FsError;
use glob::{MatchOptions, Pattern};

/// The conventional directory BIF archives live in.
const ARCHIVE_DIR_PREFIX: &str = "data/";

/// A compiled, immutable glob matcher with optional input normalization.
///
/// `*` matches any character including `/`. Stripping rules apply to the
/// input only and are switched off when the pattern itself spells out the
/// part that would be stripped.
#[derive(Debug, Clone)]
pub struct Filter {
    pattern: Pattern,
    case_sensitive: bool,
    /// Drop a leading `data/` from the input.
    strip_prefix: bool,
    /// Drop the final `.ext` from the input.
    strip_extension: bool,
}

impl Filter {
    /// Compiles `pattern` into a filter.
    ///
    /// An empty pattern yields `None`, meaning "match everything".
    pub fn compile(
        pattern: &str,
        case_sensitive: bool,
        strip_prefix: bool,
        strip_extension: bool,
    ) -> Result<Option<Filter>, FsError> {
        if pattern.is_empty() {
            return Ok(None);
        }
        let pattern = if case_sensitive {
            pattern.to_string()
        } else {
            pattern.to_lowercase()
        };
        let strip_prefix = strip_prefix && !pattern.contains(['/', '\\']);
        let strip_extension = strip_extension && !pattern.contains('.');

        let compiled = Pattern::new(&pattern).map_err(|source| FsError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Some(Filter {
            pattern: compiled,
            case_sensitive,
            strip_prefix,
            strip_extension,
        }))
    }

    /// A case-insensitive filter for archive paths such as `data/AREA000A.bif`.
    ///
    /// `AREA*` matches that path; `data/AREA*.bif` does too.
    pub fn archive(pattern: &str) -> Result<Option<Filter>, FsError> {
        Self::compile(pattern, false, true, true)
    }

    /// A case-insensitive filter for resource names such as `ABELA01.WAV`.
    ///
    /// A pattern without a dot is matched against the bare name.
    pub fn resource(pattern: &str) -> Result<Option<Filter>, FsError> {
        Self::compile(pattern, false, false, true)
    }

    /// The compiled pattern. Lowercased unless the filter is case-sensitive.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Tests `input` against the pattern after normalizing it.
    pub fn matches(&self, input: &str) -> bool {
        let mut input = input;
        if self.strip_prefix {
            input = strip_archive_prefix(input);
        }
        if self.strip_extension {
            input = strip_extension(input);
        }
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        if self.case_sensitive {
            self.pattern.matches_with(input, options)
        } else {
            self.pattern.matches_with(&input.to_lowercase(), options)
        }
    }
}

fn strip_archive_prefix(input: &str) -> &str {
    match input.get(..ARCHIVE_DIR_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(ARCHIVE_DIR_PREFIX) => {
            &input[ARCHIVE_DIR_PREFIX.len()..]
        }
        _ => input,
    }
}

fn strip_extension(input: &str) -> &str {
    let file_start = input.rfind('/').map_or(0, |i| i + 1);
    match input[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &input[..file_start + dot],
        _ => input,
    }
}

/// Matches when there is no filter, or the filter accepts `input`.
pub(crate) fn accepts(filter: Option<&Filter>, input: &str) -> bool {
    filter.map_or(true, |f| f.matches(input))
}
