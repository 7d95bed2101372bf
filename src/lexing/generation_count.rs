//! Generation counts
//!
//! An intent declaration may ask for an explicit number of generated
//! examples with a `](N)` suffix: `%[ask_weather](20)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GrammarError, GrammarErrorKind};
use crate::location::{char_column, LineContext};

static GENERATION_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\((?P<count>[0-9]+)\)").expect("valid generation count regex"));

/// Find the number of examples asked for on an intent line.
///
/// Returns `None` when no count is given, leaving the default to the
/// generator.
pub fn find_generation_count(line: &str, ctx: &LineContext) -> Result<Option<u64>, GrammarError> {
    let mut found = None;
    for captures in GENERATION_COUNT.captures_iter(line) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let column = char_column(line, whole.start());
        if found.is_some() {
            return Err(ctx.error(
                GrammarErrorKind::MultipleGenerationCounts,
                column,
                "Expected only one number of generation asked",
            ));
        }
        let digits = &captures["count"];
        let count = digits.parse::<u64>().map_err(|_| {
            ctx.error(
                GrammarErrorKind::InvalidGenerationCount,
                column + 2,
                format!("Generation count '{}' is too large", digits),
            )
        })?;
        found = Some(count);
    }
    Ok(found)
}
