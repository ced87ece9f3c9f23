//! Driver cell sub-parser
//!
//! A driver cell holds the driver's name and three-letter code, but the
//! markup differs across seasons: sometimes separate first-name, last-name
//! and code spans, sometimes only some of them, sometimes plain text.

use scraper::ElementRef;
use tracing::trace;

use super::{fragment_text, is_upper, spaced_text, ResultParser};

/// Driver display name and code, either possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverIdentity {
    pub name: String,
    pub code: String,
}

/// Everything read out of one cell before any heuristic runs.
struct CellParts {
    first: String,
    last: String,
    /// Whole cell text, text nodes joined with single spaces.
    text: String,
}

/// One fallback step: fires only when `applies` holds for the identity
/// built so far.
struct Resolver {
    name: &'static str,
    applies: fn(&DriverIdentity) -> bool,
    apply: fn(&CellParts, &mut DriverIdentity),
}

/// Evaluated in order; the first applicable resolver wins.
const RESOLVERS: [Resolver; 3] = [
    Resolver {
        name: "flattened_text",
        applies: nothing_found,
        apply: split_trailing_code,
    },
    Resolver {
        name: "name_from_code",
        applies: code_only,
        apply: name_without_code,
    },
    Resolver {
        name: "code_from_remainder",
        applies: name_only,
        apply: code_from_remainder,
    },
];

impl ResultParser {
    /// Extract `(name, code)` from a driver cell. An absent cell yields two
    /// empty strings.
    pub fn parse_driver_cell(&self, cell: Option<ElementRef<'_>>) -> DriverIdentity {
        let Some(cell) = cell else {
            return DriverIdentity::default();
        };

        let parts = CellParts {
            first: fragment_text(cell, &self.selectors.first_name),
            last: fragment_text(cell, &self.selectors.last_name),
            text: spaced_text(cell),
        };

        let mut identity = DriverIdentity {
            name: structured_name(&parts),
            code: fragment_text(cell, &self.selectors.code),
        };

        if let Some(resolver) = RESOLVERS.iter().find(|r| (r.applies)(&identity)) {
            trace!("driver cell resolver: {}", resolver.name);
            (resolver.apply)(&parts, &mut identity);
        }

        refine_partial_name(&parts, &mut identity);

        DriverIdentity {
            name: identity.name.trim().to_string(),
            code: identity.code.trim().to_string(),
        }
    }
}

fn nothing_found(id: &DriverIdentity) -> bool {
    id.name.is_empty() && id.code.is_empty()
}

fn code_only(id: &DriverIdentity) -> bool {
    id.name.is_empty() && !id.code.is_empty()
}

fn name_only(id: &DriverIdentity) -> bool {
    !id.name.is_empty() && id.code.is_empty()
}

fn structured_name(parts: &CellParts) -> String {
    match (parts.first.is_empty(), parts.last.is_empty()) {
        (false, false) => format!("{} {}", parts.first, parts.last),
        (false, true) => parts.first.clone(),
        (true, false) => parts.last.clone(),
        (true, true) => String::new(),
    }
}

/// `"Lewis Hamilton HAM"` -> name `"Lewis Hamilton"`, code `"HAM"`.
fn split_trailing_code(parts: &CellParts, id: &mut DriverIdentity) {
    let tokens: Vec<&str> = parts.text.split_whitespace().collect();
    let Some((last, rest)) = tokens.split_last() else {
        return;
    };
    if last.chars().count() == 3 && is_upper(last) {
        id.code = last.to_string();
        id.name = rest.join(" ");
    } else {
        id.name = parts.text.clone();
    }
}

fn name_without_code(parts: &CellParts, id: &mut DriverIdentity) {
    id.name = parts.text.replace(&id.code, "").trim().to_string();
}

fn code_from_remainder(parts: &CellParts, id: &mut DriverIdentity) {
    let remainder = parts.text.replace(&id.name, "");
    let remainder = remainder.trim();
    if remainder.chars().count() == 3 && is_upper(remainder) {
        id.code = remainder.to_string();
    }
}

/// With only one of the first/last name spans present the span is not
/// trusted; the fuller cell text wins.
fn refine_partial_name(parts: &CellParts, id: &mut DriverIdentity) {
    if parts.first.is_empty() == parts.last.is_empty() {
        return;
    }
    let known = if parts.first.is_empty() {
        &parts.last
    } else {
        &parts.first
    };

    if !id.code.is_empty() && parts.text.ends_with(&id.code) {
        let candidate = parts.text[..parts.text.len() - id.code.len()].trim();
        if candidate.contains(known.as_str()) {
            id.name = candidate.to_string();
        }
    } else if *known != parts.text && !parts.text.is_empty() {
        id.name = parts.text.clone();
    }
}
