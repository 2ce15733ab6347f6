//! Fixed-point placeholder expansion.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::catalog::Variable;
use super::error::ResolveError;

/// Upper bound on expansion passes for one template.
///
/// Expansion normally stops earlier, as soon as no `${` remains or a pass
/// leaves the text unchanged.
pub const MAX_PASSES: usize = 16;

static GLOBAL: OnceLock<Expander> = OnceLock::new();

/// Supplies values for recognized variables.
pub trait VariableLookup {
    /// Resolve one occurrence of `variable` with its `:argument`, if any.
    fn lookup(&self, variable: Variable, argument: Option<&str>) -> Result<String, ResolveError>;
}

/// Result of expanding one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The expanded text.
    pub value: String,
    /// Placeholders that failed and were replaced by a fallback token.
    pub diagnostics: Vec<ResolveError>,
    /// Number of passes applied.
    pub passes: usize,
}

impl Expansion {
    /// True when every placeholder resolved.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Text substituted for a placeholder that could not be resolved.
///
/// `body` is the text between `${` and `}`. The token never contains `${`,
/// so it can not be picked up again by a later pass.
pub fn fallback_token(body: &str) -> String {
    format!("<unresolved:{body}>")
}

/// Expands `${...}` placeholders against the variable catalog.
pub struct Expander {
    patterns: Vec<(Variable, Regex)>,
    max_passes: usize,
}

impl Expander {
    /// Compile the catalog patterns.
    pub fn new() -> Self {
        let patterns = Variable::ALL
            .iter()
            .map(|variable| {
                let re = Regex::new(&variable.pattern()).expect("catalog patterns are valid");
                (*variable, re)
            })
            .collect();

        Self {
            patterns,
            max_passes: MAX_PASSES,
        }
    }

    /// Shared expander instance.
    pub fn global() -> &'static Expander {
        GLOBAL.get_or_init(Expander::new)
    }

    /// Override the pass cap.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Expand `template` until it is stable.
    ///
    /// Repeats [`Expander::apply_once`] until no `${` remains, a pass
    /// changes nothing, or the pass cap is reached.
    pub fn expand(&self, template: &str, lookup: &dyn VariableLookup) -> Expansion {
        let mut diagnostics = Vec::new();
        let mut current = template.to_string();
        let mut passes = 0;

        while passes < self.max_passes && current.contains("${") {
            let next = self.apply_once(&current, lookup, &mut diagnostics);
            passes += 1;

            if next == current {
                break;
            }
            current = next;
        }

        if passes == self.max_passes && current.contains("${") {
            crate::debug_event!("expand", "pass cap reached", "{template}");
        }

        Expansion {
            value: current,
            diagnostics,
            passes,
        }
    }

    /// Apply every catalog variable once, in priority order.
    ///
    /// Each variable replaces its matches left to right without overlap.
    pub fn apply_once(
        &self,
        text: &str,
        lookup: &dyn VariableLookup,
        diagnostics: &mut Vec<ResolveError>,
    ) -> String {
        let mut current = text.to_string();

        for (variable, re) in &self.patterns {
            if !current.contains("${") {
                break;
            }

            let replaced = re.replace_all(&current, |caps: &Captures| {
                let argument = caps.get(1).map(|m| m.as_str());
                match lookup.lookup(*variable, argument) {
                    Ok(value) => value,
                    Err(e) => {
                        diagnostics.push(e);
                        let whole = &caps[0];
                        fallback_token(&whole[2..whole.len() - 1])
                    }
                }
            });
            current = replaced.into_owned();
        }

        current
    }
}

impl Default for Expander {
    fn default() -> Self {
        Self::new()
    }
}
