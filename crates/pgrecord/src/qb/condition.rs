//! Condition accumulation for WHERE/HAVING.
//!
//! Conditions are kept as an ordered list of terms and rendered once, so the
//! pending chain keyword never has to be spliced into half-built text.

use std::fmt;

/// Boolean keyword joining a condition to the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    And,
    Or,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::And => "AND",
            Chain::Or => "OR",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Term {
    /// `None` only for the first term.
    chain: Option<Chain>,
    column: String,
    operator: String,
    value: String,
}

/// Ordered condition terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Conditions {
    terms: Vec<Term>,
}

impl Conditions {
    /// Add a term.
    ///
    /// Without a chain the term replaces everything accumulated so far; with a
    /// chain it is appended. A chain on an empty list is dropped. Returns the
    /// number of terms discarded by a replacement.
    pub(crate) fn push(
        &mut self,
        chain: Option<Chain>,
        column: String,
        operator: String,
        value: String,
    ) -> usize {
        let mut discarded = 0;
        let chain = match chain {
            Some(chain) if !self.terms.is_empty() => Some(chain),
            _ => {
                discarded = self.terms.len();
                self.terms.clear();
                None
            }
        };
        self.terms.push(Term {
            chain,
            column,
            operator,
            value,
        });
        discarded
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.terms.clear();
    }

    /// `a=:a AND b>:b OR c=:c`
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        for term in &self.terms {
            if let Some(chain) = term.chain {
                out.push(' ');
                out.push_str(chain.as_str());
                out.push(' ');
            }
            out.push_str(&term.column);
            out.push_str(&term.operator);
            out.push_str(&term.value);
        }
        out
    }
}
