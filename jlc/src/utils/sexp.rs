//! A small s-expression tree used for dumping syntax trees.

use std::fmt::{self, Display, Formatter};

/// An s-expression: atoms at the leaves, lists in between.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

pub trait ToSexp {
    fn to_sexp(&self) -> Sexp;
}

impl Sexp {
    pub fn atom(value: impl ToString) -> Sexp {
        Sexp::Atom(value.to_string())
    }

    pub fn list(elements: Vec<Sexp>) -> Sexp {
        Sexp::List(elements)
    }

    /// A list starting with the atom `head`.
    pub fn tagged(head: &str, rest: impl IntoIterator<Item = Sexp>) -> Sexp {
        let mut elements = vec![Sexp::atom(head)];
        elements.extend(rest);
        Sexp::List(elements)
    }

    /// Length of the single-line rendering.
    fn flat_len(&self) -> usize {
        match self {
            Sexp::Atom(value) => value.len(),
            Sexp::List(elements) => {
                let inner: usize = elements.iter().map(Sexp::flat_len).sum();
                inner + elements.len().saturating_sub(1) + 2
            }
        }
    }

    /// Renders the expression, breaking lists that do not fit into `width` columns so that
    /// every element after the first goes on its own line, indented by one space per level.
    pub fn pretty_print(&self, width: usize) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0, width);
        out
    }

    fn write_pretty(&self, out: &mut String, column: usize, width: usize) {
        let elements = match self {
            Sexp::List(elements) if column + self.flat_len() > width => elements,
            _ => {
                out.push_str(&self.to_string());
                return;
            }
        };

        out.push('(');
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                out.push('\n');
                out.push_str(&" ".repeat(column + 1));
            }
            element.write_pretty(out, column + 1, width);
        }
        out.push(')');
    }
}

impl Display for Sexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Atom(value) => write!(f, "{}", value),
            Sexp::List(elements) => {
                write!(f, "(")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
        }
    }
}
