//! Canonical text rendering of filters
//!
//! Printing inverts parsing: for any filter produced by `parse`,
//! `parse(&print(&f))` yields `f` again. Parentheses are minimal, wrapping
//! a child only when its operator binds less tightly than its parent's, so
//! `a = 1 and (b = 2 or c = 3)` keeps its parentheses while
//! `(a = 1 and b = 2) or c = 3` loses them. Equal precedence never wraps,
//! so a right-nested `a or (b or c)` built from constructors prints flat
//! and reparses as the left-nested `(a or b) or c`.

use std::fmt;

use crate::filter::{BoolFilter, CompFilter, Filter, Visitor};

/// Canonical text form of a filter
pub fn print(filter: &Filter) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_filter(filter, &mut out);
    out
}

/// Render the canonical text form into `writer`
pub fn write_filter<W: fmt::Write>(filter: &Filter, writer: &mut W) -> fmt::Result {
    filter.accept(&mut Printer { w: writer })
}

struct Printer<'a, W> {
    w: &'a mut W,
}

impl<W: fmt::Write> Printer<'_, W> {
    fn write_side(&mut self, side: &Filter, parent_prec: u8) -> fmt::Result {
        let parens = side.precedence() < parent_prec;
        if parens {
            self.w.write_str("(")?;
        }
        side.accept(self)?;
        if parens {
            self.w.write_str(")")?;
        }
        Ok(())
    }
}

impl<W: fmt::Write> Visitor for Printer<'_, W> {
    type Error = fmt::Error;

    fn visit_comp(&mut self, filter: &CompFilter) -> fmt::Result {
        write!(self.w, "{} {} {}", filter.field, filter.op, filter.value)
    }

    fn visit_bool(&mut self, filter: &BoolFilter) -> fmt::Result {
        let prec = filter.op.precedence();
        self.write_side(&filter.lhs, prec)?;
        write!(self.w, " {} ", filter.op)?;
        self.write_side(&filter.rhs, prec)
    }
}
