//! Symbolic composite units
//!
//! A [`Unit`] is a product of named symbols raised to integer powers. It
//! carries no scale or dimension of its own; those come from a
//! [`UnitResolver`](crate::UnitResolver) at conversion time, so parsing and
//! printing never depend on which units are currently enabled.
//!
//! Accepted syntax:
//! - products by juxtaposition or `*`: `Mpc s`, `kg*m`
//! - division with `/` (left associative): `km / s / Mpc`
//! - parentheses: `km / (Mpc s)`
//! - integer powers as suffix or operator: `s-1`, `Mpc3`, `m**2`, `m^2`
//! - `""` or `1` for dimensionless

use std::fmt;
use std::str::FromStr;

use crate::error::UnitError;

/// Canonical product of `(symbol, power)` terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Unit {
    terms: Vec<(String, i32)>,
}

impl Unit {
    /// The dimensionless unit.
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single named unit, e.g. `Unit::symbol("Mpc")`.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self {
            terms: vec![(name.into(), 1)],
        }
    }

    pub fn parse(input: &str) -> Result<Self, UnitError> {
        let mut parser = Parser::new(input);
        parser.skip_ws();
        if parser.at_end() {
            return Ok(Self::dimensionless());
        }
        let unit = parser.parse_expr()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(UnitError::parse(
                input,
                format!("unexpected '{}' at offset {}", parser.chars[parser.pos], parser.pos),
            ));
        }
        Ok(unit)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in canonical order.
    pub fn terms(&self) -> &[(String, i32)] {
        &self.terms
    }

    /// Product of two units; fails when a combined power leaves `i32`.
    pub fn mul(&self, other: &Unit) -> Result<Unit, UnitError> {
        let mut terms = self.terms.clone();
        for (sym, pow) in &other.terms {
            match terms.iter_mut().find(|(s, _)| s == sym) {
                Some((_, p)) => {
                    *p = p
                        .checked_add(*pow)
                        .ok_or_else(|| UnitError::ExponentOverflow(sym.clone()))?
                }
                None => terms.push((sym.clone(), *pow)),
            }
        }
        Ok(Self::canonical(terms))
    }

    pub fn div(&self, other: &Unit) -> Result<Unit, UnitError> {
        self.mul(&other.powi(-1)?)
    }

    pub fn powi(&self, n: i32) -> Result<Unit, UnitError> {
        let terms = self
            .terms
            .iter()
            .map(|(s, p)| {
                p.checked_mul(n)
                    .map(|p| (s.clone(), p))
                    .ok_or_else(|| UnitError::ExponentOverflow(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::canonical(terms))
    }

    // Positive powers before negative ones, larger magnitudes first, then by
    // symbol. Zero powers are dropped.
    fn canonical(mut terms: Vec<(String, i32)>) -> Unit {
        terms.retain(|(_, p)| *p != 0);
        terms.sort_by(|(sa, pa), (sb, pb)| {
            (*pa < 0, -pa.abs(), sa.as_str()).cmp(&(*pb < 0, -pb.abs(), sb.as_str()))
        });
        Unit { terms }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(terms: &[&(String, i32)]) -> String {
            terms
                .iter()
                .map(|(s, p)| match p.abs() {
                    1 => s.clone(),
                    n => format!("{}{}", s, n),
                })
                .collect::<Vec<_>>()
                .join(" ")
        }

        let (num, den): (Vec<_>, Vec<_>) = self.terms.iter().partition(|(_, p)| *p > 0);
        let numerator = if num.is_empty() && !den.is_empty() {
            "1".to_string()
        } else {
            join(&num)
        };
        match den.len() {
            0 => write!(f, "{}", numerator),
            1 => write!(f, "{} / {}", numerator, join(&den)),
            _ => write!(f, "{} / ({})", numerator, join(&den)),
        }
    }
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: impl Into<String>) -> UnitError {
        UnitError::parse(self.input, reason)
    }

    fn parse_expr(&mut self) -> Result<Unit, UnitError> {
        let mut unit = self.parse_product()?;
        loop {
            self.skip_ws();
            if self.peek() == Some('/') {
                self.pos += 1;
                let denominator = self.parse_product()?;
                unit = unit.div(&denominator)?;
            } else {
                break;
            }
        }
        Ok(unit)
    }

    fn parse_product(&mut self) -> Result<Unit, UnitError> {
        let mut unit = self.parse_power()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') if self.peek_at(1) != Some('*') => {
                    self.pos += 1;
                    unit = unit.mul(&self.parse_power()?)?;
                }
                Some(c) if c.is_alphabetic() || c == '(' => {
                    unit = unit.mul(&self.parse_power()?)?;
                }
                _ => break,
            }
        }
        Ok(unit)
    }

    fn parse_power(&mut self) -> Result<Unit, UnitError> {
        self.skip_ws();
        let atom = match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.skip_ws();
                if self.peek() != Some(')') {
                    return Err(self.error("unclosed parenthesis"));
                }
                self.pos += 1;
                inner
            }
            Some(c) if c.is_alphabetic() => Unit::symbol(self.parse_ident()),
            Some(c) if c.is_ascii_digit() => match self.parse_int()? {
                1 => Unit::dimensionless(),
                n => return Err(self.error(format!("scaled units are not supported ({})", n))),
            },
            Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            None => return Err(self.error("unexpected end of input")),
        };

        // suffix power binds only when adjacent: `s-1`, `Mpc3`
        match (self.peek(), self.peek_at(1)) {
            (Some(c), _) if c.is_ascii_digit() => return atom.powi(self.parse_int()?),
            (Some('-' | '+'), Some(d)) if d.is_ascii_digit() => {
                return atom.powi(self.parse_int()?)
            }
            _ => {}
        }

        let save = self.pos;
        self.skip_ws();
        let has_operator = if self.peek() == Some('*') && self.peek_at(1) == Some('*') {
            self.pos += 2;
            true
        } else if self.peek() == Some('^') {
            self.pos += 1;
            true
        } else {
            false
        };
        if !has_operator {
            self.pos = save;
            return Ok(atom);
        }

        self.skip_ws();
        let exponent = if self.peek() == Some('(') {
            self.pos += 1;
            self.skip_ws();
            let n = self.parse_int()?;
            self.skip_ws();
            if self.peek() != Some(')') {
                return Err(self.error("unclosed exponent"));
            }
            self.pos += 1;
            n
        } else {
            self.parse_int()?
        };
        atom.powi(exponent)
    }

    fn parse_ident(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphabetic() || c == '_') {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_int(&mut self) -> Result<i32, UnitError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i32>()
            .map_err(|_| self.error(format!("invalid integer '{}'", text)))
    }
}
