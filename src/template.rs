// src/template.rs - Named-field substitution for display templates
//!
//! Templates are plain text with `{name}` or `{name:spec}` placeholders and
//! `{{` / `}}` escapes. The format spec is the familiar subset
//! `[[fill]align][0][width][.precision][type]` with `type` one of `d`, `f`
//! or `s`. Only the fields handed to [`render`] may be referenced; anything
//! else is a [`FormatError`].
//!
//! ```
//! use krusty_status::template::{render, FieldValue};
//! let text = render(
//!     "{hours:02d}:{minutes:02d}",
//!     &[("hours", FieldValue::Int(2)), ("minutes", FieldValue::Int(5))],
//! ).unwrap();
//! assert_eq!(text, "02:05");
//! ```

use thiserror::Error;

/// Upper bound on width and precision. Display lines are far shorter.
pub const MAX_FIELD_WIDTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("no value available for '{0}'")]
    MissingValue(String),
    #[error("unmatched brace at byte {0}")]
    UnmatchedBrace(usize),
    #[error("invalid format spec '{spec}' for field '{field}'")]
    InvalidSpec { field: String, spec: String },
    #[error("format code '{code}' cannot be applied to field '{field}'")]
    TypeMismatch { field: String, code: char },
    #[error("invalid date/time pattern '{0}'")]
    InvalidPattern(String),
    #[error("value out of range for '{0}'")]
    OutOfRange(String),
}

/// A value that can be substituted into a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    fn is_numeric(&self) -> bool {
        !matches!(self, FieldValue::Text(_))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FormatSpec {
    fn parse(field: &str, spec: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::InvalidSpec {
            field: field.to_string(),
            spec: spec.to_string(),
        };
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;
        let mut fill = ' ';
        let mut align = None;

        if let Some(a) = chars.get(1).and_then(|c| Align::from_char(*c)) {
            fill = chars[0];
            align = Some(a);
            i = 2;
        } else if let Some(a) = chars.first().and_then(|c| Align::from_char(*c)) {
            align = Some(a);
            i = 1;
        }

        let mut zero = false;
        if chars.get(i) == Some(&'0') {
            zero = true;
            i += 1;
        }

        let width_start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        let width = if i > width_start {
            chars[width_start..i]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| invalid())?
        } else {
            0
        };
        if width > MAX_FIELD_WIDTH {
            return Err(invalid());
        }

        let mut precision = None;
        if chars.get(i) == Some(&'.') {
            i += 1;
            let start = i;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            if i == start {
                return Err(invalid());
            }
            let digits: usize = chars[start..i]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| invalid())?;
            if digits > MAX_FIELD_WIDTH {
                return Err(invalid());
            }
            precision = Some(digits);
        }

        let mut kind = None;
        if let Some(&c) = chars.get(i) {
            if !matches!(c, 'd' | 'f' | 's') {
                return Err(invalid());
            }
            kind = Some(c);
            i += 1;
        }

        if i != chars.len() {
            return Err(invalid());
        }

        Ok(Self { fill, align, zero, width, precision, kind })
    }

    fn body(&self, field: &str, spec: &str, value: &FieldValue) -> Result<String, FormatError> {
        let mismatch = |code| FormatError::TypeMismatch { field: field.to_string(), code };
        match (value, self.kind) {
            (FieldValue::Int(_), None | Some('d')) if self.precision.is_some() => {
                Err(FormatError::InvalidSpec { field: field.to_string(), spec: spec.to_string() })
            }
            (FieldValue::Int(n), None | Some('d')) => Ok(n.to_string()),
            (FieldValue::Int(n), Some('f')) => Ok(format!("{:.*}", self.precision.unwrap_or(6), *n as f64)),
            (FieldValue::Float(x), Some('f')) => Ok(format!("{:.*}", self.precision.unwrap_or(6), x)),
            (FieldValue::Float(x), None) => Ok(match self.precision {
                Some(p) => format!("{:.*}", p, x),
                None => float_repr(*x),
            }),
            (FieldValue::Text(s), None | Some('s')) => Ok(match self.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s.clone(),
            }),
            (_, Some(code)) => Err(mismatch(code)),
        }
    }

    fn write(&self, field: &str, spec: &str, value: &FieldValue, out: &mut String) -> Result<(), FormatError> {
        let body = self.body(field, spec, value)?;
        let len = body.chars().count();
        if len >= self.width {
            out.push_str(&body);
            return Ok(());
        }
        let pad = self.width - len;

        // Zero flag without explicit alignment pads numbers after the sign.
        if self.zero && self.align.is_none() && value.is_numeric() {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", body.as_str()),
            };
            out.push_str(sign);
            out.extend(std::iter::repeat_n('0', pad));
            out.push_str(digits);
            return Ok(());
        }

        let fill = if self.zero && self.align.is_none() { '0' } else { self.fill };
        let align = self.align.unwrap_or(if value.is_numeric() { Align::Right } else { Align::Left });
        let (left, right) = match align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };
        out.extend(std::iter::repeat_n(fill, left));
        out.push_str(&body);
        out.extend(std::iter::repeat_n(fill, right));
        Ok(())
    }
}

/// Floats without a format spec keep a trailing `.0` when they are whole.
fn float_repr(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        x.to_string()
    }
}

fn lookup<'a>(fields: &'a [(&str, FieldValue)], name: &str) -> Result<&'a FieldValue, FormatError> {
    fields
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .ok_or_else(|| FormatError::UnknownField(name.to_string()))
}

/// Render `template`, substituting placeholders from `fields`.
pub fn render(template: &str, fields: &[(&str, FieldValue)]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let start = pos + 1;
                let end = template[start..]
                    .find('}')
                    .map(|offset| start + offset)
                    .ok_or(FormatError::UnmatchedBrace(pos))?;
                while chars.next_if(|&(i, _)| i <= end).is_some() {}

                let placeholder = &template[start..end];
                let (name, spec) = placeholder.split_once(':').unwrap_or((placeholder, ""));
                let value = lookup(fields, name)?;
                FormatSpec::parse(name, spec)?.write(name, spec, value, &mut out)?;
            }
            '}' => {
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                    out.push('}');
                    continue;
                }
                return Err(FormatError::UnmatchedBrace(pos));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
