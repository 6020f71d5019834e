//! Brace-placeholder templating into [`EncodedString`].
//!
//! Supported placeholders:
//!
//! - `{}` takes the next sequential argument;
//! - `{N}` takes argument `N` without advancing the sequence;
//! - `{N:spec}` / `{:spec}` as above with a format spec. A spec containing
//!   `.P` (such as `.2` or `3.5f`) sets the precision for floating
//!   arguments; any other spec text is accepted and ignored.
//!
//! Placeholders do not nest and there is no brace escaping. Arguments left
//! over after substitution are ignored.

use smallvec::SmallVec;

use crate::error::FormatError;
use crate::string::EncodedString;

/// Precision used for floating arguments without an explicit spec.
pub const DEFAULT_PRECISION: usize = 6;

/// One substitutable value.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatArgument {
    /// Signed integer.
    Decimal(i64),
    /// Unsigned integer.
    Unsigned(u64),
    /// Floating point, printed with fixed precision.
    Double(f64),
    /// Text, inserted verbatim.
    Text(EncodedString),
}

impl FormatArgument {
    /// Render the argument. `precision` only affects [`Double`](Self::Double).
    pub fn to_encoded(&self, precision: Option<usize>) -> EncodedString {
        let text = match self {
            Self::Decimal(v) => v.to_string(),
            Self::Unsigned(v) => v.to_string(),
            Self::Double(v) => format!("{v:.*}", precision.unwrap_or(DEFAULT_PRECISION)),
            Self::Text(s) => return s.clone(),
        };
        EncodedString::from(text.as_str())
    }

    fn append_to(&self, out: &mut EncodedString, precision: Option<usize>) {
        match self {
            Self::Text(s) => out.append_string(s),
            other => out.append_string(&other.to_encoded(precision)),
        }
    }
}

macro_rules! impl_from_argument {
    ($variant:ident($target:ty): $($t:ty),*) => {
        $(
            impl From<$t> for FormatArgument {
                fn from(v: $t) -> Self {
                    Self::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from_argument!(Decimal(i64): i8, i16, i32, i64, isize);
impl_from_argument!(Unsigned(u64): u8, u16, u32, u64, usize);
impl_from_argument!(Double(f64): f32, f64);

impl From<&str> for FormatArgument {
    fn from(v: &str) -> Self {
        Self::Text(EncodedString::from(v))
    }
}

impl From<&String> for FormatArgument {
    fn from(v: &String) -> Self {
        Self::Text(EncodedString::from(v))
    }
}

impl From<EncodedString> for FormatArgument {
    fn from(v: EncodedString) -> Self {
        Self::Text(v)
    }
}

impl From<&EncodedString> for FormatArgument {
    fn from(v: &EncodedString) -> Self {
        Self::Text(v.clone())
    }
}

/// A parsed `{...}` span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placeholder {
    /// Byte offset of `{`.
    start: usize,
    /// Byte offset just past `}`.
    end: usize,
    index: Option<usize>,
    precision: Option<usize>,
}

fn parse_precision(spec: &str) -> Option<usize> {
    let (_, after_dot) = spec.split_once('.')?;
    let digits = after_dot
        .find(|c: char| !c.is_ascii_digit())
        .map_or(after_dot, |end| &after_dot[..end]);
    digits.parse().ok()
}

fn parse_placeholder(start: usize, end: usize, body: &str) -> Placeholder {
    let (index_text, spec) = match body.split_once(':') {
        Some((index, spec)) => (index, Some(spec)),
        None => (body, None),
    };
    let index_text = index_text.trim();
    Placeholder {
        start,
        end,
        index: if index_text.is_empty() {
            None
        } else {
            index_text.parse().ok()
        },
        precision: spec.and_then(parse_precision),
    }
}

/// Locate every placeholder, validating brace balance.
fn scan(fmt: &str) -> Result<SmallVec<[Placeholder; 8]>, FormatError> {
    let mut placeholders = SmallVec::new();
    let mut open: Option<usize> = None;
    for (offset, c) in fmt.char_indices() {
        match (c, open) {
            ('{', None) => open = Some(offset),
            ('{', Some(_)) | ('}', None) => {
                return Err(FormatError::UnbalancedBraces { offset });
            }
            ('}', Some(start)) => {
                placeholders.push(parse_placeholder(start, offset + 1, &fmt[start + 1..offset]));
                open = None;
            }
            _ => {}
        }
    }
    match open {
        Some(offset) => Err(FormatError::UnbalancedBraces { offset }),
        None => Ok(placeholders),
    }
}

/// Substitute `args` into `fmt`.
pub fn try_format(fmt: &str, args: &[FormatArgument]) -> Result<EncodedString, FormatError> {
    let placeholders = scan(fmt)?;
    let mut out = EncodedString::new();
    let mut cursor = 0;
    let mut next = 0;
    for (position, p) in placeholders.iter().enumerate() {
        let arg = match p.index {
            Some(index) => args.get(index).ok_or(FormatError::ArgumentIndexOutOfRange {
                index,
                count: args.len(),
            })?,
            None => {
                let arg = args
                    .get(next)
                    .ok_or(FormatError::MissingArgument { position })?;
                next += 1;
                arg
            }
        };
        out.append_utf8(fmt[cursor..p.start].as_bytes());
        arg.append_to(&mut out, p.precision);
        cursor = p.end;
    }
    out.append_utf8(fmt[cursor..].as_bytes());
    Ok(out)
}

/// Substitute `args` into `fmt`.
///
/// # Panics
///
/// Panics if the template is malformed or refers to a missing argument;
/// templates are programmer-written literals.
pub fn format(fmt: &str, args: &[FormatArgument]) -> EncodedString {
    match try_format(fmt, args) {
        Ok(s) => s,
        Err(e) => panic!("invalid format template {fmt:?}: {e}"),
    }
}

/// Format into an [`EncodedString`], converting each argument with
/// [`FormatArgument::from`].
///
/// ```
/// let s = anvil_text::format_string!("Hello {}, you are {} years old.", "Ann", 30);
/// assert_eq!(s, "Hello Ann, you are 30 years old.");
/// ```
#[macro_export]
macro_rules! format_string {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::format::format(
            $fmt,
            &[$($crate::format::FormatArgument::from($arg)),*],
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sequential_arguments() {
        let s = format("Hello {}, you are {} years old.", &["Ann".into(), 30.into()]);
        assert_eq!(s, "Hello Ann, you are 30 years old.");
    }

    #[test]
    fn positional_arguments_do_not_advance() {
        let s = format_string!("{1} {} {0} {}", "a", "b");
        assert_eq!(s, "b a a b");
    }

    #[test]
    fn float_precision_from_spec() {
        let s = format_string!("{:3.2f} kg, {:.1}, {}", 71.3542f32, 2.26, 0.5);
        assert_eq!(s, "71.35 kg, 2.3, 0.500000");
    }

    #[test]
    fn other_specs_are_ignored() {
        let s = format_string!("vulgo {0:s4}", "Udia");
        assert_eq!(s, "vulgo Udia");
    }

    #[test]
    fn integers_of_every_kind() {
        let s = format_string!("{} {} {}", -7i8, u64::MAX, 42usize);
        assert_eq!(s, "-7 18446744073709551615 42");
    }

    #[test]
    fn template_without_placeholders_is_copied() {
        assert_eq!(format_string!("plain text"), "plain text");
        assert!(format_string!("").is_empty());
    }

    #[test]
    fn non_ascii_literals_and_arguments() {
        let city = EncodedString::from("Uberlândia");
        let s = format_string!("Eu sou de {}, gosto de {}.", &city, "maçãs");
        assert_eq!(s, "Eu sou de Uberlândia, gosto de maçãs.");
    }

    #[test]
    fn unbalanced_braces_are_rejected() {
        assert_eq!(
            try_format("oops {", &[]),
            Err(FormatError::UnbalancedBraces { offset: 5 })
        );
        assert_eq!(
            try_format("oops }", &[]),
            Err(FormatError::UnbalancedBraces { offset: 5 })
        );
        assert_eq!(
            try_format("{{}}", &[]),
            Err(FormatError::UnbalancedBraces { offset: 1 })
        );
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert_eq!(
            try_format("{} {}", &[1.into()]),
            Err(FormatError::MissingArgument { position: 1 })
        );
        assert_eq!(
            try_format("{3}", &[1.into()]),
            Err(FormatError::ArgumentIndexOutOfRange { index: 3, count: 1 })
        );
    }

    #[test]
    #[should_panic(expected = "unbalanced braces")]
    fn format_panics_on_bad_template() {
        format("{", &[]);
    }

    #[test]
    fn arguments_render_directly() {
        assert_eq!(FormatArgument::from(-12i32).to_encoded(None), "-12");
        assert_eq!(FormatArgument::from(7u8).to_encoded(Some(3)), "7");
        assert_eq!(FormatArgument::from(0.126).to_encoded(Some(2)), "0.13");
        assert_eq!(FormatArgument::from(1.5f32).to_encoded(None), "1.500000");
        assert_eq!(FormatArgument::from("tea").to_encoded(Some(1)), "tea");
    }

    #[test]
    fn precision_parsing() {
        assert_eq!(parse_precision("3.5f"), Some(5));
        assert_eq!(parse_precision(".2"), Some(2));
        assert_eq!(parse_precision("s4"), None);
        assert_eq!(parse_precision("8."), None);
    }

    proptest! {
        #[test]
        fn brace_free_templates_are_identity(text in "[^{}\u{0}\u{10000}-\u{10FFFF}]{0,40}") {
            prop_assert_eq!(format(&text, &[]).to_string_lossy(), text);
        }

        #[test]
        fn sequential_integers(values in prop::collection::vec(any::<i32>(), 1..6)) {
            let template = vec!["{}"; values.len()].join(",");
            let args: Vec<FormatArgument> = values.iter().map(|&v| v.into()).collect();
            let expected = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
            prop_assert_eq!(format(&template, &args).to_string_lossy(), expected);
        }
    }
}
