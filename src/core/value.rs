/*
 * A small tagged value type used by the configuration store. A `Value` holds
 * one of five payloads (null, bool, integer, string, string list) and round
 * trips through the line-oriented text format written by `ConfigFile`.
 *
 * Reads are deliberately permissive: asking for a payload the value does not
 * hold returns that payload's zero value (false, 0, "", empty list) instead
 * of an error. Callers that care about the actual payload check `kind()`
 * first; everything else can read without unwrapping at every step.
 */
use std::num::IntErrorKind;

/*
 * Errors produced by `Value::parse`. `InvalidData` covers any input that does
 * not match the textual grammar; `RangeError` is the special case of a numeric
 * token that overflows the integer payload.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    InvalidData,
    RangeError,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidData => write!(f, "invalid data"),
            ParseError::RangeError => write!(f, "value out of range"),
        }
    }
}

impl std::error::Error for ParseError {}

pub type Result<T> = std::result::Result<T, ParseError>;

/*
 * The tag of a `Value`, usable on its own when only the shape matters.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    String,
    StringList,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    StringList(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::String(_) => ValueKind::String,
            Value::StringList(_) => ValueKind::StringList,
        }
    }

    /*
     * Retags the value. Changing the tag discards the current payload and
     * installs the new tag's default payload; setting the tag the value
     * already has leaves the payload untouched.
     */
    pub fn set_kind(&mut self, kind: ValueKind) {
        if self.kind() == kind {
            return;
        }
        *self = match kind {
            ValueKind::Null => Value::Null,
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::Int(0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::StringList => Value::StringList(Vec::new()),
        };
    }

    // Permissive reads: a mismatched tag yields the payload's zero value.

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(value) => *value,
            _ => false,
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(value) => *value,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::String(value) => value.as_str(),
            _ => "",
        }
    }

    pub fn as_string_list(&self) -> &[String] {
        match self {
            Value::StringList(value) => value.as_slice(),
            _ => &[],
        }
    }

    /*
     * Renders the value in the configuration text grammar. Strings are
     * wrapped in double quotes with the interior verbatim; there is no
     * escaping, so a payload containing a quote or a newline corrupts the
     * format (a known limitation of the format itself).
     */
    pub fn serialize(&self) -> String {
        match self {
            Value::Null => String::from("null"),
            Value::Bool(value) => String::from(if *value { "true" } else { "false" }),
            Value::Int(value) => value.to_string(),
            Value::String(value) => format!("\"{value}\""),
            Value::StringList(list) => {
                let mut out = String::from("{");
                for (index, element) in list.iter().enumerate() {
                    out.push('"');
                    out.push_str(element);
                    out.push('"');
                    if index + 1 != list.len() {
                        out.push(',');
                    }
                }
                out.push('}');
                out
            }
        }
    }

    /*
     * Parses `input` into this value. Leading and trailing whitespace is
     * ignored. The literals `true`/`false` become Bool; a token wrapped in a
     * pair of double quotes becomes String (interior verbatim); a token
     * wrapped in braces becomes StringList, where every comma-separated
     * element must itself be quoted; anything else is attempted as an
     * integer.
     *
     * On failure the receiver keeps whatever state the attempt left behind:
     * a malformed list leaves an empty StringList (the tag is set before the
     * elements are validated), while a malformed scalar leaves the receiver
     * unmodified.
     */
    pub fn parse(&mut self, input: &str) -> Result<()> {
        let value = input.trim();

        if value == "true" {
            *self = Value::Bool(true);
            return Ok(());
        }
        if value == "false" {
            *self = Value::Bool(false);
            return Ok(());
        }

        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            *self = Value::String(value[1..value.len() - 1].to_string());
            return Ok(());
        }

        if value.len() >= 2 && value.starts_with('{') && value.ends_with('}') {
            *self = Value::StringList(Vec::new());
            let content = &value[1..value.len() - 1];
            if content.is_empty() {
                return Ok(());
            }
            let mut elements = Vec::new();
            for element in content.split(',') {
                if element.len() >= 2 && element.starts_with('"') && element.ends_with('"') {
                    elements.push(element[1..element.len() - 1].to_string());
                } else {
                    return Err(ParseError::InvalidData);
                }
            }
            *self = Value::StringList(elements);
            return Ok(());
        }

        match value.parse::<i64>() {
            Ok(parsed) => {
                *self = Value::Int(parsed);
                Ok(())
            }
            Err(error) => match error.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    Err(ParseError::RangeError)
                }
                _ => Err(ParseError::InvalidData),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StringList(value)
    }
}
