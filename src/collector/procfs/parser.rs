//! Parser for `/proc/modules`.
//!
//! Pure functions that turn the content of `/proc/modules` into a
//! [`ModuleTable`]. They work on strings and any `BufRead`, so they are easy to
//! test without a real `/proc`.
//!
//! Line format:
//!
//! ```text
//! <name> <mem> <instances> <deps|-> <state> <offset> [<taints>]
//! nvidia 56807424 1234 nvidia_modeset,nvidia_uvm, Live 0xffffffffc1a00000 (POE)
//! ```

use crate::model::{ModuleInfo, ModuleState, ModuleTable, Taint, TaintFlags};
use std::io::BufRead;
use std::num::ParseIntError;
use tracing::{debug, trace};

const MIN_FIELDS_PER_LINE: usize = 6;
const MAX_FIELDS_PER_LINE: usize = 7;
const NO_DEPS: &str = "-";
const DEPS_DELIM: char = ',';
const HEX_PREFIX: &str = "0x";

/// Decoding failure of a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Not a valid unsigned 64-bit number.
    InvalidNumber {
        value: String,
        source: ParseIntError,
    },
    /// State token outside the known vocabulary.
    UnknownState(String),
    /// Taint character outside the known vocabulary.
    UnknownTaint(char),
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::InvalidNumber { value, source } => write!(f, "{:?}: {}", value, source),
            FieldError::UnknownState(token) => write!(f, "{:?}", token),
            FieldError::UnknownTaint(c) => write!(f, "{:?}", c),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::InvalidNumber { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Field of a `/proc/modules` line that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mem,
    Instances,
    State,
    Offset,
    Taints,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Field::Mem => "invalid mem (field 2)",
            Field::Instances => "invalid instances (field 3)",
            Field::State => "unknown state (field 5)",
            Field::Offset => "invalid offset (field 6)",
            Field::Taints => "unknown tainted (field 7)",
        };
        f.write_str(label)
    }
}

/// Error for a single `/proc/modules` line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Line does not split into 6 or 7 fields. Holds the raw line.
    InvalidLine(String),
    /// A field failed to decode.
    InvalidField { field: Field, source: FieldError },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidLine(line) => write!(f, "invalid input line {:?}", line),
            ParseError::InvalidField { field, source } => write!(f, "{}: {}", field, source),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidLine(_) => None,
            ParseError::InvalidField { source, .. } => Some(source),
        }
    }
}

/// Error while scanning a whole `/proc/modules` stream.
#[derive(Debug)]
pub enum ScanError {
    /// The reader failed mid-stream.
    Io(std::io::Error),
    /// Line `line` (1-based) is malformed.
    Parse { line: usize, source: ParseError },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "read error: {}", e),
            ScanError::Parse { line, source } => write!(f, "line {}: {}", line, source),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Io(e) => Some(e),
            ScanError::Parse { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        ScanError::Io(e)
    }
}

/// Parses an unsigned number, hexadecimal when prefixed with `0x`.
///
/// Only digits are accepted after the optional prefix; a sign is an invalid
/// digit.
pub fn parse_uint(value: &str) -> Result<u64, FieldError> {
    let (digits, radix) = match value.strip_prefix(HEX_PREFIX) {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };
    // from_str_radix takes a leading '+'; parsing the bare sign yields InvalidDigit
    let digits = match digits.strip_prefix('+') {
        Some(_) => &digits[..1],
        None => digits,
    };
    u64::from_str_radix(digits, radix).map_err(|source| FieldError::InvalidNumber {
        value: value.to_string(),
        source,
    })
}

/// Splits the dependency field. `-` yields an empty list; one trailing comma
/// is dropped before splitting.
pub fn split_deps(value: &str) -> Vec<String> {
    if value == NO_DEPS {
        return Vec::new();
    }
    let value = value.strip_suffix(DEPS_DELIM).unwrap_or(value);
    value.split(DEPS_DELIM).map(str::to_string).collect()
}

pub fn parse_state(value: &str) -> Result<ModuleState, FieldError> {
    ModuleState::from_token(value).ok_or_else(|| FieldError::UnknownState(value.to_string()))
}

/// Parses the taint field, e.g. `(POE)`.
///
/// Parentheses are optional. The `+`/`-` markers the kernel adds while a
/// module is loading or unloading are skipped.
pub fn parse_taints(value: &str) -> Result<TaintFlags, FieldError> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(value);

    let mut flags = TaintFlags::empty();
    for c in inner.chars() {
        if c == '+' || c == '-' {
            continue;
        }
        let taint = Taint::from_char(c).ok_or(FieldError::UnknownTaint(c))?;
        flags.insert(taint);
    }
    Ok(flags)
}

fn field_err(field: Field) -> impl Fn(FieldError) -> ParseError {
    move |source| ParseError::InvalidField { field, source }
}

/// Decodes the fields of one line, already split on whitespace.
///
/// Expects 6 or 7 fields. Stops at the first field that fails.
pub fn parse_fields(fields: &[&str]) -> Result<ModuleInfo, ParseError> {
    if !(MIN_FIELDS_PER_LINE..=MAX_FIELDS_PER_LINE).contains(&fields.len()) {
        return Err(ParseError::InvalidLine(fields.join(" ")));
    }

    let mem = parse_uint(fields[1]).map_err(field_err(Field::Mem))?;
    let instances = parse_uint(fields[2]).map_err(field_err(Field::Instances))?;
    let depends = split_deps(fields[3]);
    let state = parse_state(fields[4]).map_err(field_err(Field::State))?;
    let offset = parse_uint(fields[5]).map_err(field_err(Field::Offset))?;
    let taints = match fields.get(6) {
        Some(value) => Some(parse_taints(value).map_err(field_err(Field::Taints))?),
        None => None,
    };

    Ok(ModuleInfo {
        name: fields[0].to_string(),
        mem,
        instances,
        depends,
        state,
        offset,
        taints,
    })
}

/// Parses one raw `/proc/modules` line.
pub fn parse_line(line: &str) -> Result<ModuleInfo, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS_PER_LINE || fields.len() > MAX_FIELDS_PER_LINE {
        return Err(ParseError::InvalidLine(line.to_string()));
    }
    parse_fields(&fields)
}

/// Parses a `/proc/modules` stream into a table.
///
/// Any malformed line or read error aborts the scan; no partial table is
/// returned. Duplicate names keep the last line.
pub fn parse_proc_modules<R: BufRead>(mut reader: R) -> Result<ModuleTable, ScanError> {
    let mut modules = ModuleTable::new();
    let mut buf = Vec::new();
    let mut line_no: usize = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        trace!(line = line_no, "parsing module line");

        // Bytes that are not UTF-8 are replaced, not treated as read errors.
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches('\n').trim_end_matches('\r');

        let info = parse_line(line).map_err(|source| ScanError::Parse {
            line: line_no,
            source,
        })?;

        if let Some(previous) = modules.insert(info.name.clone(), info) {
            debug!(module = %previous.name, "duplicate module entry, keeping the later line");
        }
    }

    Ok(modules)
}

/// Parses `/proc/modules` content held in memory.
pub fn parse_proc_modules_str(content: &str) -> Result<ModuleTable, ScanError> {
    parse_proc_modules(content.as_bytes())
}
