//! Scalar type table.
//!
//! Maps native Rust scalar types to Swagger `type`/`format` pairs and provides the value
//! coercion used when example values are mined from documentation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Scalar kinds understood by the schema projector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Decimal,
    Date,
    DateTime,
    Time,
    Uuid,
    /// Uploaded file content (multipart form part)
    File,
    /// Anything without a more specific mapping; rendered as an opaque object
    Object,
}

impl ScalarKind {
    /// Look up the built-in scalar kind for a type's simple name
    pub fn from_type_name(name: &str) -> Option<ScalarKind> {
        let kind = match name {
            "String" | "str" => ScalarKind::String,
            "char" => ScalarKind::Char,
            "bool" => ScalarKind::Bool,
            "i8" => ScalarKind::I8,
            "i16" => ScalarKind::I16,
            "i32" => ScalarKind::I32,
            "i64" => ScalarKind::I64,
            "i128" => ScalarKind::I128,
            "isize" => ScalarKind::Isize,
            "u8" => ScalarKind::U8,
            "u16" => ScalarKind::U16,
            "u32" => ScalarKind::U32,
            "u64" => ScalarKind::U64,
            "u128" => ScalarKind::U128,
            "usize" => ScalarKind::Usize,
            "f32" => ScalarKind::F32,
            "f64" => ScalarKind::F64,
            "Decimal" | "BigDecimal" => ScalarKind::Decimal,
            "NaiveDate" | "Date" => ScalarKind::Date,
            "NaiveDateTime" | "DateTime" | "OffsetDateTime" | "PrimitiveDateTime"
            | "SystemTime" => ScalarKind::DateTime,
            "NaiveTime" | "Time" => ScalarKind::Time,
            "Uuid" => ScalarKind::Uuid,
            "File" | "FilePart" | "TempFile" | "MultipartFile" | "UploadedFile" => ScalarKind::File,
            "Value" | "JsonValue" | "Object" => ScalarKind::Object,
            _ => return None,
        };
        Some(kind)
    }

    /// The Swagger `type` and optional `format` for this kind
    pub fn type_and_format(self) -> (&'static str, Option<&'static str>) {
        match self {
            ScalarKind::String | ScalarKind::Char => ("string", None),
            ScalarKind::Bool => ("boolean", None),
            ScalarKind::I8
            | ScalarKind::I16
            | ScalarKind::I32
            | ScalarKind::U8
            | ScalarKind::U16
            | ScalarKind::U32 => ("integer", Some("int32")),
            ScalarKind::I64
            | ScalarKind::I128
            | ScalarKind::Isize
            | ScalarKind::U64
            | ScalarKind::U128
            | ScalarKind::Usize => ("integer", Some("int64")),
            ScalarKind::F32 => ("number", Some("float")),
            ScalarKind::F64 => ("number", Some("double")),
            ScalarKind::Decimal => ("number", None),
            ScalarKind::Date => ("string", Some("date")),
            ScalarKind::DateTime => ("string", Some("date-time")),
            ScalarKind::Time => ("string", Some("time")),
            ScalarKind::Uuid => ("string", Some("uuid")),
            ScalarKind::File => ("file", None),
            ScalarKind::Object => ("object", None),
        }
    }

    /// Whether a value of this kind can be written down as a literal in documentation
    pub fn has_literal_form(self) -> bool {
        !matches!(self, ScalarKind::File | ScalarKind::Object)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ScalarKind::Date | ScalarKind::DateTime | ScalarKind::Time)
    }

    /// Human-readable label used in diagnostics
    pub fn label(self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Char => "char",
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::I128 => "i128",
            ScalarKind::Isize => "isize",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::U128 => "u128",
            ScalarKind::Usize => "usize",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "date-time",
            ScalarKind::Time => "time",
            ScalarKind::Uuid => "uuid",
            ScalarKind::File => "file",
            ScalarKind::Object => "object",
        }
    }
}

/// Date and time patterns (chrono `strftime` syntax) used to validate mined examples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingPolicy {
    pub date_pattern: String,
    pub date_time_pattern: String,
    pub time_pattern: String,
}

impl Default for FormattingPolicy {
    fn default() -> Self {
        Self {
            date_pattern: "%Y-%m-%d".to_string(),
            date_time_pattern: "%Y-%m-%d %H:%M:%S".to_string(),
            time_pattern: "%H:%M:%S".to_string(),
        }
    }
}

/// Scalar lookup table with project-specific aliases and a formatting policy
#[derive(Debug, Clone, Default)]
pub struct ScalarTable {
    policy: FormattingPolicy,
    aliases: HashMap<String, ScalarKind>,
}

impl ScalarTable {
    pub fn new(policy: FormattingPolicy) -> Self {
        Self {
            policy,
            aliases: HashMap::new(),
        }
    }

    /// Register an extra type name, e.g. a project newtype that serializes as a string
    pub fn with_alias(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.aliases.insert(name.into(), kind);
        self
    }

    pub fn policy(&self) -> &FormattingPolicy {
        &self.policy
    }

    /// Resolve a type's simple name, aliases first
    pub fn lookup(&self, name: &str) -> Option<ScalarKind> {
        self.aliases
            .get(name)
            .copied()
            .or_else(|| ScalarKind::from_type_name(name))
    }

    /// Coerce a raw literal into a JSON value of the given kind.
    ///
    /// `pattern` overrides the policy's date/time pattern for the property at hand.
    /// The error string describes why the literal was rejected.
    pub fn coerce(
        &self,
        kind: ScalarKind,
        raw: &str,
        pattern: Option<&str>,
    ) -> std::result::Result<Value, String> {
        debug!("Coercing {:?} as {}", raw, kind.label());
        match kind {
            ScalarKind::String | ScalarKind::Uuid => Ok(Value::String(raw.to_string())),
            ScalarKind::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::String(c.to_string())),
                    _ => Err("expected exactly one character".to_string()),
                }
            }
            ScalarKind::Bool => match raw {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err("expected `true` or `false`".to_string()),
            },
            ScalarKind::I8 => parse_signed::<i8>(raw),
            ScalarKind::I16 => parse_signed::<i16>(raw),
            ScalarKind::I32 => parse_signed::<i32>(raw),
            ScalarKind::I64 | ScalarKind::Isize => parse_signed::<i64>(raw),
            ScalarKind::U8 => parse_unsigned::<u8>(raw),
            ScalarKind::U16 => parse_unsigned::<u16>(raw),
            ScalarKind::U32 => parse_unsigned::<u32>(raw),
            ScalarKind::U64 | ScalarKind::Usize => parse_unsigned::<u64>(raw),
            ScalarKind::I128 => raw
                .parse::<i128>()
                .map(|v| match i64::try_from(v) {
                    Ok(small) => Value::Number(small.into()),
                    Err(_) => Value::String(v.to_string()),
                })
                .map_err(|e| e.to_string()),
            ScalarKind::U128 => raw
                .parse::<u128>()
                .map(|v| match u64::try_from(v) {
                    Ok(small) => Value::Number(small.into()),
                    Err(_) => Value::String(v.to_string()),
                })
                .map_err(|e| e.to_string()),
            ScalarKind::F32 | ScalarKind::F64 | ScalarKind::Decimal => {
                let parsed = raw.parse::<f64>().map_err(|e| e.to_string())?;
                Number::from_f64(parsed)
                    .map(Value::Number)
                    .ok_or_else(|| "not a finite number".to_string())
            }
            ScalarKind::Date => {
                let pattern = pattern.unwrap_or(&self.policy.date_pattern);
                NaiveDate::parse_from_str(raw, pattern)
                    .map(|_| Value::String(raw.to_string()))
                    .map_err(|e| format!("{} (pattern `{}`)", e, pattern))
            }
            ScalarKind::DateTime => {
                let pattern = pattern.unwrap_or(&self.policy.date_time_pattern);
                if NaiveDateTime::parse_from_str(raw, pattern).is_ok()
                    || DateTime::parse_from_rfc3339(raw).is_ok()
                {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(format!("not a date-time matching `{}` or RFC 3339", pattern))
                }
            }
            ScalarKind::Time => {
                let pattern = pattern.unwrap_or(&self.policy.time_pattern);
                NaiveTime::parse_from_str(raw, pattern)
                    .map(|_| Value::String(raw.to_string()))
                    .map_err(|e| format!("{} (pattern `{}`)", e, pattern))
            }
            ScalarKind::File | ScalarKind::Object => {
                Err(format!("{} values have no literal form", kind.label()))
            }
        }
    }
}

fn parse_signed<T>(raw: &str) -> std::result::Result<Value, String>
where
    T: std::str::FromStr + Into<i64>,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map(|v| {
            let wide: i64 = v.into();
            Value::Number(wide.into())
        })
        .map_err(|e| e.to_string())
}

fn parse_unsigned<T>(raw: &str) -> std::result::Result<Value, String>
where
    T: std::str::FromStr + Into<u64>,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map(|v| {
            let wide: u64 = v.into();
            Value::Number(wide.into())
        })
        .map_err(|e| e.to_string())
}
