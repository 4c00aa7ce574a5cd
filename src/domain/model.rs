use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Semantic type of a pipeline parameter, as shown to the registration UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamType {
    File,
    Dir { output: bool },
    Float,
    Int,
    Bool,
    Str,
}

impl ParamType {
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::File => "file",
            ParamType::Dir { .. } => "dir",
            ParamType::Float => "float",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
            ParamType::Str => "str",
        }
    }

    /// Whether `value` is an instance of this type.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        matches!(
            (self, value),
            (ParamType::File, ParamValue::File(_))
                | (ParamType::Dir { .. }, ParamValue::Dir(_))
                | (ParamType::Float, ParamValue::Float(_))
                | (ParamType::Int, ParamValue::Int(_))
                | (ParamType::Bool, ParamValue::Bool(_))
                | (ParamType::Str, ParamValue::Str(_))
        )
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete parameter value. Files and directories hold a remote
/// (`latch:///`, `s3://`) or local path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    File(Cow<'static, str>),
    Dir(Cow<'static, str>),
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(Cow<'static, str>),
}

impl ParamValue {
    pub fn str(value: impl Into<String>) -> Self {
        ParamValue::Str(Cow::Owned(value.into()))
    }

    pub fn file(path: impl Into<String>) -> Self {
        ParamValue::File(Cow::Owned(path.into()))
    }

    pub fn dir(path: impl Into<String>) -> Self {
        ParamValue::Dir(Cow::Owned(path.into()))
    }

    /// Text passed to the pipeline after the flag. Floats always keep a
    /// decimal point or exponent so `90.0` is not rendered as `90`.
    pub fn to_arg(&self) -> String {
        match self {
            ParamValue::File(s) | ParamValue::Dir(s) | ParamValue::Str(s) => s.to_string(),
            ParamValue::Float(v) => format!("{:?}", v),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Bool(v) => v.to_string(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_arg())
    }
}

/// Registration metadata for one pipeline parameter.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: &'static str,
    #[serde(flatten)]
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<ParamValue>,
    pub section_title: Option<&'static str>,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_args_keep_decimal_point() {
        assert_eq!(ParamValue::Float(90.0).to_arg(), "90.0");
        assert_eq!(ParamValue::Float(0.001).to_arg(), "0.001");
        assert_eq!(ParamValue::Float(0.0).to_arg(), "0.0");
        assert_eq!(ParamValue::Int(19).to_arg(), "19");
    }

    #[test]
    fn test_accepts_matching_variant_only() {
        assert!(ParamType::Float.accepts(&ParamValue::Float(1.5)));
        assert!(!ParamType::Float.accepts(&ParamValue::Int(1)));
        assert!(ParamType::Dir { output: true }.accepts(&ParamValue::dir("latch:///out")));
        assert!(!ParamType::File.accepts(&ParamValue::dir("latch:///out")));
    }

    #[test]
    fn test_parameter_serializes_flat_type_tag() {
        let param = Parameter {
            name: "outdir",
            ty: ParamType::Dir { output: true },
            required: true,
            default: None,
            section_title: None,
            description: "Output directory.",
        };
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["type"], "dir");
        assert_eq!(json["output"], true);
        assert!(json["default"].is_null());
    }
}
