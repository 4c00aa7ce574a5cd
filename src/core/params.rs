use crate::core::schema;
use crate::domain::model::{ParamType, ParamValue, Parameter};
use crate::utils::error::{LaunchError, Result};
use std::collections::BTreeMap;

/// User-supplied parameter values, checked against the schema on insert.
///
/// A `None` entry means the user explicitly cleared the parameter: it wins
/// over the declared default and emits no flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<&'static str, Option<ParamValue>>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let param = schema::lookup(name)?;
        if !param.ty.accepts(&value) {
            return Err(LaunchError::InvalidConfigValueError {
                field: name.to_string(),
                value: value.to_arg(),
                reason: format!("expected a {} value", param.ty),
            });
        }
        self.values.insert(param.name, Some(value));
        Ok(())
    }

    /// Marks `name` as supplied without a value, so its default is not used.
    pub fn clear(&mut self, name: &str) -> Result<()> {
        let param = schema::lookup(name)?;
        self.values.insert(param.name, None);
        Ok(())
    }

    /// Parses `raw` according to the declared type of `name`. An empty value
    /// clears any parameter that is not a string.
    pub fn set_raw(&mut self, name: &str, raw: &str) -> Result<()> {
        let param = schema::lookup(name)?;
        if raw.trim().is_empty() && param.ty != ParamType::Str {
            return self.clear(name);
        }
        let value = parse_raw(param, raw)?;
        self.set(name, value)
    }

    /// Parses a `name=value` assignment as given on the command line.
    pub fn set_assignment(&mut self, assignment: &str) -> Result<()> {
        let (name, raw) =
            assignment
                .split_once('=')
                .ok_or_else(|| LaunchError::InvalidConfigValueError {
                    field: "--param".to_string(),
                    value: assignment.to_string(),
                    reason: "expected name=value".to_string(),
                })?;
        self.set_raw(name.trim(), raw)
    }

    pub fn set_json(&mut self, name: &str, value: &serde_json::Value) -> Result<()> {
        let param = schema::lookup(name)?;
        match from_json(param, value)? {
            Some(value) => self.set(name, value),
            None => self.clear(name),
        }
    }

    /// Loads every entry of a JSON object, e.g. the contents of `--params-file`.
    pub fn extend_json(&mut self, object: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        for (name, value) in object {
            self.set_json(name, value)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` was supplied at all, including explicit clears.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Effective value of every declared parameter in table order: whatever
    /// the user supplied (a clear included), else the declared default.
    pub fn resolve(&self) -> Result<Vec<(&'static Parameter, Option<ParamValue>)>> {
        let mut resolved = Vec::with_capacity(schema::parameters().len());
        for param in schema::parameters() {
            let value = match self.values.get(param.name) {
                Some(supplied) => supplied.clone(),
                None => param.default.clone(),
            };
            if param.required && value.is_none() {
                return Err(LaunchError::MissingConfigError {
                    field: format!("params.{}", param.name),
                });
            }
            if let Some(value) = &value {
                check_format(param, value)?;
            }
            resolved.push((param, value));
        }
        Ok(resolved)
    }

    /// Pipeline flags for every parameter with a value, in table order.
    pub fn to_flags(&self) -> Result<Vec<String>> {
        let mut flags = Vec::new();
        for (param, value) in self.resolve()? {
            flags.extend(flag_for(param.name, value.as_ref()));
        }
        Ok(flags)
    }
}

/// Flag tokens for one parameter. Absent values and `false` emit nothing,
/// `true` emits the bare flag, everything else emits the flag and its value.
pub fn flag_for(name: &str, value: Option<&ParamValue>) -> Vec<String> {
    let flag = format!("--{}", name);
    match value {
        None | Some(ParamValue::Bool(false)) => vec![],
        Some(ParamValue::Bool(true)) => vec![flag],
        Some(value) => vec![flag, value.to_arg()],
    }
}

fn invalid(param: &Parameter, value: &str, reason: impl Into<String>) -> LaunchError {
    LaunchError::InvalidConfigValueError {
        field: param.name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_raw(param: &Parameter, raw: &str) -> Result<ParamValue> {
    let trimmed = raw.trim();
    match param.ty {
        ParamType::File => non_empty(param, raw).map(|_| ParamValue::file(trimmed)),
        ParamType::Dir { .. } => non_empty(param, raw).map(|_| ParamValue::dir(trimmed)),
        ParamType::Str => Ok(ParamValue::str(raw)),
        ParamType::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ParamValue::Float)
            .ok_or_else(|| invalid(param, raw, "expected a number")),
        ParamType::Int => trimmed
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| invalid(param, raw, "expected an integer")),
        ParamType::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(ParamValue::Bool(true)),
            "false" | "no" | "0" => Ok(ParamValue::Bool(false)),
            _ => Err(invalid(param, raw, "expected true or false")),
        },
    }
}

fn non_empty(param: &Parameter, raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(invalid(param, raw, "path cannot be empty"));
    }
    Ok(())
}

fn from_json(param: &Parameter, value: &serde_json::Value) -> Result<Option<ParamValue>> {
    use serde_json::Value;

    let parsed = match (param.ty, value) {
        (_, Value::Null) => return Ok(None),
        (ParamType::Bool, Value::Bool(b)) => ParamValue::Bool(*b),
        (ParamType::Int, Value::Number(n)) => match n.as_i64() {
            Some(i) => ParamValue::Int(i),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    ParamValue::Int(f as i64)
                }
                _ => return Err(invalid(param, &n.to_string(), "expected an integer")),
            },
        },
        (ParamType::Float, Value::Number(n)) => match n.as_f64() {
            Some(f) => ParamValue::Float(f),
            None => return Err(invalid(param, &n.to_string(), "expected a number")),
        },
        // Numeric-looking strings such as segment lengths are often written unquoted.
        (ParamType::Str, Value::Number(n)) => ParamValue::str(n.to_string()),
        (_, Value::String(s)) => parse_raw(param, s)?,
        (_, other) => {
            return Err(invalid(
                param,
                &other.to_string(),
                format!("expected a {} value", param.ty),
            ))
        }
    };
    Ok(Some(parsed))
}

/// Sanity checks for string parameters whose syntax the pipeline documents.
/// Anything the pipeline's own tools could still parse is let through.
fn check_format(param: &Parameter, value: &ParamValue) -> Result<()> {
    let ParamValue::Str(text) = value else {
        return Ok(());
    };
    let items = || text.split(',').map(str::trim);
    let ok = match param.name {
        "smoothxg_poa_length" => items().all(|item| item.parse::<u64>().is_ok()),
        "smoothxg_poa_params" => {
            let preset = matches!(text.trim(), "asm5" | "asm10" | "asm15" | "asm20");
            preset || (items().count() == 6 && items().all(|item| item.parse::<i64>().is_ok()))
        }
        "wfmash_sparse_map" => {
            let text = text.trim();
            text == "auto" || text.parse::<f64>().map_or(false, f64::is_finite)
        }
        "vcf_spec" => items().all(|item| {
            let reference = item.split_once(':').map_or(item, |(reference, _)| reference);
            !reference.trim().is_empty()
        }),
        _ => true,
    };
    if !ok {
        return Err(invalid(
            param,
            text,
            format!("not a valid {} value", param.name),
        ));
    }
    Ok(())
}
