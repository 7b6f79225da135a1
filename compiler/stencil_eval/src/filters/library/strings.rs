//! Text filters. Non-string arguments use their display text.

use super::{count, not_supported, number};
use crate::errors::{argument_error, EvalResult};
use crate::filters::{FilterDef, ParamShape};
use crate::value::loose_equals;
use crate::Value;

pub(super) fn filters() -> Vec<FilterDef> {
    vec![
        text("upper", |s| s.to_uppercase()),
        text("lower", |s| s.to_lowercase()),
        text("trim", |s| s.trim().to_string()),
        FilterDef::value("substring", &[ParamShape::Str, ParamShape::Int], |args| {
            let start = count("substring", &args[1])?;
            Ok(Value::from(chars(&args[0]).skip(start).collect::<String>()))
        }),
        FilterDef::value(
            "substring",
            &[ParamShape::Str, ParamShape::Int, ParamShape::Int],
            |args| {
                let start = count("substring", &args[1])?;
                let len = count("substring", &args[2])?;
                Ok(Value::from(chars(&args[0]).skip(start).take(len).collect::<String>()))
            },
        ),
        FilterDef::any("replace", 3, |args| {
            let from = args[1].to_display_string();
            let to = args[2].to_display_string();
            let text = args[0].to_display_string();
            Ok(Value::from(if from.is_empty() { text } else { text.replace(&from, &to) }))
        }),
        FilterDef::any("contains", 2, |args| contains(&args[0], &args[1])),
        FilterDef::any("startsWith", 2, |args| {
            Ok(Value::Bool(args[0].to_display_string().starts_with(&args[1].to_display_string())))
        }),
        FilterDef::any("endsWith", 2, |args| {
            Ok(Value::Bool(args[0].to_display_string().ends_with(&args[1].to_display_string())))
        }),
        FilterDef::any("split", 1, |args| Ok(split(&args[0], ","))),
        FilterDef::any("split", 2, |args| Ok(split(&args[0], &args[1].to_display_string()))),
        FilterDef::any("format", 2, |args| format_value(&args[0], &args[1].to_display_string())),
        FilterDef::value("padLeft", &[ParamShape::Any, ParamShape::Int], |args| {
            pad("padLeft", &args[0], &args[1], ' ', true)
        }),
        FilterDef::value("padLeft", &[ParamShape::Any, ParamShape::Int, ParamShape::Str], |args| {
            pad("padLeft", &args[0], &args[1], pad_char(&args[2]), true)
        }),
        FilterDef::value("padRight", &[ParamShape::Any, ParamShape::Int], |args| {
            pad("padRight", &args[0], &args[1], ' ', false)
        }),
        FilterDef::value("padRight", &[ParamShape::Any, ParamShape::Int, ParamShape::Str], |args| {
            pad("padRight", &args[0], &args[1], pad_char(&args[2]), false)
        }),
        FilterDef::value("repeat", &[ParamShape::Any, ParamShape::Int], |args| {
            let n = count("repeat", &args[1])?;
            Ok(Value::from(args[0].to_display_string().repeat(n)))
        }),
        FilterDef::any("currency", 1, |args| currency(&args[0], "$")),
        FilterDef::any("currency", 2, |args| currency(&args[0], &args[1].to_display_string())),
        FilterDef::any("toString", 1, |args| Ok(Value::from(args[0].to_display_string()))),
        FilterDef::any("typeName", 1, |args| Ok(Value::from(args[0].type_name()))),
    ]
}

/// A one-argument string transform. Null and undefined pass through.
fn text(name: &str, f: fn(&str) -> String) -> FilterDef {
    FilterDef::any(name, 1, move |args| {
        Ok(match &args[0] {
            nullish if nullish.is_nullish() => nullish.clone(),
            other => Value::from(f(&other.to_display_string())),
        })
    })
}

fn chars(value: &Value) -> std::vec::IntoIter<char> {
    value.to_display_string().chars().collect::<Vec<_>>().into_iter()
}

fn contains(haystack: &Value, needle: &Value) -> EvalResult {
    Ok(Value::Bool(match haystack {
        Value::Str(s) | Value::Raw(s) => s.contains(needle.to_display_string().as_str()),
        Value::List(items) => items.read().iter().any(|item| loose_equals(item, needle)),
        Value::Object(map) => map.read().contains_key(&needle.to_display_string()),
        Value::Undefined | Value::Null => false,
        Value::Host(host) => match host.items() {
            Some(items) => items.iter().any(|item| loose_equals(item, needle)),
            None => return Err(not_supported("contains", haystack)),
        },
        other => return Err(not_supported("contains", other)),
    }))
}

fn split(value: &Value, separator: &str) -> Value {
    let text = value.to_display_string();
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::from(c.to_string())).collect()
    } else {
        text.split(separator).map(Value::from).collect()
    };
    Value::list(parts)
}

fn pad_char(value: &Value) -> char {
    value.to_display_string().chars().next().unwrap_or(' ')
}

fn pad(filter: &str, value: &Value, width: &Value, fill: char, left: bool) -> EvalResult {
    let width = count(filter, width)?;
    let text = value.to_display_string();
    let len = text.chars().count();
    if len >= width {
        return Ok(Value::from(text));
    }
    let padding: String = std::iter::repeat(fill).take(width - len).collect();
    Ok(Value::from(if left {
        padding + &text
    } else {
        text + &padding
    }))
}

/// `{0}` is replaced by the value; `{0:N2}` / `{0:F2}` format it as a
/// number with two decimals (`N` adds thousands separators).
fn format_value(value: &Value, pattern: &str) -> EvalResult {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find("{0") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(argument_error("format", format_args!("unterminated placeholder in '{pattern}'")));
        };
        let spec = &after[..end];
        match spec.strip_prefix(':') {
            None if spec.is_empty() => out.push_str(&value.to_display_string()),
            Some(spec) => out.push_str(&numeric_format(value, spec)?),
            None => return Err(argument_error("format", format_args!("invalid placeholder '{{0{spec}}}'"))),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(Value::from(out))
}

fn numeric_format(value: &Value, spec: &str) -> EvalResult<String> {
    let mut chars = spec.chars();
    let kind = chars.next().map(|c| c.to_ascii_uppercase());
    let digits = chars.as_str().parse::<usize>().unwrap_or(2);
    let n = number("format", value)?.to_f64().unwrap_or(f64::NAN);
    match kind {
        Some('F') => Ok(format!("{n:.digits$}")),
        Some('N') => Ok(group_thousands(&format!("{n:.digits$}"))),
        Some('C') => Ok(format!("${}", group_thousands(&format!("{n:.digits$}")))),
        _ => Err(argument_error("format", format_args!("unsupported format '{spec}'"))),
    }
}

/// Insert `,` between thousands of a formatted decimal number.
fn group_thousands(formatted: &str) -> String {
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let mut out = format!("{sign}{grouped}");
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn currency(value: &Value, symbol: &str) -> EvalResult {
    let n = number("currency", value)?.to_f64().unwrap_or(f64::NAN);
    let grouped = group_thousands(&format!("{:.2}", n.abs()));
    Ok(Value::from(if n < 0.0 {
        format!("-{symbol}{grouped}")
    } else {
        format!("{symbol}{grouped}")
    }))
}
