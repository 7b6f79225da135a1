//! Throwing, inspecting and rendering errors.
//!
//! The inspection filters read the render's last captured error and still
//! run after an error switched the page to skipping filters.

use crate::errors::{thrown, EvalError, EvalResult};
use crate::filters::{FilterCx, FilterDef, FilterFlags, ParamShape};
use crate::interpreter::error_object;
use crate::pending::Outcome;
use crate::Value;

const DEFAULT_ERROR_CLASS: &str = "alert alert-danger";

pub(super) fn filters() -> Vec<FilterDef> {
    let mut defs = throwing();
    defs.extend(inspection());
    defs.extend(rendering());
    defs.extend(directives());
    defs
}

fn throwing() -> Vec<FilterDef> {
    let throws = FilterFlags::THROWS | FilterFlags::NO_OUTPUT;
    let mut defs = Vec::new();
    for (name, type_name) in [
        ("throw", "Exception"),
        ("throwArgumentException", "ArgumentException"),
        ("throwNotSupportedException", "NotSupportedException"),
        ("throwArgumentNullException", "ArgumentNullException"),
    ] {
        let raise = move |args: &[Value]| -> EvalResult<Outcome> {
            let text = args[0].to_display_string();
            let message = if type_name == "ArgumentNullException" {
                format!("Value cannot be null. (Parameter '{text}')")
            } else {
                text
            };
            Err(thrown(type_name, message))
        };
        for arity in 1..=2 {
            defs.push(
                FilterDef::new(name, &vec![ParamShape::Any; arity], move |_, args| raise(args))
                    .flags(throws),
            );
        }
    }
    defs.push(
        FilterDef::new("throwIf", &[ParamShape::Any; 2], |_, args| {
            throw_when(&args[0], &args[1])
        })
        .flags(throws),
    );
    defs.push(
        FilterDef::new("ifThrow", &[ParamShape::Any; 2], |_, args| {
            throw_when(&args[1], &args[0])
        })
        .flags(throws),
    );
    defs
}

fn throw_when(message: &Value, test: &Value) -> EvalResult<Outcome> {
    if test.is_true() {
        Err(thrown("Exception", message.to_display_string()))
    } else {
        Ok(Outcome::IGNORE)
    }
}

fn last_error(cx: &mut FilterCx<'_>) -> Option<EvalError> {
    cx.interpreter().state().last_error.clone()
}

fn if_error(cx: &mut FilterCx<'_>, _: &[Value]) -> EvalResult<Outcome> {
    Ok(match last_error(cx) {
        Some(err) => error_object(&err).into(),
        None => Outcome::STOP,
    })
}

fn if_no_error(cx: &mut FilterCx<'_>, _: &[Value]) -> EvalResult<Outcome> {
    Ok(if last_error(cx).is_some() {
        Outcome::STOP
    } else {
        Outcome::IGNORE
    })
}

fn inspection() -> Vec<FilterDef> {
    let skipping = FilterFlags::EVAL_WHEN_SKIPPING;
    vec![
        FilterDef::new("ifError", &[], if_error).flags(skipping),
        FilterDef::new("ifError", &[ParamShape::Any], if_error).flags(skipping),
        FilterDef::new("ifNoError", &[], if_no_error).flags(skipping),
        FilterDef::new("ifNoError", &[ParamShape::Any], if_no_error).flags(skipping),
        FilterDef::new("lastError", &[], |cx, _| {
            Ok(last_error(cx).map_or(Value::Null, |err| error_object(&err)).into())
        })
        .flags(skipping),
        FilterDef::new("lastErrorMessage", &[], |cx, _| {
            Ok(last_error(cx)
                .map_or(Value::Null, |err| Value::from(err.message))
                .into())
        })
        .flags(skipping),
        FilterDef::new("lastErrorStackTrace", &[], |cx, _| {
            Ok(last_error(cx)
                .map_or(Value::Null, |err| Value::from(err.stack_trace()))
                .into())
        })
        .flags(skipping),
    ]
}

/// An error as rendered by the `htmlError*` filters.
#[derive(Debug, PartialEq)]
struct Shown {
    type_name: String,
    message: String,
    stack_trace: String,
}

impl Shown {
    fn from_error(err: &EvalError) -> Self {
        Shown {
            type_name: err.type_name().to_string(),
            message: err.message.clone(),
            stack_trace: err.stack_trace(),
        }
    }

    /// An error object (`{ message, type, stackTrace }`) bound by
    /// `assignError` or returned by `ifError`.
    fn from_value(value: &Value) -> Option<Self> {
        let message = value.get("message")?;
        let field = |key: &str| value.get(key).map(|v| v.to_display_string()).unwrap_or_default();
        Some(Shown {
            type_name: field("type"),
            message: message.to_display_string(),
            stack_trace: field("stackTrace"),
        })
    }

    fn message_html(&self, class_name: &str) -> String {
        format!("<div class=\"{class_name}\">{}</div>", self.message)
    }

    fn debug_html(&self, class_name: &str) -> String {
        let mut html = format!("<pre class=\"{class_name}\">{}: {}\n", self.type_name, self.message);
        if !self.stack_trace.is_empty() {
            html.push_str("\nStackTrace:\n");
            html.push_str(&self.stack_trace);
            html.push('\n');
        }
        html.push_str("</pre>\n");
        html
    }
}

#[derive(Copy, Clone)]
enum Style {
    /// Debug output in debug mode, the message otherwise.
    Auto,
    Message,
    Debug,
}

/// The error to show and the options object, from the written arguments.
/// A single argument is an error object, or otherwise options for the
/// last error.
fn shown_and_options(cx: &mut FilterCx<'_>, args: &[Value]) -> (Option<Shown>, Value) {
    match args {
        [] => (last_error(cx).as_ref().map(Shown::from_error), Value::Undefined),
        [arg] => match Shown::from_value(arg) {
            Some(shown) => (Some(shown), Value::Undefined),
            None => (last_error(cx).as_ref().map(Shown::from_error), arg.clone()),
        },
        [error, options, ..] => (
            Shown::from_value(error).or_else(|| last_error(cx).as_ref().map(Shown::from_error)),
            options.clone(),
        ),
    }
}

fn html_error(cx: &mut FilterCx<'_>, args: &[Value], style: Style) -> Value {
    let (shown, options) = shown_and_options(cx, args);
    let Some(shown) = shown else {
        return Value::raw("");
    };
    let class_name = options
        .get("className")
        .map_or_else(|| DEFAULT_ERROR_CLASS.to_string(), |v| v.to_display_string());
    let debug = match style {
        Style::Auto => cx.context().config().debug_mode,
        Style::Message => false,
        Style::Debug => true,
    };
    Value::raw(if debug {
        shown.debug_html(&class_name)
    } else {
        shown.message_html(&class_name)
    })
}

fn rendering() -> Vec<FilterDef> {
    let mut defs = Vec::new();
    for (name, style) in [
        ("htmlError", Style::Auto),
        ("htmlErrorMessage", Style::Message),
        ("htmlErrorDebug", Style::Debug),
    ] {
        for arity in 0..=2 {
            defs.push(
                FilterDef::new(name, &vec![ParamShape::Any; arity], move |cx, args| {
                    Ok(html_error(cx, args, style).into())
                })
                .flags(FilterFlags::EVAL_WHEN_SKIPPING),
            );
        }
    }
    defs
}

fn directives() -> Vec<FilterDef> {
    let mut defs = Vec::new();
    for (name, skip) in [
        ("skipExecutingFiltersOnError", true),
        ("continueExecutingFiltersOnError", false),
    ] {
        for arity in 0..=1 {
            defs.push(
                FilterDef::new(name, &vec![ParamShape::Any; arity], move |cx, _| {
                    cx.interpreter().state_mut().skip_if_error = Some(skip);
                    Ok(Outcome::IGNORE)
                })
                .flags(FilterFlags::NO_OUTPUT | FilterFlags::EVAL_WHEN_SKIPPING),
            );
        }
    }
    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shown() -> Shown {
        Shown {
            type_name: "ArgumentException".to_string(),
            message: "bad <arg>".to_string(),
            stack_trace: "   at Page: index.html".to_string(),
        }
    }

    #[test]
    fn message_html_is_not_encoded() {
        assert_eq!(
            shown().message_html("alert"),
            "<div class=\"alert\">bad <arg></div>"
        );
    }

    #[test]
    fn debug_html_includes_the_stack_trace() {
        assert_eq!(
            shown().debug_html("err"),
            "<pre class=\"err\">ArgumentException: bad <arg>\n\nStackTrace:\n   at Page: index.html\n</pre>\n"
        );
        let bare = Shown {
            stack_trace: String::new(),
            ..shown()
        };
        assert_eq!(bare.debug_html("err"), "<pre class=\"err\">ArgumentException: bad <arg>\n</pre>\n");
    }

    #[test]
    fn error_objects_read_back() {
        let value = Value::object_from([
            ("message", Value::from("boom")),
            ("type", Value::from("Exception")),
            ("stackTrace", Value::from("")),
        ]);
        let read = Shown::from_value(&value);
        assert_eq!(read.map(|s| s.message), Some("boom".to_string()));
        assert_eq!(Shown::from_value(&Value::object_from([("className", Value::from("x"))])), None);
    }
}
