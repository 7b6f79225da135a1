//! Value selection and pipeline control.
//!
//! Selection filters return a value or `null`. Control filters return a
//! [`ControlSignal`](crate::pending::ControlSignal): `end*` stop the
//! fragment when their condition holds, `only*` stop it unless the
//! condition holds. A filter that lets the fragment continue returns either
//! the target (so it keeps flowing) or `Ignore`.
//!
//! Where a filter tests a flag, only the boolean `true` counts; the
//! `*Truthy` / `*Falsy` forms use truthiness instead.

use super::{outcome, with_aliases};
use crate::filters::{FilterDef, FilterFlags, ParamShape};
use crate::pending::Outcome;
use crate::Value;

pub(super) fn filters() -> Vec<FilterDef> {
    let mut defs = selection();
    defs.extend(ending());
    defs.extend(only());
    defs.extend(usage());
    defs
}

fn pick(value: &Value, keep: bool) -> Value {
    if keep {
        value.clone()
    } else {
        Value::Null
    }
}

fn selection() -> Vec<FilterDef> {
    let mut defs = vec![
        FilterDef::any("iif", 3, |args| {
            Ok(if args[0].is_true() { args[1].clone() } else { args[2].clone() })
        }),
        FilterDef::any("ifExists", 1, |args| Ok(args[0].clone())),
        FilterDef::any("ifExists", 2, |args| Ok(pick(&args[0], !args[1].is_nullish()))),
        FilterDef::any("ifNotExists", 2, |args| Ok(pick(&args[0], args[1].is_nullish()))),
        FilterDef::any("ifEmpty", 2, |args| Ok(pick(&args[0], args[1].is_empty()))),
        FilterDef::any("ifNotEmpty", 1, |args| Ok(pick(&args[0], !args[0].is_empty()))),
        FilterDef::any("ifNotEmpty", 2, |args| Ok(pick(&args[0], !args[1].is_empty()))),
        FilterDef::any("ifTrue", 2, |args| Ok(pick(&args[0], args[1].is_true()))),
        FilterDef::any("ifFalse", 2, |args| Ok(pick(&args[0], !args[1].is_true()))),
        FilterDef::any("ifTruthy", 2, |args| Ok(pick(&args[0], args[1].is_truthy()))),
        FilterDef::any("ifFalsy", 2, |args| Ok(pick(&args[0], args[1].is_falsy()))),
        FilterDef::any("when", 2, |args| Ok(pick(&args[0], args[1].is_true()))),
    ];
    defs.extend(with_aliases(
        FilterDef::any("ifNot", 2, |args| Ok(pick(&args[0], !args[1].is_true()))),
        &["unless"],
    ));
    defs.extend(with_aliases(
        FilterDef::any("otherwise", 2, |args| {
            Ok(if args[0].is_nullish() { args[1].clone() } else { args[0].clone() })
        }),
        &["default"],
    ));
    defs
}

/// `Stop` when `stop` holds, otherwise `Ignore`.
fn stop_or_ignore(stop: bool) -> Outcome {
    if stop {
        Outcome::STOP
    } else {
        Outcome::IGNORE
    }
}

/// `Stop` when `stop` holds, otherwise the target keeps flowing.
fn stop_or_keep(target: &Value, stop: bool) -> Outcome {
    if stop {
        Outcome::STOP
    } else {
        target.clone().into()
    }
}

/// Registers `name` at arity 1 (testing the piped value) and arity 2
/// (testing the argument, the piped value being ignored).
fn tested(name: &str, test: fn(&Value) -> bool, keep_target: bool) -> Vec<FilterDef> {
    let decide = move |target: &Value, subject: &Value| {
        if keep_target {
            stop_or_keep(target, test(subject))
        } else {
            stop_or_ignore(test(subject))
        }
    };
    vec![
        outcome(name, 1, move |args| decide(&args[0], &args[0])),
        outcome(name, 2, move |args| decide(&args[1], &args[1])),
    ]
}

fn ending() -> Vec<FilterDef> {
    let mut defs = vec![
        outcome("end", 0, |_| Outcome::STOP).flags(FilterFlags::NO_OUTPUT),
        outcome("end", 1, |_| Outcome::STOP).flags(FilterFlags::NO_OUTPUT),
        outcome("endIf", 1, |args| stop_or_ignore(args[0].is_true())),
        outcome("endIf", 2, |args| stop_or_keep(&args[0], args[1].is_true())),
        FilterDef::new("endWhere", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            let matched = cx.apply(&args[1], &args[0], 0)?.is_truthy();
            Ok(stop_or_keep(&args[0], matched))
        }),
        outcome("ifEnd", 1, |args| stop_or_ignore(args[0].is_true())).flags(FilterFlags::NO_OUTPUT),
        outcome("ifEnd", 2, |args| stop_or_ignore(args[1].is_true())).flags(FilterFlags::NO_OUTPUT),
        outcome("ifNotEnd", 1, |args| stop_or_ignore(!args[0].is_true()))
            .flags(FilterFlags::NO_OUTPUT),
        outcome("ifNotEnd", 2, |args| stop_or_ignore(!args[1].is_true()))
            .flags(FilterFlags::NO_OUTPUT),
    ];
    defs.extend(tested("endIfNull", Value::is_nullish, true));
    defs.extend(tested("endIfNotNull", |v| !v.is_nullish(), false));
    defs.extend(tested("endIfExists", |v| !v.is_nullish(), false));
    defs.extend(tested("endIfEmpty", Value::is_empty, true));
    defs.extend(tested("endIfNotEmpty", |v| !v.is_empty(), false));
    defs.extend(tested("endIfFalsy", Value::is_falsy, true));
    defs.extend(tested("endIfTruthy", Value::is_truthy, false));
    defs
}

fn only() -> Vec<FilterDef> {
    let mut defs = vec![
        outcome("onlyIf", 1, |args| stop_or_ignore(!args[0].is_true())),
        outcome("onlyIf", 2, |args| stop_or_keep(&args[0], !args[1].is_true())),
        FilterDef::new("onlyWhere", &[ParamShape::Any, ParamShape::Any], |cx, args| {
            let matched = cx.apply(&args[1], &args[0], 0)?.is_truthy();
            Ok(stop_or_keep(&args[0], !matched))
        }),
        outcome("ifOnly", 1, |args| stop_or_ignore(!args[0].is_true())).flags(FilterFlags::NO_OUTPUT),
        outcome("ifOnly", 2, |args| stop_or_ignore(!args[1].is_true())).flags(FilterFlags::NO_OUTPUT),
        outcome("ifNotOnly", 1, |args| stop_or_ignore(args[0].is_true()))
            .flags(FilterFlags::NO_OUTPUT),
        outcome("ifNotOnly", 2, |args| stop_or_ignore(args[1].is_true()))
            .flags(FilterFlags::NO_OUTPUT),
    ];
    defs.extend(tested("onlyIfNull", |v| !v.is_nullish(), false));
    defs.extend(tested("onlyIfNotNull", Value::is_nullish, true));
    defs.extend(tested("onlyIfExists", Value::is_nullish, true));
    defs.extend(tested("onlyIfEmpty", |v| !v.is_empty(), false));
    defs.extend(tested("onlyIfNotEmpty", Value::is_empty, true));
    defs.extend(tested("onlyIfFalsy", Value::is_truthy, false));
    defs.extend(tested("onlyIfTruthy", Value::is_falsy, true));
    defs
}

fn usage() -> Vec<FilterDef> {
    let mut defs = Vec::new();
    for name in ["ifDo", "doIf"] {
        defs.push(
            outcome(name, 1, |args| stop_or_ignore(!args[0].is_true())).flags(FilterFlags::NO_OUTPUT),
        );
        defs.push(
            outcome(name, 2, |args| stop_or_ignore(!args[1].is_true())).flags(FilterFlags::NO_OUTPUT),
        );
    }
    defs.extend(with_aliases(
        outcome("ifUse", 2, |args| stop_or_keep(&args[1], !args[0].is_true())),
        &["ifShow"],
    ));
    defs.extend(with_aliases(
        outcome("useIf", 2, |args| stop_or_keep(&args[0], !args[1].is_true())),
        &["showIf"],
    ));
    defs.push(outcome("showIfExists", 2, |args| {
        stop_or_keep(&args[0], args[1].is_nullish())
    }));
    defs.extend(with_aliases(
        FilterDef::any("use", 2, |args| Ok(args[1].clone())),
        &["show"],
    ));
    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::ControlSignal;

    fn signal(outcome: &Outcome) -> Option<ControlSignal> {
        match outcome {
            Outcome::Signal(signal) => Some(*signal),
            _ => None,
        }
    }

    #[test]
    fn stop_or_keep_passes_the_target_through() {
        let kept = stop_or_keep(&Value::Int(3), false);
        assert!(matches!(kept, Outcome::Value(Value::Int(3))));
        assert_eq!(signal(&stop_or_keep(&Value::Int(3), true)), Some(ControlSignal::Stop));
    }

    #[test]
    fn stop_or_ignore_never_yields_a_value() {
        assert_eq!(signal(&stop_or_ignore(true)), Some(ControlSignal::Stop));
        assert_eq!(signal(&stop_or_ignore(false)), Some(ControlSignal::Ignore));
    }
}
