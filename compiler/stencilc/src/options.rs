//! Options shared by `render` and `eval`.

use std::path::PathBuf;

use stencil_eval::value::from_json;
use stencil_eval::Value;

/// Flags after the command's positional argument.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CliOptions {
    /// `--arg name=value`, in order given.
    pub args: Vec<(String, Value)>,
    /// `--config file.json`
    pub config: Option<PathBuf>,
    /// `--debug`
    pub debug: bool,
    /// Arguments that are neither flags nor flag values.
    pub positional: Vec<String>,
}

impl CliOptions {
    /// Parse flags. Unknown flags are an error.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = CliOptions::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--arg" | "-a" => {
                    let pair = iter
                        .next()
                        .ok_or_else(|| format!("'{arg}' expects name=value"))?;
                    options.args.push(parse_arg(pair)?);
                }
                "--config" | "-c" => {
                    let path = iter.next().ok_or_else(|| format!("'{arg}' expects a path"))?;
                    options.config = Some(PathBuf::from(path));
                }
                "--debug" => options.debug = true,
                other => {
                    if let Some(pair) = other.strip_prefix("--arg=") {
                        options.args.push(parse_arg(pair)?);
                    } else if let Some(path) = other.strip_prefix("--config=") {
                        options.config = Some(PathBuf::from(path));
                    } else if other.starts_with('-') && other.len() > 1 {
                        return Err(format!("unknown option '{other}'"));
                    } else {
                        options.positional.push(other.to_string());
                    }
                }
            }
        }
        Ok(options)
    }
}

/// `name=value`. The value is read as JSON when it parses as JSON, so
/// `n=3` binds a number and `tags=["a","b"]` a list; anything else is a
/// string.
pub fn parse_arg(pair: &str) -> Result<(String, Value), String> {
    let (name, raw) = pair
        .split_once('=')
        .ok_or_else(|| format!("argument '{pair}' is not name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("argument '{pair}' has no name"));
    }
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Value::from(raw), |json| from_json(&json));
    Ok((name.to_string(), value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn values_are_json_when_they_parse() {
        assert_eq!(parse_arg("n=3").unwrap(), ("n".to_string(), Value::Int(3)));
        assert_eq!(parse_arg("ok=true").unwrap().1, Value::Bool(true));
        assert_eq!(parse_arg("name=Ada").unwrap().1, Value::from("Ada"));
        assert_eq!(parse_arg("eq=a=b").unwrap().1, Value::from("a=b"));
        assert_eq!(
            parse_arg("tags=[\"a\"]").unwrap().1,
            Value::list(vec![Value::from("a")])
        );
    }

    #[test]
    fn malformed_args_are_rejected() {
        assert!(parse_arg("novalue").is_err());
        assert!(parse_arg("=1").is_err());
    }

    #[test]
    fn flags_and_positionals() {
        let options = CliOptions::parse(&strings(&[
            "page.html", "--arg", "a=1", "--arg=b=x", "--config", "site.json", "--debug",
        ]))
        .unwrap();
        assert_eq!(options.positional, vec!["page.html".to_string()]);
        assert_eq!(options.args.len(), 2);
        assert_eq!(options.config, Some(PathBuf::from("site.json")));
        assert!(options.debug);
    }

    #[test]
    fn unknown_flags_fail() {
        assert!(CliOptions::parse(&strings(&["--verbose"])).is_err());
        assert!(CliOptions::parse(&strings(&["--arg"])).is_err());
    }

    proptest! {
        #[test]
        fn integers_bind_as_numbers(n in any::<i64>()) {
            prop_assert_eq!(parse_arg(&format!("n={n}")).unwrap().1, Value::Int(n));
        }

        #[test]
        fn words_bind_as_strings(word in "[a-z][a-z ]{0,12}") {
            prop_assume!(!["true", "false", "null"].contains(&word.trim()));
            prop_assert_eq!(parse_arg(&format!("w={word}")).unwrap().1, Value::from(word.as_str()));
        }
    }
}
