//! Filter registration tests: providers, services, exclusions and host
//! values reached from filters.

use std::any::Any;

use pretty_assertions::assert_eq;
use stencil_eval::{
    ContextConfig, EvalError, FilterDef, FilterProvider, HostObject, ParamShape, Services,
    TemplateContext, Value,
};

/// Greeting prefix injected as a service.
struct Salutation(&'static str);

/// Filters that read the `Salutation` service when the context is built.
struct GreetingFilters;

impl FilterProvider for GreetingFilters {
    fn filters(&self, services: &Services) -> Vec<FilterDef> {
        let prefix = services.get::<Salutation>().map_or("Hello", |s| s.0);
        vec![
            FilterDef::value("greet", &[ParamShape::Str], move |args| {
                Ok(Value::from(format!("{prefix}, {}!", args[0].to_display_string())))
            }),
            FilterDef::new("greetLater", &[ParamShape::Str], |cx, args| {
                let prefix = cx.service::<Salutation>().map_or("Hello", |s| s.0);
                Ok(Value::from(format!("{prefix}... {}", args[0].to_display_string())).into())
            }),
        ]
    }
}

#[derive(Debug)]
struct Product {
    name: &'static str,
    price: f64,
}

impl HostObject for Product {
    fn type_name(&self) -> &str {
        "Product"
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name)),
            "price" => Some(Value::Double(self.price)),
            _ => None,
        }
    }

    fn property_names(&self) -> Vec<String> {
        vec!["name".to_string(), "price".to_string()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn products() -> Value {
    Value::list(vec![
        Value::host(Product { name: "pen", price: 1.5 }),
        Value::host(Product { name: "ink", price: 12.0 }),
    ])
}

// -- providers --

#[test]
fn providers_see_registered_services() {
    let context = TemplateContext::builder()
        .service(Salutation("Hi"))
        .provider(GreetingFilters)
        .build();
    assert_eq!(context.evaluate_template("{{ 'Ada' | greet }}", []).unwrap(), "Hi, Ada!");
    assert_eq!(context.evaluate_template("{{ 'Ada' | greetLater }}", []).unwrap(), "Hi... Ada");
}

#[test]
fn providers_work_without_their_services() {
    let context = TemplateContext::builder().provider(GreetingFilters).build();
    assert_eq!(context.evaluate_template("{{ 'Ada' | greet }}", []).unwrap(), "Hello, Ada!");
}

#[test]
fn registered_filters_win_over_defaults() {
    let context = TemplateContext::builder()
        .filter(FilterDef::any("upper", 1, |args| {
            Ok(Value::from(format!("<{}>", args[0].to_display_string())))
        }))
        .build();
    assert_eq!(context.evaluate_template("{{ 'a' | upper | raw }}", []).unwrap(), "<a>");
}

#[test]
fn contexts_without_defaults_only_have_their_own() {
    let context = TemplateContext::builder()
        .without_default_filters()
        .filter(FilterDef::any("twice", 1, |args| {
            Ok(Value::from(args[0].to_display_string().repeat(2)))
        }))
        .build();
    assert_eq!(context.evaluate_template("{{ 'ab' | twice }}", []).unwrap(), "abab");
    assert_eq!(
        context.evaluate_template("{{ 'ab' | upper }}", []).unwrap(),
        "{{ 'ab' | upper }}"
    );
}

// -- exclusions --

#[test]
fn excluded_filters_render_as_source() {
    let config = ContextConfig::from_json(r#"{ "exclude_filters_named": ["upper"] }"#).unwrap();
    let context = TemplateContext::builder().config(config).build();
    assert_eq!(
        context.evaluate_template("{{ 'a' | upper }}|{{ 'B' | lower }}", []).unwrap(),
        "{{ 'a' | upper }}|b"
    );
}

// -- failures --

#[test]
fn provider_failures_name_the_filter() {
    let context = TemplateContext::builder()
        .filter(FilterDef::any("parse", 1, |_| Err(EvalError::new("not a number"))))
        .build();
    let err = context.evaluate_template("{{ 'x' | parse }}", []).unwrap_err();
    assert_eq!(err.message, "Failed to invoke filter 'parse': not a number");
}

// -- host values --

#[test]
fn host_values_flow_through_collection_filters() {
    let context = TemplateContext::builder().arg("products", products()).build();
    assert_eq!(
        context
            .evaluate_template("{{ products | map(p => p.name) | join(' & ') | raw }}", [])
            .unwrap(),
        "pen & ink"
    );
    assert_eq!(
        context
            .evaluate_template("{{ products | where: it.price > 2 | map(p => p.name) | join }}", [])
            .unwrap(),
        "ink"
    );
}

#[test]
fn host_properties_bind_in_blocks() {
    let context = TemplateContext::builder().arg("products", products()).build();
    let out = context
        .evaluate_template("{{#each products}}{{ name }}={{ price | currency }};{{/each}}", [])
        .unwrap();
    assert_eq!(out, "pen=$1.50;ink=$12.00;");
}

#[test]
fn unknown_host_properties_fail() {
    let context = TemplateContext::builder()
        .arg("product", Value::host(Product { name: "pen", price: 1.0 }))
        .build();
    let err = context.evaluate_template("{{ product.weight }}", []).unwrap_err();
    assert_eq!(err.message, "There is no property 'weight' on 'Product'");
}
