#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use crate::context::{MemoryFiles, TemplateContext};
use crate::Value;

fn render(source: &str) -> String {
    render_in(&TemplateContext::default(), source, Vec::new())
}

fn render_with(source: &str, args: &[(&str, Value)]) -> String {
    let args = args
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect();
    render_in(&TemplateContext::default(), source, args)
}

fn render_in(context: &TemplateContext, source: &str, args: Vec<(String, Value)>) -> String {
    context.evaluate_template(source, args).unwrap()
}

// -- math --

#[test]
fn arithmetic_filters() {
    assert_eq!(render("{{ 1 | add(2) }}"), "3");
    assert_eq!(render("{{ 10 | subtract(4) }} {{ 10 | sub(4) }}"), "6 6");
    assert_eq!(render("{{ 10 | divide(4) }}"), "2.5");
    assert_eq!(render("{{ 10 | div(5) }}"), "2");
    assert_eq!(render("{{ 7 | mod(3) }}"), "1");
    assert_eq!(render("{{ 3 | mul(4) | incr }}"), "13");
    assert_eq!(render("{{ '4' | add(1) }}"), "5");
}

#[test]
fn rounding_filters() {
    assert_eq!(render("{{ 3.7 | floor }}"), "3");
    assert_eq!(render("{{ 3.2 | ceiling }}"), "4");
    assert_eq!(render("{{ 2.5 | round }}"), "3");
    assert_eq!(render("{{ 3.14159 | round(2) }}"), "3.14");
    assert_eq!(render("{{ -5 | abs }} {{ 3 | max(7) }} {{ 3 | min(7) }}"), "5 7 3");
}

// -- comparison --

#[test]
fn comparison_filters() {
    assert_eq!(render("{{ 2 | gt(1) }} {{ 2 | lt(1) }}"), "true false");
    assert_eq!(render("{{ 3 | isOdd }} {{ 3 | isEven }}"), "true false");
    assert_eq!(render("{{ 1 | eq('1') }}"), "true");
    assert_eq!(render("{{ missing | isNull }} {{ '' | isEmpty }}"), "true true");
}

// -- strings --

#[test]
fn string_filters() {
    assert_eq!(render("{{ 'hello' | upper }}"), "HELLO");
    assert_eq!(render("{{ 'a,b,c' | split | join('-') }}"), "a-b-c");
    assert_eq!(render("{{ 'abc' | padLeft(5, '*') }}"), "**abc");
    assert_eq!(render("{{ 'hello' | substring(1, 3) }}"), "ell");
    assert_eq!(render("{{ 'x' | repeat(3) }}"), "xxx");
    assert_eq!(render("{{ 'a-b' | replace('-', '+') }}"), "a+b");
    assert_eq!(render("{{ 1234.5 | currency }}"), "$1,234.50");
    assert_eq!(render("{{ 1234.5 | format('{0:N2}') }}"), "1,234.50");
    assert_eq!(render("{{ 'abc' | startsWith('ab') }}"), "true");
}

#[test]
fn missing_strings_pass_through() {
    assert_eq!(render("[{{ missing | upper }}]"), "[]");
}

// -- collections --

#[test]
fn shaping_collections() {
    assert_eq!(render("{{ [3, 1, 2] | orderBy('it') | join }}"), "1,2,3");
    assert_eq!(render("{{ [3, 1, 2] | orderByDescending('it') | join }}"), "3,2,1");
    assert_eq!(render("{{ [1, 2, 3, 4] | where: it % 2 == 0 | join }}"), "2,4");
    assert_eq!(render("{{ [1, 2, 3] | map(x => x * 10) | sum }}"), "60");
    assert_eq!(render("{{ [1, 2, 3, 4] | skip(1) | take(2) | join }}"), "2,3");
    assert_eq!(render("{{ [[1, 2], [3, [4]]] | flatten | join }}"), "1,2,3,4");
    assert_eq!(render("{{ [1, 1, 2] | distinct | length }}"), "2");
    assert_eq!(render("{{ [1, 2] | reverse | join }} {{ 'abc' | reverse }}"), "2,1 cba");
}

#[test]
fn counting_and_predicates() {
    assert_eq!(render("{{ 'hello' | length }} {{ [1, 2] | count }}"), "5 2");
    assert_eq!(render("{{ missing | count }}"), "0");
    assert_eq!(render("{{ [1, 2, 3] | any('it > 2') }} {{ [1, 2, 3] | all('it > 2') }}"), "true false");
    assert_eq!(render("{{ [] | any }}"), "false");
    assert_eq!(render("{{ [1, 2, 3] | first }}{{ [1, 2, 3] | last }}"), "13");
}

#[test]
fn ranges() {
    assert_eq!(render("{{ range(3) | join }}"), "0,1,2");
    assert_eq!(render("{{ range(5, 3) | join }}"), "5,6,7");
    assert_eq!(render("{{ 3 | times | join }}"), "0,1,2");
}

#[test]
fn objects_as_collections() {
    let person = Value::object_from([
        ("name", Value::from("Ann")),
        ("age", Value::Int(30)),
        ("city", Value::from("Oslo")),
    ]);
    let args = [("person", person)];
    assert_eq!(render_with("{{ person | keys | join }}", &args), "name,age,city");
    assert_eq!(
        render_with("{{ person | withKeys(['name', 'city']) | values | join }}", &args),
        "Ann,Oslo"
    );
    assert_eq!(
        render_with("{{ person | withoutKeys(['age']) | keys | join }}", &args),
        "name,city"
    );
    assert_eq!(
        render_with("{{ person | merge({ age: 31 }) | values | join }}", &args),
        "Ann,31,Oslo"
    );
}

#[test]
fn select_renders_a_template_per_item() {
    assert_eq!(render("{{ ['a', 'b'] | select: <li>{it}</li> }}"), "<li>a</li><li>b</li>");
    assert_eq!(render("{{ ['a', 'b'] | select: {index}:{it}, }}"), "0:a,1:b,");
}

#[test]
fn select_encodes_items_but_not_markup() {
    assert_eq!(render("{{ ['<b>'] | select: <i>{it}</i> }}"), "<i>&lt;b&gt;</i>");
}

#[test]
fn for_each_runs_for_effect() {
    assert_eq!(
        render("{{ [1, 2] | forEach(x => x) }}{{ [1, 2] | length }}"),
        "2"
    );
}

// -- conditional --

#[test]
fn value_selection() {
    assert_eq!(render("{{ 'yes' | when(true) }}|{{ 'yes' | when(false) }}"), "yes|");
    assert_eq!(render("{{ 'yes' | unless(false) }}"), "yes");
    assert_eq!(render("{{ null | otherwise('fallback') }}"), "fallback");
    assert_eq!(render("{{ missing | default('none') }}"), "none");
    assert_eq!(render("{{ iif(1 > 2, 'a', 'b') }}"), "b");
    assert_eq!(render("{{ 'full' | ifNotEmpty }}"), "full");
    assert_eq!(render("{{ 'x' | ifTruthy(1) }}{{ 'y' | ifFalsy(1) }}"), "x");
}

#[test]
fn ending_a_fragment() {
    assert_eq!(render("{{ 1 | end }}after"), "after");
    assert_eq!(render("{{ 'x' | endIfEmpty | upper }}"), "X");
    assert_eq!(render("[{{ '' | endIfEmpty | upper }}]"), "[]");
    assert_eq!(render("[{{ 'x' | endIf(true) }}]"), "[]");
    assert_eq!(render("{{ 'x' | endIf(false) }}"), "x");
    assert_eq!(render("[{{ 5 | endWhere: it > 3 }}]{{ 2 | endWhere: it > 3 }}"), "[]2");
}

#[test]
fn only_continuing_when_a_condition_holds() {
    assert_eq!(render("{{ 'shown' | onlyIf(true) }}"), "shown");
    assert_eq!(render("[{{ 'hidden' | onlyIf(false) }}]"), "[]");
    assert_eq!(render("[{{ missing | onlyIfExists | upper }}]"), "[]");
    assert_eq!(render("{{ 'a' | onlyIfNotEmpty | upper }}"), "A");
    assert_eq!(render("{{ 4 | onlyWhere: it > 3 }}"), "4");
}

#[test]
fn use_and_show() {
    assert_eq!(render("{{ 5 | use(7) }} {{ 5 | show(8) }}"), "7 8");
    assert_eq!(render("{{ 'a' | useIf(true) }}[{{ 'a' | showIf(false) }}]"), "a[]");
    assert_eq!(render("{{ ifUse(true, 'b') }}"), "b");
    assert_eq!(render("{{ 'v' | showIfExists(missing) }}"), "");
}

#[test]
fn ignore_as_last_result_writes_nothing() {
    assert_eq!(render("[{{ 'v' | ifDo(true) }}]"), "[]");
    assert_eq!(render("[{{ 'v' | ifDo(false) | upper }}]"), "[]");
}

// -- assignment --

#[test]
fn assign_and_assign_to() {
    assert_eq!(render("{{ 5 | assignTo: x }}{{ x }}"), "5");
    assert_eq!(render("{{ assign('y', 3) }}{{ y * 2 }}"), "6");
}

#[test]
fn assignment_drops_the_following_newline() {
    assert_eq!(render("{{ 5 | assignTo: x }}\n{{ x }}"), "5");
}

#[test]
fn member_assignment_mutates_in_place() {
    let args = [
        ("obj", Value::object_from([("a", Value::Int(1))])),
        ("list", Value::list(vec![Value::Int(1)])),
    ];
    assert_eq!(render_with("{{ assign('obj.b', 2) }}{{ obj.b }}", &args), "2");
    assert_eq!(render_with("{{ assign('list[1]', 2) }}{{ list | join }}", &args), "1,2");
}

#[test]
fn member_assignment_needs_an_existing_root() {
    let err = TemplateContext::default()
        .evaluate_template("{{ assign('nope.b', 2) }}", Vec::new())
        .unwrap_err();
    assert!(err.message.contains("non-existing 'nope'"), "{}", err.message);
}

#[test]
fn appending_and_prepending_text() {
    assert_eq!(
        render("{{ 'b' | assignTo: s }}{{ 'c' | appendTo: s }}{{ 'a' | prependTo: s }}{{ s }}"),
        "abc"
    );
}

#[test]
fn adding_to_lists() {
    assert_eq!(render("{{ 1 | addTo: xs }}{{ [2, 3] | addTo: xs }}{{ xs | join }}"), "1,2,3");
}

#[test]
fn global_assignment_escapes_blocks() {
    assert_eq!(
        render("{{#each [1]}}{{ it | assignToGlobal: seen }}{{/each}}{{ seen }}"),
        "1"
    );
}

// -- templates --

#[test]
fn partial_blocks_render_with_arguments() {
    assert_eq!(
        render("{{#partial card}}Hi {{ name }}{{/partial}}{{ 'card' | partial({ name: 'Ann' }) }}"),
        "Hi Ann"
    );
}

#[test]
fn partial_pages_resolve_by_convention() {
    let context = TemplateContext::builder()
        .files(MemoryFiles::new().with_file("_card-partial.html", "[{{ title }}]"))
        .build();
    assert_eq!(
        render_in(&context, "{{ 'card' | partial({ title: 'T' }) }}", Vec::new()),
        "[T]"
    );
}

#[test]
fn missing_partials_fail() {
    let err = TemplateContext::default()
        .evaluate_template("{{ 'nope' | partial }}", Vec::new())
        .unwrap_err();
    assert!(err.message.contains("nope"), "{}", err.message);
}

#[test]
fn select_partial_renders_each_item() {
    assert_eq!(
        render("{{#partial li}}<li>{{ it }}</li>{{/partial}}{{ ['a', 'b'] | selectPartial('li') }}"),
        "<li>a</li><li>b</li>"
    );
}

#[test]
fn eval_template_renders_in_a_fresh_scope() {
    assert_eq!(render("{{ evalTemplate('{{ a }}', { a: 5 }) }}"), "5");
    assert_eq!(render_with("[{{ evalTemplate('{{ x }}') }}]", &[("x", Value::Int(1))]), "[]");
}

#[test]
fn encoding_filters() {
    assert_eq!(render("{{ '<b>' }}"), "&lt;b&gt;");
    assert_eq!(render("{{ '<b>' | raw }}"), "<b>");
    assert_eq!(render("{{ '<b>' | htmlEncode }}"), "&lt;b&gt;");
    assert_eq!(render("{{ [1, 'a'] | json }}"), "[1,\"a\"]");
}

// -- errors --

#[test]
fn throw_fails_the_render_by_default() {
    let err = TemplateContext::default()
        .evaluate_template("{{ 'boom' | throw }}", Vec::new())
        .unwrap_err();
    assert_eq!(err.message, "boom");
    assert_eq!(err.type_name(), "Exception");
}

#[test]
fn typed_throws() {
    let err = TemplateContext::default()
        .evaluate_template("{{ 'id' | throwArgumentNullException }}", Vec::new())
        .unwrap_err();
    assert_eq!(err.type_name(), "ArgumentNullException");
    assert_eq!(err.message, "Value cannot be null. (Parameter 'id')");
}

#[test]
fn throw_if_only_throws_when_true() {
    assert_eq!(render("{{ 'boom' | throwIf(false) }}ok"), "ok");
    assert!(TemplateContext::default()
        .evaluate_template("{{ 'boom' | throwIf(true) }}", Vec::new())
        .is_err());
}

#[test]
fn skipping_after_an_error() {
    assert_eq!(
        render("{{ skipExecutingFiltersOnError }}{{ 'boom' | throw }}{{ 'after' }}{{ lastErrorMessage }}"),
        "boom"
    );
}

#[test]
fn html_error_message() {
    assert_eq!(
        render("{{ skipExecutingFiltersOnError }}{{ 'bad' | throw }}{{ htmlErrorMessage }}"),
        "<div class=\"alert alert-danger\">bad</div>"
    );
    assert_eq!(
        render("{{ skipExecutingFiltersOnError }}{{ 'bad' | throw }}{{ htmlErrorMessage({ className: 'err' }) }}"),
        "<div class=\"err\">bad</div>"
    );
}

#[test]
fn html_error_is_empty_without_an_error() {
    assert_eq!(render("[{{ htmlError }}]"), "[]");
}

#[test]
fn assign_error_binds_the_error_object() {
    assert_eq!(
        render("{{ 'bad' | throw({ assignError: 'ex' }) }}{{ ex.message }}:{{ ex.type }}"),
        "bad:Exception"
    );
}

#[test]
fn if_error_yields_the_last_error() {
    assert_eq!(
        render("{{ 'bad' | throw({ assignError: 'ex' }) }}{{ ifError | select: [{it.message}] }}"),
        "[bad]"
    );
    assert_eq!(render("[{{ ifError | select: {it.message} }}]"), "[]");
}

#[test]
fn continue_executing_overrides_skipping() {
    assert_eq!(
        render(
            "{{ skipExecutingFiltersOnError }}{{ continueExecutingFiltersOnError }}\
             {{ 'bad' | throw }}{{ 'after' }}"
        ),
        "after"
    );
}

// -- async --

#[test]
fn delayed_values_are_awaited() {
    assert_eq!(render("{{ 'later' | delay(1) }}"), "later");
}
