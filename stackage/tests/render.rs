use std::fmt;

use stackage::prelude::*;

#[derive(Debug)]
struct Path(&'static str);

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Opaque for Path {}

#[test]
fn parenthesized_conjunction() {
    let stack = Stack::and();
    stack.set_paren(true).push(["a", "b", "c"]);
    assert_eq!(stack.to_string(), "(a AND b AND c)");
}

#[test]
fn list_with_custom_delimiter() {
    let stack = Stack::list();
    stack.set_delimiter(",").push(["x", "y"]);
    assert_eq!(stack.to_string(), "x,y");
    assert_eq!(Stack::list().push(["x", "y"]).render(), "x y");
}

#[test]
fn folded_padded_and_symbols() {
    let stack = Stack::or();
    stack.push(["a", "b"]);
    assert_eq!(stack.render(), "a OR b");

    stack.set_fold(true);
    assert_eq!(stack.render(), "a or b");

    stack.set_symbol("||");
    assert_eq!(stack.render(), "a || b", "a custom symbol replaces the kind word");

    stack.set_no_pad(true);
    assert_eq!(stack.render(), "a||b");
}

#[test]
fn nested_stacks_render_recursively() {
    let inner = Stack::or();
    inner.set_paren(true).push(["b", "c"]);
    let negated = Stack::not();
    negated.push(["d"]);

    let outer = Stack::and();
    outer.push([Value::from("a"), Value::from(&inner), Value::from(&negated)]);
    assert_eq!(outer.render(), "a AND (b OR c) AND NOT d");

    negated.set_symbol("!");
    assert_eq!(
        outer.render(),
        "a AND (b OR c) AND d",
        "a NOT child with a custom symbol is not prefixed"
    );
}

#[test]
fn lead_once_not_child_is_not_prefixed_twice() {
    let negated = Stack::not();
    negated.set_lead_once(true).set_paren(true).push(["x", "y"]);

    let outer = Stack::and();
    outer.push([Value::from("a"), Value::from(&negated)]);
    assert_eq!(outer.render(), "a AND (NOT x y)");
}

#[test]
fn conditions_and_primitives() {
    let stack = Stack::and();
    stack.push([
        Value::from(Condition::new("size", ComparisonOperator::Gt, 10)),
        Value::from(true),
        Value::from(2.5),
    ]);
    assert_eq!(stack.render(), "size > 10 AND true AND 2.5");
}

#[test]
fn encapsulation_wraps_opaque_values_only() {
    let stack = Stack::list();
    stack
        .set_encap([Encapsulation::symmetric("'"), Encapsulation::pair("<", ">")])
        .push([Value::opaque(Path("/etc")), Value::from("plain")]);
    assert_eq!(stack.render(), "<'/etc'> plain");
}

#[test]
fn whitespace_is_normalized() {
    let stack = Stack::list();
    stack.set_delimiter("  \t ").push(["a", "  b  "]);
    assert_eq!(stack.render(), "a b");
}

#[test]
fn empty_children_are_dropped() {
    let outer = Stack::and();
    outer.push([Value::from("a"), Value::from(Stack::or()), Value::from("b")]);
    assert_eq!(outer.render(), "a AND b");
}

#[test]
fn validity_policy_yields_sentinel() {
    let stack = Stack::and();
    stack.push(["a", "b"]);
    assert!(stack.valid().is_ok());

    stack.set_validity_policy(|stack| {
        if stack.len() > 1 {
            Err(StkError::Invalid("at most one element".into()))
        } else {
            Ok(())
        }
    });
    assert_eq!(stack.render(), "<invalid_stack>");
    assert!(Stack::default().valid().unwrap_err().is_uninitialized());
}

#[test]
fn presentation_policy_output_is_verbatim() {
    let stack = Stack::and();
    stack
        .set_presentation_policy(|elements| format!("  all({})  ", elements.len()))
        .push(["a", "b"]);
    assert_eq!(stack.render(), "  all(2)  ");
}

#[test]
fn rendering_is_idempotent() {
    let stack = Stack::or();
    stack.set_paren(true).push([
        Value::from("a"),
        Value::from(Condition::new("n", ComparisonOperator::Le, 3)),
    ]);
    let first = stack.render();
    assert_eq!(first, stack.render());
    assert_eq!(first, stack.to_string());
}

#[test]
fn references_render_their_target() {
    let stack = Stack::list();
    stack.push([Value::shared(Value::shared("deep")), Value::from(vec![1, 2])]);
    assert_eq!(stack.render(), "deep [1 2]");
}
