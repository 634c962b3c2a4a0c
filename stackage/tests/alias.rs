use stackage::prelude::*;

#[derive(Debug, AsStack)]
struct Filters(Stack);

#[derive(Debug, AsStack)]
struct Tags {
    inner: Stack,
}

#[derive(Debug, AsCondition)]
struct Rule {
    condition: Condition,
}

#[derive(Debug, AsCondition)]
struct Check(Condition);

fn filters(items: &[&str]) -> Filters {
    let stack = Stack::or();
    stack.set_paren(true).push(items.iter().copied());
    Filters(stack)
}

#[test]
fn wrappers_expose_and_display_their_target() {
    let f = filters(&["a", "b"]);
    assert_eq!(f.stack().len(), 2);
    assert_eq!(f.to_string(), "(a OR b)");

    let tags = Tags { inner: Stack::list() };
    tags.stack().set_delimiter(",").push(["x", "y"]);
    assert_eq!(tags.to_string(), "x,y");

    let rule = Rule {
        condition: Condition::new("n", ComparisonOperator::Ge, 2),
    };
    assert_eq!(rule.condition().keyword(), "n");
    assert_eq!(rule.to_string(), "n >= 2");
}

#[test]
fn wrappers_render_and_traverse_like_their_target() {
    let outer = Stack::and();
    outer.push([
        Value::from("x"),
        Value::from(filters(&["a", "b"])),
        Value::from(Check(Condition::new("k", ComparisonOperator::Eq, "v"))),
    ]);

    assert_eq!(outer.render(), "x AND (a OR b) AND k = v");
    assert_eq!(
        outer.traverse(&[1, 1]).map(|v| v.to_string()).as_deref(),
        Some("b")
    );
    assert!(outer.traverse(&[2]).and_then(|v| v.as_condition()).is_some());
}

#[test]
fn wrappers_compare_equal_to_their_target() {
    let f = filters(&["a", "b"]);
    let plain = filters(&["a", "b"]).0;
    assert!(is_equal(&Value::from(f), &Value::from(&plain)).is_ok());

    let a = Stack::list();
    a.push([Value::from(filters(&["p"]))]);
    let b = Stack::list();
    b.push([Value::from(filters(&["p"]).0)]);
    assert!(a.is_equal(&b).is_ok(), "a wrapped child equals the bare child");
}

#[test]
fn wrappers_transcode_as_their_target() {
    let outer = Stack::and();
    outer.push([
        Value::from(filters(&["a"])),
        Value::from(Rule {
            condition: Condition::new("n", ComparisonOperator::Lt, 3),
        }),
    ]);

    let neutral = outer.unmarshal().expect("neutral form");
    let Value::List(child) = &neutral[1] else {
        panic!("wrapped stack should transcode to a list, found {:?}", neutral[1]);
    };
    assert_eq!(child[0].as_str(), Some("OR"));
    let Value::List(condition) = &neutral[2] else {
        panic!("wrapped condition should transcode to a list, found {:?}", neutral[2]);
    };
    assert_eq!(condition[0].as_str(), Some("CONDITION"));

    let rebuilt = Stack::from_neutral(&neutral).expect("well-formed neutral form");
    assert_eq!(outer.render(), "(a) AND n < 3");
    assert_eq!(rebuilt.render(), "a AND n < 3", "presentation flags are not part of the neutral form");
}

#[test]
fn wrappers_obey_nesting_guards() {
    let stack = Stack::and();
    stack.push([Filters(stack.clone())]);
    assert_eq!(stack.err(), Some(StkError::SelfNesting));
    assert!(stack.is_empty());

    let guarded = Stack::list();
    guarded.set_no_nest(true).push([filters(&["a"])]);
    assert!(guarded.is_empty());
    assert!(guarded.err().is_some_and(|err| err.is_nesting_disabled()));
}

#[test]
fn condition_length_sees_through_wrapped_expressions() {
    let cond = Condition::new("k", ComparisonOperator::Eq, filters(&["a", "b", "c"]));
    assert_eq!(cond.len(), 3);
    assert_eq!(cond.render(), "k = (a OR b OR c)");
}
