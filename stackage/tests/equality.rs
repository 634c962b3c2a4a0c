use std::fmt;

use stackage::prelude::*;

#[derive(Debug)]
struct Celsius(f64);

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}C", self.0)
    }
}

impl Opaque for Celsius {}

#[derive(Debug)]
struct Fahrenheit(f64);

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}C", self.0)
    }
}

impl Opaque for Fahrenheit {}

#[derive(Debug)]
struct Tagged(&'static str);

impl fmt::Display for Tagged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Opaque for Tagged {
    fn neutral(&self) -> Option<Value> {
        Some(Value::from(self.0.to_lowercase()))
    }
}

fn sample() -> Stack {
    let inner = Stack::or();
    inner.set_paren(true).push(["b", "c"]);
    let stack = Stack::and();
    stack.push([
        Value::from("a"),
        Value::from(inner),
        Value::from(Condition::new("n", ComparisonOperator::Lt, 5)),
    ]);
    stack
}

#[test]
fn equality_is_reflexive() {
    let stack = sample();
    assert!(stack.is_equal(&stack).is_ok());
    assert!(is_equal(&Value::from(&stack), &Value::from(&stack)).is_ok());
    assert_eq!(stack, stack.clone());
}

#[test]
fn independently_built_trees_are_equal() {
    assert!(sample().is_equal(&sample()).is_ok());
    assert_eq!(sample(), sample());
}

#[test]
fn stacks_holding_nan_are_equal() {
    let build = || {
        let stack = Stack::list();
        stack.push([Value::from(f64::NAN), Value::from(1.5)]);
        stack
    };
    let (left, right) = (build(), build());
    assert!(left.is_equal(&left).is_ok());
    assert!(left.is_equal(&right).is_ok());
    assert_eq!(left, right);
}

#[test]
fn configuration_differences_are_reported() {
    let a = sample();
    let b = sample();
    b.set_fold(true);
    assert!(a.is_equal(&b).unwrap_err().is_value_mismatch());

    let c = sample();
    c.set_category("other");
    assert!(a.is_equal(&c).is_err());

    assert!(Stack::and().is_equal(&Stack::or()).unwrap_err().is_kind_mismatch());
    assert!(Stack::and_with_capacity(2).is_equal(&Stack::and()).is_err());
}

#[test]
fn nested_differences_are_found() {
    let a = sample();
    let b = sample();
    let inner = b.index(1).and_then(|v| v.as_stack()).expect("nested stack");
    inner.replace("z", 1);
    assert!(a.is_equal(&b).is_err());

    let c = sample();
    c.pop();
    assert_eq!(a.is_equal(&c), Err(StkError::LengthMismatch { left: 3, right: 2 }));
}

#[test]
fn conditions_compare_field_by_field() {
    let a = Condition::new("n", ComparisonOperator::Lt, 5);
    assert!(a.is_equal(&Condition::new("n", ComparisonOperator::Lt, 5)).is_ok());
    assert!(a.is_equal(&Condition::new("m", ComparisonOperator::Lt, 5)).is_err());
    assert!(a.is_equal(&Condition::new("n", ComparisonOperator::Le, 5)).is_err());
    assert!(a.is_equal(&Condition::new("n", SymbolOperator::new("<"), 5)).is_err());
    assert!(a.is_equal(&Condition::new("n", ComparisonOperator::Lt, 6)).is_err());
}

#[test]
fn opaque_values_compare_by_type_and_text() {
    let a = Value::opaque(Celsius(20.0));
    assert!(is_equal(&a, &a.clone()).is_ok(), "same instance");
    assert!(is_equal(&a, &Value::opaque(Celsius(20.0))).is_ok());
    assert!(is_equal(&a, &Value::opaque(Celsius(21.0))).is_err());
    assert!(
        is_equal(&a, &Value::opaque(Fahrenheit(20.0))).unwrap_err().is_kind_mismatch(),
        "equal text with different concrete types must differ"
    );
}

#[test]
fn opaque_values_prefer_neutral_forms() {
    assert!(is_equal(&Value::opaque(Tagged("ABC")), &Value::opaque(Tagged("abc"))).is_ok());
    assert!(is_equal(&Value::opaque(Tagged("ABC")), &Value::opaque(Tagged("abd"))).is_err());
}

#[test]
fn nil_only_equals_nil() {
    assert!(is_equal(&Value::Nil, &Value::Nil).is_ok());
    assert!(is_equal(&Value::Nil, &Value::from(0)).is_err());
    assert!(is_equal(&Value::from(0), &Value::Nil).is_err());
}

#[test]
fn lists_compare_in_order() {
    let ab = Value::from(["a", "b"]);
    assert_eq!(ab, Value::from(vec!["a", "b"]));
    assert_ne!(ab, Value::from(["b", "a"]));
    assert_eq!(
        is_equal(&ab, &Value::from(["a"])),
        Err(StkError::LengthMismatch { left: 2, right: 1 })
    );
}

#[test]
fn equality_policy_on_the_right_applies_when_left_has_none() {
    let a = Stack::list();
    a.push(["x"]);
    let b = Stack::list();
    b.push(["y"]);
    b.set_equality_policy(|left, right| {
        if left.to_string().len() == right.to_string().len() {
            Ok(())
        } else {
            Err(StkError::custom("different lengths"))
        }
    });
    assert!(a.is_equal(&b).is_ok());
}
