use stackage::prelude::*;

#[test]
fn readme_filter_example_compiles_and_behaves() {
    let any = Stack::or();
    any.set_paren(true).push([
        Condition::new("age", ComparisonOperator::Ge, 21),
        Condition::new("vip", ComparisonOperator::Eq, true),
    ]);

    let filter = Stack::and();
    filter.push([Value::from("active"), Value::from(&any)]);
    assert_eq!(filter.to_string(), "active AND (age >= 21 OR vip = true)");
    assert_eq!(
        filter.traverse(&[1, 0]).map(|v| v.to_string()).as_deref(),
        Some("age >= 21")
    );
}

#[test]
fn readme_wrapper_example_compiles_and_behaves() {
    #[derive(Debug, AsStack)]
    struct Filters(Stack);

    let filters = Filters(Stack::or());
    filters.stack().push(["a", "b"]);

    let outer = Stack::and();
    outer.push([Value::from("x"), Value::from(filters)]);
    assert_eq!(outer.to_string(), "x AND a OR b");
}
