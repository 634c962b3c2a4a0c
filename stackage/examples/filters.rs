use stackage::prelude::*;

#[derive(Debug, AsStack)]
struct Colours(Stack);

fn main() {
    let colours = Colours(Stack::list());
    colours.stack().set_delimiter(",").push(["red", "green", "blue"]);

    let any = Stack::or();
    any.set_paren(true).push([
        Condition::new("age", ComparisonOperator::Ge, 21),
        Condition::new("colour", SymbolOperator::new("IN"), colours),
    ]);

    let filter = Stack::and();
    filter.set_fold(true).push([Value::from("active"), Value::from(&any)]);
    println!("filter:   {filter}");

    match filter.unmarshal() {
        Ok(neutral) => println!("neutral:  {}", Value::List(neutral)),
        Err(err) => eprintln!("unmarshal failed: {err}"),
    }

    walk(&filter, |entry| {
        println!("{:indent$}{:?} {}", "", entry.path, entry.value, indent = entry.depth * 2);
        WalkControl::Continue
    });
}
