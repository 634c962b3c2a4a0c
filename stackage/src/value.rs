//! Element values.
//!
//! Every entry of a [`Stack`] is a [`Value`]: a closed sum over primitives, nested stacks
//! and conditions, generic collections, callables, opaque handles and user types that
//! expose a string rendering through [`Opaque`]. Rendering, traversal, equality and
//! transcoding all dispatch over this enum.
use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

use downcast_rs::{DowncastSync, impl_downcast};
use strum::{EnumDiscriminants, EnumIs};

use crate::{
    condition::Condition,
    stack::Stack,
    utils::error::StkResult,
};

/// User value with a string-rendering capability.
///
/// Implementors are pushed as [`Value::Opaque`]. Wrappers around a stack or condition
/// (see [`crate::alias`]) override [`Opaque::as_stack`] / [`Opaque::as_condition`] so
/// that the core treats them as the wrapped instance.
pub trait Opaque: DowncastSync + fmt::Display + fmt::Debug {
    /// The stack this value stands for, if any.
    fn as_stack(&self) -> Option<Stack> {
        None
    }

    /// The condition this value stands for, if any.
    fn as_condition(&self) -> Option<Condition> {
        None
    }

    /// A neutral representation used by unmarshalling and by the equality engine.
    fn neutral(&self) -> Option<Value> {
        None
    }
}
impl_downcast!(sync Opaque);

/// Signature of a native callable.
pub type NativeFn = dyn Fn(&[Value]) -> StkResult<Value> + Send + Sync;

/// Input/output shape of a [`Callable`].
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
pub struct Signature {
    pub inputs: Vec<ValueKind>,
    pub outputs: Vec<ValueKind>,
}

impl Signature {
    pub fn new(inputs: impl Into<Vec<ValueKind>>, outputs: impl Into<Vec<ValueKind>>) -> Self {
        Self {
            inputs: inputs.into(),
            outputs: outputs.into(),
        }
    }
}

/// A shared native function together with its declared [`Signature`].
#[derive(Clone)]
pub struct Callable {
    func: Arc<NativeFn>,
    signature: Signature,
}

impl Callable {
    pub fn new(
        signature: Signature,
        func: impl Fn(&[Value]) -> StkResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            func: Arc::new(func),
            signature,
        }
    }

    pub fn call(&self, args: &[Value]) -> StkResult<Value> {
        (self.func)(args)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns true when both callables share the same underlying function.
    pub fn same_fn(&self, other: &Callable) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Opaque handle compared by identity (channel or raw-pointer analogue).
#[derive(Clone)]
pub struct Handle(Arc<dyn Any + Send + Sync>);

impl Handle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Address of the shared allocation.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.addr())
    }
}

/// Record-like aggregate: a type name and its fields in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A single element of a stack, a condition expression, or a neutral-form entry.
#[derive(Debug, Clone, Default, EnumIs, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(Hash, PartialOrd, Ord))]
pub enum Value {
    /// Absent value. Never stored in a stack.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Nested container (shared handle).
    Stack(Stack),
    /// Nested condition (shared handle).
    Condition(Condition),
    /// Ordered collection. Fixed-size arrays and vectors both land here.
    List(Vec<Value>),
    /// Keyed collection.
    Map(BTreeMap<String, Value>),
    Record(Record),
    Func(Callable),
    Handle(Handle),
    /// Shared reference, transparently dereferenced by every algorithm.
    Ref(Arc<Value>),
    Opaque(Arc<dyn Opaque>),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Value {
    /// Wrap a user value exposing a string rendering.
    pub fn opaque<T: Opaque>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    /// Wrap a value behind a shared reference.
    pub fn shared(value: impl Into<Value>) -> Self {
        Value::Ref(Arc::new(value.into()))
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    /// Follow [`Value::Ref`] chains to the referenced value.
    pub fn resolve(&self) -> &Value {
        let mut current = self;
        while let Value::Ref(inner) = current {
            current = inner.as_ref();
        }
        current
    }

    /// The stack this value is or stands for (through references or alias wrappers).
    pub fn as_stack(&self) -> Option<Stack> {
        match self.resolve() {
            Value::Stack(stack) => Some(stack.clone()),
            Value::Opaque(opaque) => opaque.as_stack(),
            _ => None,
        }
    }

    /// The condition this value is or stands for (through references or alias wrappers).
    pub fn as_condition(&self) -> Option<Condition> {
        match self.resolve() {
            Value::Condition(condition) => Some(condition.clone()),
            Value::Opaque(opaque) => opaque.as_condition(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.resolve() {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.resolve() {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.resolve() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true for booleans, numbers and strings.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.resolve(),
            Value::Bool(_) | Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Str(_)
        )
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        fmt::Display::fmt(item, f)?;
    }
    Ok(())
}

fn write_kinds(f: &mut fmt::Formatter<'_>, kinds: &[ValueKind]) -> fmt::Result {
    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{kind}")?;
    }
    Ok(())
}

/// Canonical textual form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Stack(stack) => f.write_str(&stack.render()),
            Value::Condition(condition) => f.write_str(&condition.render()),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter(), " ")?;
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Record(record) => {
                write!(f, "{}{{", record.name)?;
                for (i, (name, value)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Func(callable) => {
                f.write_str("func(")?;
                write_kinds(f, &callable.signature.inputs)?;
                f.write_str(") -> (")?;
                write_kinds(f, &callable.signature.outputs)?;
                f.write_str(")")
            }
            Value::Handle(_) => f.write_str("<handle>"),
            Value::Ref(inner) => fmt::Display::fmt(inner.as_ref(), f),
            Value::Opaque(opaque) => fmt::Display::fmt(opaque.as_ref(), f),
        }
    }
}

macro_rules! impl_from_primitive {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )+
    };
}

impl_from_primitive!(Int as i64: i8, i16, i32, i64, isize);
impl_from_primitive!(UInt as u64: u8, u16, u32, u64, usize);
impl_from_primitive!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<Stack> for Value {
    fn from(value: Stack) -> Self {
        Value::Stack(value)
    }
}

impl From<&Stack> for Value {
    fn from(value: &Stack) -> Self {
        Value::Stack(value.clone())
    }
}

impl From<Condition> for Value {
    fn from(value: Condition) -> Self {
        Value::Condition(value)
    }
}

impl From<&Condition> for Value {
    fn from(value: &Condition) -> Self {
        Value::Condition(value.clone())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Func(value)
    }
}

impl From<Handle> for Value {
    fn from(value: Handle) -> Self {
        Value::Handle(value)
    }
}

impl From<Arc<dyn Opaque>> for Value {
    fn from(value: Arc<dyn Opaque>) -> Self {
        Value::Opaque(value)
    }
}

impl From<Arc<Value>> for Value {
    fn from(value: Arc<Value>) -> Self {
        Value::Ref(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(value: BTreeMap<String, T>) -> Self {
        Value::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Celsius(f64);

    impl fmt::Display for Celsius {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}C", self.0)
        }
    }

    impl Opaque for Celsius {}

    #[test]
    fn canonical_text() {
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-3i32).to_string(), "-3");
        assert_eq!(Value::from(7u8).to_string(), "7");
        assert_eq!(Value::from(1.5f64).to_string(), "1.5");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Nil.to_string(), "");
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "[1 2 3]");
        assert_eq!(Value::opaque(Celsius(21.5)).to_string(), "21.5C");
    }

    #[test]
    fn records_and_maps_render_in_order() {
        let record = Record::new("Point").field("x", 1).field("y", 2);
        assert_eq!(Value::from(record).to_string(), "Point{x: 1, y: 2}");

        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        assert_eq!(Value::from(map).to_string(), "{a: 1, b: 2}");
    }

    #[test]
    fn references_resolve_to_any_depth() {
        let v = Value::shared(Value::shared("deep"));
        assert_eq!(v.resolve().as_str(), Some("deep"));
        assert_eq!(v.to_string(), "deep");
        assert_eq!(v.kind(), ValueKind::Ref);
        assert_eq!(v.resolve().kind(), ValueKind::Str);
    }

    #[test]
    fn option_maps_to_nil() {
        assert!(Value::from(None::<i32>).is_nil());
        assert_eq!(Value::from(Some(4)).as_i64(), Some(4));
    }

    #[test]
    fn callables_share_identity_through_clones() {
        let f = Callable::new(Signature::new([ValueKind::Int], [ValueKind::Int]), |args| {
            Ok(args.first().cloned().unwrap_or_default())
        });
        let g = f.clone();
        assert!(f.same_fn(&g));
        assert_eq!(f.call(&[Value::from(9)]).unwrap().as_i64(), Some(9));
        assert_eq!(Value::from(f).to_string(), "func(Int) -> (Int)");
    }

    #[test]
    fn handles_downcast() {
        let handle = Handle::new(42u32);
        assert_eq!(handle.downcast_ref::<u32>(), Some(&42));
        assert_eq!(handle.clone().addr(), handle.addr());
        assert_ne!(Handle::new(42u32).addr(), handle.addr());
    }
}
