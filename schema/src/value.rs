use std::collections::BTreeMap;
use std::fmt;

/// This type holds dynamic configuration data.
///
/// A value can represent any field shape a loader populates. Messages are a
/// name plus a field map; a field that is absent from the map is *unset*,
/// which is how wrapper and nested-message fields express "null". Reading an
/// absent scalar field through a loader yields that scalar's zero value.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, String>),
    Message(String, BTreeMap<String, Value>),
}

impl Value {
    /// Creates an empty message value named `name`.
    pub fn message(name: &str) -> Value {
        Value::Message(name.to_owned(), BTreeMap::new())
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// A convenience method to get the items out of a [List](#variant.List).
    /// Returns an empty slice for other value kinds.
    pub fn as_list(&self) -> &[Value] {
        match *self {
            Value::List(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to get the entries out of a [Map](#variant.Map).
    /// Returns `None` for other value kinds.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match *self {
            Value::Map(ref entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of items in a [List](#variant.List) or entries in a
    /// [Map](#variant.Map). Returns `0` for other value kinds.
    pub fn len(&self) -> usize {
        match *self {
            Value::List(ref values) => values.len(),
            Value::Map(ref entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this value equals the zero value of its kind. Lists and maps
    /// are zero when empty; messages are never zero.
    pub fn is_zero(&self) -> bool {
        match *self {
            Value::Bool(value) => !value,
            Value::Int32(value) => value == 0,
            Value::Int64(value) => value == 0,
            Value::UInt32(value) => value == 0,
            Value::UInt64(value) => value == 0,
            Value::Float(value) => value == 0.0,
            Value::Double(value) => value == 0.0,
            Value::String(ref value) => value.is_empty(),
            Value::List(ref values) => values.is_empty(),
            Value::Map(ref entries) => entries.is_empty(),
            Value::Message(..) => false,
        }
    }

    /// A convenience method to extract a field out of a [Message](#variant.Message).
    /// Returns `None` for other value kinds or if the field is unset.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Message(_, ref fields) => fields.get(name),
            _ => None,
        }
    }

    /// A convenience method to update a field on a [Message](#variant.Message).
    /// Does nothing for other value kinds.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Value::Message(_, ref mut fields) = *self {
            fields.insert(name.to_owned(), value);
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Bool(value) => value.fmt(f),
            Value::Int32(value) => value.fmt(f),
            Value::Int64(value) => value.fmt(f),
            Value::UInt32(value) => value.fmt(f),
            Value::UInt64(value) => value.fmt(f),
            Value::Float(value) => value.fmt(f),
            Value::Double(value) => value.fmt(f),
            Value::String(ref value) => value.fmt(f),
            Value::List(ref values) => values.fmt(f),
            Value::Map(ref entries) => entries.fmt(f),

            Value::Message(ref name, ref fields) => {
                let mut first = true;
                write!(f, "{} {{", name)?;

                // BTreeMap iterates in key order, so the output is stable.
                for (key, value) in fields {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, value)?;
                }

                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_basic() {
        let value = Value::List(vec![
            Value::Bool(true),
            Value::Int32(-1),
            Value::UInt64(1),
            Value::Double(0.5),
            Value::String("abc".to_owned()),
            Value::Map(BTreeMap::from([("a".to_owned(), "1".to_owned())])),
            Value::Message("Obj".to_owned(), {
                let mut map = BTreeMap::new();
                map.insert("key1".to_owned(), Value::String("value1".to_owned()));
                map.insert("key2".to_owned(), Value::String("value2".to_owned()));
                map
            }),
        ]);

        let items = value.as_list();
        assert_eq!(value.len(), 7);
        assert!(items[0].as_bool());
        assert_eq!(items[5].len(), 1);
        assert_eq!(value.get("key1"), None);
        assert_eq!(
            items[6].get("key1"),
            Some(&Value::String("value1".to_owned()))
        );

        assert_eq!(
            format!("{:?}", value),
            "[true, -1, 1, 0.5, \"abc\", {\"a\": \"1\"}, Obj {key1: \"value1\", key2: \"value2\"}]"
        );
    }

    #[test]
    fn value_set() {
        let mut value = Value::message("Foo");
        assert_eq!(value.get("x"), None);

        value.set("x", Value::Int32(123));
        value.set("y", Value::Int32(456));
        assert_eq!(value.get("x"), Some(&Value::Int32(123)));
        assert_eq!(value.get("y"), Some(&Value::Int32(456)));

        value.set("x", Value::Int32(789));
        assert_eq!(value.get("x"), Some(&Value::Int32(789)));

        let mut list = Value::List(vec![]);
        list.set("x", Value::Int32(1));
        assert!(list.is_empty());
    }

    #[test]
    fn value_zero() {
        assert!(Value::String(String::new()).is_zero());
        assert!(Value::Bool(false).is_zero());
        assert!(Value::Float(0.0).is_zero());
        assert!(Value::List(vec![]).is_zero());
        assert!(!Value::UInt32(7).is_zero());
        assert!(!Value::message("Foo").is_zero());
    }
}
