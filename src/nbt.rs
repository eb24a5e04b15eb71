//! Binary tag (NBT) values and builders.
//!
//! Compound keys keep insertion order. Lists are homogeneous: the first
//! element fixes the element type for the rest.

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryTagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NbtError {
    #[error("cannot add a {actual:?} tag to a list of {expected:?} tags")]
    ListTypeMismatch {
        expected: BinaryTagType,
        actual: BinaryTagType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(ListBinaryTag),
    Compound(CompoundBinaryTag),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl BinaryTag {
    pub fn tag_type(&self) -> BinaryTagType {
        match self {
            BinaryTag::Byte(_) => BinaryTagType::Byte,
            BinaryTag::Short(_) => BinaryTagType::Short,
            BinaryTag::Int(_) => BinaryTagType::Int,
            BinaryTag::Long(_) => BinaryTagType::Long,
            BinaryTag::Float(_) => BinaryTagType::Float,
            BinaryTag::Double(_) => BinaryTagType::Double,
            BinaryTag::ByteArray(_) => BinaryTagType::ByteArray,
            BinaryTag::String(_) => BinaryTagType::String,
            BinaryTag::List(_) => BinaryTagType::List,
            BinaryTag::Compound(_) => BinaryTagType::Compound,
            BinaryTag::IntArray(_) => BinaryTagType::IntArray,
            BinaryTag::LongArray(_) => BinaryTagType::LongArray,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompoundBinaryTag {
    tags: IndexMap<String, BinaryTag>,
}

impl CompoundBinaryTag {
    pub fn get(&self, key: &str) -> Option<&BinaryTag> {
        self.tags.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListBinaryTag {
    element_type: BinaryTagType,
    tags: Vec<BinaryTag>,
}

impl Default for ListBinaryTag {
    fn default() -> Self {
        Self {
            element_type: BinaryTagType::End,
            tags: Vec::new(),
        }
    }
}

impl ListBinaryTag {
    /// `End` while the list is empty.
    pub fn element_type(&self) -> BinaryTagType {
        self.element_type
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinaryTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CompoundBuilder {
    tags: IndexMap<String, BinaryTag>,
}

impl CompoundBuilder {
    /// Replaces any tag already stored under `key`.
    pub fn put(&mut self, key: impl Into<String>, tag: BinaryTag) -> &mut Self {
        self.tags.insert(key.into(), tag);
        self
    }

    pub fn put_byte(&mut self, key: impl Into<String>, value: i8) -> &mut Self {
        self.put(key, BinaryTag::Byte(value))
    }

    /// Booleans are stored as bytes.
    pub fn put_boolean(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.put_byte(key, value as i8)
    }

    pub fn put_short(&mut self, key: impl Into<String>, value: i16) -> &mut Self {
        self.put(key, BinaryTag::Short(value))
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.put(key, BinaryTag::Int(value))
    }

    pub fn put_long(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.put(key, BinaryTag::Long(value))
    }

    pub fn put_float(&mut self, key: impl Into<String>, value: f32) -> &mut Self {
        self.put(key, BinaryTag::Float(value))
    }

    pub fn put_double(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.put(key, BinaryTag::Double(value))
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key, BinaryTag::String(value.into()))
    }

    pub fn put_compound(&mut self, key: impl Into<String>, value: CompoundBinaryTag) -> &mut Self {
        self.put(key, BinaryTag::Compound(value))
    }

    pub fn put_list(&mut self, key: impl Into<String>, value: ListBinaryTag) -> &mut Self {
        self.put(key, BinaryTag::List(value))
    }

    pub fn build(self) -> CompoundBinaryTag {
        CompoundBinaryTag { tags: self.tags }
    }
}

#[derive(Debug, Default)]
pub struct ListBuilder {
    list: ListBinaryTag,
}

impl ListBuilder {
    pub fn add(&mut self, tag: BinaryTag) -> Result<&mut Self, NbtError> {
        let actual = tag.tag_type();
        if self.list.tags.is_empty() {
            self.list.element_type = actual;
        } else if self.list.element_type != actual {
            return Err(NbtError::ListTypeMismatch {
                expected: self.list.element_type,
                actual,
            });
        }
        self.list.tags.push(tag);
        Ok(self)
    }

    pub fn build(self) -> ListBinaryTag {
        self.list
    }
}

/// Builds a compound tag in place.
pub fn compound_binary_tag(build: impl FnOnce(&mut CompoundBuilder)) -> CompoundBinaryTag {
    let mut builder = CompoundBuilder::default();
    build(&mut builder);
    builder.build()
}

/// Builds a list tag in place. Fails on the first element of a different type.
pub fn list_binary_tag(
    build: impl FnOnce(&mut ListBuilder) -> Result<(), NbtError>,
) -> Result<ListBinaryTag, NbtError> {
    let mut builder = ListBuilder::default();
    build(&mut builder)?;
    Ok(builder.build())
}

pub fn list_of(tags: impl IntoIterator<Item = BinaryTag>) -> Result<ListBinaryTag, NbtError> {
    list_binary_tag(|builder| {
        for tag in tags {
            builder.add(tag)?;
        }
        Ok(())
    })
}

// SNBT rendering

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    write!(f, "{}", quote)?;
    for c in value.chars() {
        if c == quote || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, "{}", quote)
}

fn write_array<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    prefix: char,
    suffix: &str,
    values: &[T],
) -> fmt::Result {
    write!(f, "[{};", prefix)?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}{}", value, suffix)?;
    }
    write!(f, "]")
}

impl fmt::Display for BinaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryTag::Byte(v) => write!(f, "{}b", v),
            BinaryTag::Short(v) => write!(f, "{}s", v),
            BinaryTag::Int(v) => write!(f, "{}", v),
            BinaryTag::Long(v) => write!(f, "{}L", v),
            BinaryTag::Float(v) => write!(f, "{:?}f", v),
            BinaryTag::Double(v) => write!(f, "{:?}d", v),
            BinaryTag::ByteArray(v) => write_array(f, 'B', "b", v),
            BinaryTag::String(v) => write_quoted(f, v),
            BinaryTag::List(v) => write!(f, "{}", v),
            BinaryTag::Compound(v) => write!(f, "{}", v),
            BinaryTag::IntArray(v) => write_array(f, 'I', "", v),
            BinaryTag::LongArray(v) => write_array(f, 'L', "L", v),
        }
    }
}

impl fmt::Display for ListBinaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", tag)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for CompoundBinaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, tag)) in self.tags.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if is_plain_key(key) {
                write!(f, "{}", key)?;
            } else {
                write_quoted(f, key)?;
            }
            write!(f, ":{}", tag)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_keeps_order_and_replaces() {
        let tag = compound_binary_tag(|b| {
            b.put_string("Name", "Excalibur")
                .put_int("Damage", 1)
                .put_boolean("Unbreakable", true)
                .put_int("Damage", 2);
        });

        assert_eq!(tag.keys().collect::<Vec<_>>(), ["Name", "Damage", "Unbreakable"]);
        assert_eq!(tag.get("Damage"), Some(&BinaryTag::Int(2)));
        assert_eq!(tag.get("Unbreakable"), Some(&BinaryTag::Byte(1)));
        assert_eq!(tag.len(), 3);
    }

    #[test]
    fn test_list_rejects_mixed_types() {
        let result = list_of([BinaryTag::Int(1), BinaryTag::String("x".to_string())]);
        assert_eq!(
            result,
            Err(NbtError::ListTypeMismatch {
                expected: BinaryTagType::Int,
                actual: BinaryTagType::String,
            })
        );
    }

    #[test]
    fn test_list_element_type() {
        let empty = list_of(Vec::<BinaryTag>::new()).unwrap();
        assert_eq!(empty.element_type(), BinaryTagType::End);
        assert!(empty.is_empty());

        let ints = list_binary_tag(|b| {
            b.add(BinaryTag::Int(1))?.add(BinaryTag::Int(2))?;
            Ok(())
        })
        .unwrap();
        assert_eq!(ints.element_type(), BinaryTagType::Int);
        assert_eq!(ints.len(), 2);
    }

    #[test]
    fn test_snbt_rendering() {
        let lore = list_of([
            BinaryTag::String("first".to_string()),
            BinaryTag::String("say \"hi\"".to_string()),
        ])
        .unwrap();

        let tag = compound_binary_tag(|b| {
            b.put_byte("Count", 1)
                .put_short("s", -2)
                .put_long("Time", 5)
                .put_float("f", 0.5)
                .put_double("d", 1.0)
                .put_list("Lore", lore)
                .put("ids", BinaryTag::IntArray(vec![1, 2]))
                .put("display name", BinaryTag::ByteArray(vec![3]))
                .put_compound("Empty", CompoundBinaryTag::default());
        });

        assert_eq!(
            tag.to_string(),
            r#"{Count:1b,s:-2s,Time:5L,f:0.5f,d:1.0d,Lore:["first",'say "hi"'],ids:[I;1,2],"display name":[B;3b],Empty:{}}"#
        );
    }

    #[test]
    fn test_snbt_escapes_quotes() {
        let tag = BinaryTag::String("it's \"quoted\"".to_string());
        assert_eq!(tag.to_string(), r#""it's \"quoted\"""#);
    }
}
