use std::collections::{btree_map, BTreeMap};
use std::io::{Read, Write};

use crate::{parser::Parser, writer::Writer, ClassFileError, Result};

/// The constant_pool table, keyed by slot index.
///
/// Slot 0 is never occupied. A `Long` or `Double` occupies its own slot
/// plus the following one; the shadow slot stays empty and looking it up
/// yields `None`, the same as any other unoccupied index.
#[derive(Debug, Default, PartialEq)]
pub struct ConstantPool {
    constants: BTreeMap<u16, Constant>,
}
impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the constant at `index`, or `None` if the slot is empty.
    /// A missing slot is not an error; callers pick their own fallback.
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.constants.get(&index)
    }

    /// Returns the raw bytes of the `Utf8` constant at `index`. `None` if
    /// the slot is empty or holds a different kind of constant.
    pub fn get_utf8(&self, index: u16) -> Option<&[u8]> {
        self.get(index)?.as_utf8()
    }

    /// Stores `constant` at `index`, overwriting any previous occupant.
    /// Constants already holding that index as a reference will resolve
    /// to the new value from now on.
    pub fn insert(&mut self, index: u16, constant: Constant) -> Result<u16> {
        if index == 0 {
            return Err(ClassFileError::MalformedIndex);
        }
        self.constants.insert(index, constant);
        Ok(index)
    }

    /// Stores `constant` at the first free slot, scanning upward from 1,
    /// and returns the chosen index.
    pub fn add(&mut self, constant: Constant) -> Result<u16> {
        let index = (1..=u16::MAX)
            .find(|i| !self.constants.contains_key(i))
            .ok_or(ClassFileError::PoolExhausted)?;
        self.constants.insert(index, constant);
        Ok(index)
    }

    /// Number of occupied slots. Shadow slots do not count.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// The constant_pool_count a class file would declare for this pool:
    /// one past the last slot, counting the shadow slot of a trailing
    /// long or double. 1 for an empty pool.
    pub fn declared_count(&self) -> u16 {
        self.constants
            .last_key_value()
            .map(|(index, constant)| index.saturating_add(constant.width()))
            .unwrap_or(1)
    }

    pub fn decode(r: impl Read) -> Result<ConstantPool> {
        Parser::new(r).parse_constant_pool()
    }

    pub fn encode(&self, w: impl Write) -> Result<()> {
        Writer::new(w).write_constant_pool(self)
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = (&'a u16, &'a Constant);
    type IntoIter = btree_map::Iter<'a, u16, Constant>;

    /// Iterates occupied slots in ascending index order.
    fn into_iter(self) -> Self::IntoIter {
        self.constants.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Constant {
    /// Raw modified-UTF-8 bytes, stored unwrapped and undecoded so a
    /// rewrite emits them byte for byte.
    Utf8(Vec<u8>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
}
impl Constant {
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => 1,
            Constant::Integer(_) => 3,
            Constant::Float(_) => 4,
            Constant::Long(_) => 5,
            Constant::Double(_) => 6,
            Constant::Class(_) => 7,
            Constant::String(_) => 8,
            Constant::FieldRef(_) => 9,
            Constant::MethodRef(_) => 10,
            Constant::InterfaceMethodRef(_) => 11,
            Constant::NameAndType(_) => 12,
        }
    }

    /// Number of slots this constant occupies: 2 for `Long` and `Double`,
    /// 1 for everything else.
    pub fn width(&self) -> u16 {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    pub fn as_utf8(&self) -> Option<&[u8]> {
        match self {
            Constant::Utf8(bytes) => Some(bytes),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // Must point at a CONSTANT_Utf8_info holding a binary class or
    // interface name in internal form.
    pub name_index: u16,
}
impl ClassInfo {
    /// Resolves `name_index` against `pool`. Resolution happens on every
    /// call; `None` for a dangling or non-Utf8 index.
    pub fn name<'a>(&self, pool: &'a ConstantPool) -> Option<&'a [u8]> {
        pool.get_utf8(self.name_index)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}
impl StringInfo {
    pub fn string<'a>(&self, pool: &'a ConstantPool) -> Option<&'a [u8]> {
        pool.get_utf8(self.string_index)
    }
}

/// Shared layout of CONSTANT_Fieldref, CONSTANT_Methodref and
/// CONSTANT_InterfaceMethodref.
#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}
impl RefInfo {
    pub fn klass<'a>(&self, pool: &'a ConstantPool) -> Option<&'a ClassInfo> {
        match pool.get(self.class_index)? {
            Constant::Class(class_info) => Some(class_info),
            _ => None,
        }
    }

    pub fn name_and_type<'a>(&self, pool: &'a ConstantPool) -> Option<&'a NameAndTypeInfo> {
        match pool.get(self.name_and_type_index)? {
            Constant::NameAndType(name_and_type_info) => Some(name_and_type_info),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}
impl NameAndTypeInfo {
    pub fn name<'a>(&self, pool: &'a ConstantPool) -> Option<&'a [u8]> {
        pool.get_utf8(self.name_index)
    }

    pub fn descriptor<'a>(&self, pool: &'a ConstantPool) -> Option<&'a [u8]> {
        pool.get_utf8(self.descriptor_index)
    }
}
