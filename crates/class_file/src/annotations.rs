// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.16

use std::io::{Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::attributes::AttributeInfo;
use crate::constant_pool::{Constant, ConstantPool};
use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Bound on `@`/`[` nesting during decode, so malformed input cannot
/// recurse without limit.
pub const MAX_NESTING_DEPTH: usize = 64;

/// The element_value union. The tag byte discriminates the payload; for
/// the nine primitive tags the exact byte is kept so re-encoding is
/// byte-identical.
#[derive(Debug, PartialEq, Clone)]
pub enum ElementValue {
    /// One of `B C D F I J S Z s`: a single index into the constant pool.
    Const { tag: u8, const_value_index: u16 },
    /// `e`: indices of the enum type descriptor and the constant name.
    Enum {
        type_name_index: u16,
        const_name_index: u16,
    },
    /// `c`: index of a descriptor naming a class literal.
    Class { class_info_index: u16 },
    /// `@`: a nested annotation.
    Annotation(Annotation),
    /// `[`: the element values of an array, in declared order.
    Array(Vec<ElementValue>),
}
impl ElementValue {
    /// Decodes one element_value from the start of `info`, returning it
    /// together with the number of bytes consumed. On an unknown tag the
    /// input is left untouched: zero bytes count as consumed.
    pub fn decode(info: &[u8]) -> Result<(ElementValue, usize)> {
        Self::decode_at(info, 0)
    }

    pub(crate) fn decode_at(info: &[u8], depth: usize) -> Result<(ElementValue, usize)> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(ClassFileError::NestingTooDeep(MAX_NESTING_DEPTH));
        }

        let mut r = Cursor::new(info);
        let tag = r.read_u8()?;
        let value = match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
                tag,
                const_value_index: r.read_u16::<Endian>()?,
            },
            b'e' => ElementValue::Enum {
                type_name_index: r.read_u16::<Endian>()?,
                const_name_index: r.read_u16::<Endian>()?,
            },
            b'c' => ElementValue::Class {
                class_info_index: r.read_u16::<Endian>()?,
            },
            b'@' => {
                let (annotation, consumed) = Annotation::decode_at(&info[1..], depth + 1)?;
                r.set_position(1 + consumed as u64);
                ElementValue::Annotation(annotation)
            }
            b'[' => {
                let num_values = r.read_u16::<Endian>()?;
                let mut skip = r.position() as usize;
                let mut values = Vec::with_capacity(num_values as usize);
                for _ in 0..num_values {
                    let (value, consumed) = ElementValue::decode_at(&info[skip..], depth + 1)?;
                    skip += consumed;
                    values.push(value);
                }
                r.set_position(skip as u64);
                ElementValue::Array(values)
            }
            _ => return Err(ClassFileError::InvalidTag(tag)),
        };

        Ok((value, r.position() as usize))
    }

    pub fn encode(&self, w: &mut impl Write) -> Result<()> {
        match self {
            ElementValue::Const {
                tag,
                const_value_index,
            } => {
                w.write_u8(*tag)?;
                w.write_u16::<Endian>(*const_value_index)?;
            }
            ElementValue::Enum {
                type_name_index,
                const_name_index,
            } => {
                w.write_u8(b'e')?;
                w.write_u16::<Endian>(*type_name_index)?;
                w.write_u16::<Endian>(*const_name_index)?;
            }
            ElementValue::Class { class_info_index } => {
                w.write_u8(b'c')?;
                w.write_u16::<Endian>(*class_info_index)?;
            }
            ElementValue::Annotation(annotation) => {
                w.write_u8(b'@')?;
                annotation.encode(w)?;
            }
            ElementValue::Array(values) => {
                // The count always comes from the stored element list.
                let num_values = u16::try_from(values.len())
                    .map_err(|_| ClassFileError::CountTooLarge(values.len()))?;
                w.write_u8(b'[')?;
                w.write_u16::<Endian>(num_values)?;
                for value in values {
                    value.encode(w)?;
                }
            }
        }
        Ok(())
    }

    /// Resolves this value one level against `pool`. Primitive, enum and
    /// class tags come back as pool lookups (`None` where the index
    /// dangles); nested annotations and arrays come back as the wrapper
    /// itself, for the caller to resolve further.
    pub fn resolve<'a>(&'a self, pool: &'a ConstantPool) -> ResolvedValue<'a> {
        match self {
            ElementValue::Const {
                const_value_index, ..
            } => ResolvedValue::Constant(pool.get(*const_value_index)),
            ElementValue::Enum {
                type_name_index,
                const_name_index,
            } => ResolvedValue::Enum {
                type_name: pool.get_utf8(*type_name_index),
                const_name: pool.get_utf8(*const_name_index),
            },
            ElementValue::Class { class_info_index } => {
                ResolvedValue::Constant(pool.get(*class_info_index))
            }
            ElementValue::Annotation(annotation) => ResolvedValue::Annotation(annotation),
            ElementValue::Array(values) => ResolvedValue::Array(values),
        }
    }
}

/// The result of resolving an [`ElementValue`] one level down.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ResolvedValue<'a> {
    Constant(Option<&'a Constant>),
    Enum {
        type_name: Option<&'a [u8]>,
        const_name: Option<&'a [u8]>,
    },
    Annotation(&'a Annotation),
    Array(&'a [ElementValue]),
}

#[derive(Debug, PartialEq, Clone)]
pub struct ElementValuePair {
    pub name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Annotation {
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}
impl Annotation {
    pub fn new(type_index: u16) -> Annotation {
        Annotation {
            type_index,
            element_value_pairs: Vec::new(),
        }
    }

    /// Decodes one annotation from the start of `info`, returning it
    /// together with the number of bytes consumed.
    pub fn decode(info: &[u8]) -> Result<(Annotation, usize)> {
        Self::decode_at(info, 0)
    }

    pub(crate) fn decode_at(info: &[u8], depth: usize) -> Result<(Annotation, usize)> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(ClassFileError::NestingTooDeep(MAX_NESTING_DEPTH));
        }

        let mut r = Cursor::new(info);
        let type_index = r.read_u16::<Endian>()?;
        let num_element_value_pairs = r.read_u16::<Endian>()?;

        let mut skip = r.position() as usize;
        let mut element_value_pairs = Vec::with_capacity(num_element_value_pairs as usize);
        for _ in 0..num_element_value_pairs {
            let mut rest = &info[skip..];
            let name_index = rest.read_u16::<Endian>()?;
            skip += 2;

            let (value, consumed) = ElementValue::decode_at(&info[skip..], depth)?;
            skip += consumed;

            element_value_pairs.push(ElementValuePair { name_index, value });
        }

        Ok((
            Annotation {
                type_index,
                element_value_pairs,
            },
            skip,
        ))
    }

    pub fn encode(&self, w: &mut impl Write) -> Result<()> {
        let num_element_value_pairs = u16::try_from(self.element_value_pairs.len())
            .map_err(|_| ClassFileError::CountTooLarge(self.element_value_pairs.len()))?;
        w.write_u16::<Endian>(self.type_index)?;
        w.write_u16::<Endian>(num_element_value_pairs)?;
        for pair in &self.element_value_pairs {
            w.write_u16::<Endian>(pair.name_index)?;
            pair.value.encode(w)?;
        }
        Ok(())
    }

    /// The annotation's type descriptor, resolved through `pool`.
    /// `type_index` may name the Utf8 directly or go through a class
    /// constant; either way the descriptor bytes come back.
    pub fn annotation_type<'a>(&self, pool: &'a ConstantPool) -> Option<&'a [u8]> {
        match pool.get(self.type_index)? {
            Constant::Utf8(bytes) => Some(bytes),
            Constant::Class(class_info) => class_info.name(pool),
            _ => None,
        }
    }

    /// Lazily resolves each (name, value) pair against `pool`. Values go
    /// through [`ElementValue::resolve`], so nested annotations and
    /// arrays come back as wrappers; that single level of resolution is
    /// part of the contract.
    pub fn key_value_pairs<'a>(
        &'a self,
        pool: &'a ConstantPool,
    ) -> impl Iterator<Item = (Option<&'a [u8]>, ResolvedValue<'a>)> + 'a {
        self.element_value_pairs
            .iter()
            .map(move |pair| (pool.get_utf8(pair.name_index), pair.value.resolve(pool)))
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct RuntimeVisibleAnnotationsAttribute {
    annotations: Vec<Annotation>,
}
impl RuntimeVisibleAnnotationsAttribute {
    /// Builds the attribute for a class file under construction. Interns
    /// the attribute name as a Utf8 constant in `pool`; the annotations
    /// keep the order they were given in.
    pub fn create(pool: &mut ConstantPool, annotations: Vec<Annotation>) -> Result<Self> {
        pool.add(Constant::Utf8(Self::NAME.as_bytes().to_vec()))?;
        Ok(Self { annotations })
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}
impl AttributeInfo for RuntimeVisibleAnnotationsAttribute {
    const NAME: &'static str = "RuntimeVisibleAnnotations";

    fn decode(info: &[u8]) -> Result<Self> {
        let mut rest = info;
        let num_annotations = rest.read_u16::<Endian>()?;
        log::trace!("parsing {num_annotations} runtime visible annotations");

        let mut skip = 2usize;
        let mut annotations = Vec::with_capacity(num_annotations as usize);
        for _ in 0..num_annotations {
            let (annotation, consumed) = Annotation::decode(&info[skip..])?;
            skip += consumed;
            annotations.push(annotation);
        }

        Ok(Self { annotations })
    }

    fn info(&self) -> Result<Vec<u8>> {
        let num_annotations = u16::try_from(self.annotations.len())
            .map_err(|_| ClassFileError::CountTooLarge(self.annotations.len()))?;

        let mut packed = Vec::new();
        packed.write_u16::<Endian>(num_annotations)?;
        for annotation in &self.annotations {
            annotation.encode(&mut packed)?;
        }
        Ok(packed)
    }
}
