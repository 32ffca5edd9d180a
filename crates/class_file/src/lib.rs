// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

pub mod annotations;
pub mod attributes;
mod constant_pool;
mod error;
mod parser;
mod writer;

use std::fmt;

pub use constant_pool::{
    ClassInfo, Constant, ConstantPool, NameAndTypeInfo, RefInfo, StringInfo,
};
pub use error::ClassFileError;
pub use parser::Parser;
pub use writer::Writer;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

/// A raw attribute as it sits in an attribute table: a name index into
/// the constant pool plus the undecoded info bytes. Attribute kinds that
/// understand their info implement [`attributes::AttributeInfo`].
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
