use crate::{Attribute, Result};

use super::ConstantPool;

/// A named attribute kind. An attribute table reader dispatches on
/// `NAME` after reading the u32 length prefix, hands the raw info bytes
/// to `decode`, and gets them back from `info` when writing.
pub trait AttributeInfo: Sized {
    const NAME: &'static str;

    fn decode(info: &[u8]) -> Result<Self>;
    fn info(&self) -> Result<Vec<u8>>;
}

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        for a in &self.0 {
            let Some(s) = constant_pool.get_utf8(a.attribute_name_index) else {
                continue;
            };

            if s == name.as_bytes() {
                return Some(a);
            }
        }

        None
    }

    /// Finds the attribute named `A::NAME` and decodes it. `None` if the
    /// table has no such attribute or its info bytes do not decode.
    pub fn decode_attribute<A: AttributeInfo>(&self, constant_pool: &ConstantPool) -> Option<A> {
        A::decode(&self.find_by_name(A::NAME, constant_pool)?.info).ok()
    }
}
