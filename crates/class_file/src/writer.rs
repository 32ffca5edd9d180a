use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::attributes::Attributes;

use super::{constant_pool::Constant, *};

type Result<T, E = ClassFileError> = std::result::Result<T, E>;
type Endian = BigEndian;

pub struct Writer<W> {
    w: W,
}
impl<W: Write> Writer<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn write_constant_pool(&mut self, pool: &ConstantPool) -> Result<()> {
        // Slot numbers only run up to constant_pool_count - 1, a u16.
        if let Some((&index, constant)) = pool.into_iter().next_back() {
            if index as u32 + constant.width() as u32 > u16::MAX as u32 {
                return Err(ClassFileError::UnencodableSlot(index));
            }
        }

        let constant_pool_count = pool.declared_count();
        log::trace!("writing constant pool, declared count {constant_pool_count}");
        self.write_u16(constant_pool_count)?;

        // Slots must be contiguous on the wire: the only gap the format
        // can express is the shadow slot after a long or double.
        let mut expected = 1u16;
        for (&index, constant) in pool {
            if index != expected {
                return Err(ClassFileError::UnencodableSlot(expected.min(index)));
            }
            self.write_constant(constant)?;
            expected = index + constant.width();
        }
        Ok(())
    }

    fn write_constant(&mut self, constant: &Constant) -> Result<()> {
        self.write_u8(constant.tag())?;
        match constant {
            Constant::Utf8(bytes) => {
                let length = u16::try_from(bytes.len())
                    .map_err(|_| ClassFileError::Utf8TooLong(bytes.len()))?;
                self.write_u16(length)?;
                self.w.write_all(bytes)?;
            }
            Constant::Integer(value) => self.w.write_i32::<Endian>(*value)?,
            Constant::Float(value) => self.w.write_u32::<Endian>(value.to_bits())?,
            Constant::Long(value) => self.w.write_i64::<Endian>(*value)?,
            Constant::Double(value) => self.w.write_u64::<Endian>(value.to_bits())?,
            Constant::Class(class_info) => self.write_u16(class_info.name_index)?,
            Constant::String(string_info) => self.write_u16(string_info.string_index)?,
            Constant::FieldRef(ref_info)
            | Constant::MethodRef(ref_info)
            | Constant::InterfaceMethodRef(ref_info) => {
                self.write_u16(ref_info.class_index)?;
                self.write_u16(ref_info.name_and_type_index)?;
            }
            Constant::NameAndType(name_and_type_info) => {
                self.write_u16(name_and_type_info.name_index)?;
                self.write_u16(name_and_type_info.descriptor_index)?;
            }
        }
        Ok(())
    }

    fn write_attribute(&mut self, attribute: &Attribute) -> Result<()> {
        self.write_u16(attribute.attribute_name_index)?;
        self.write_u32(attribute.info.len() as u32)?;
        self.w.write_all(&attribute.info)?;
        Ok(())
    }

    pub fn write_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        let attributes_count = u16::try_from(attributes.0.len())
            .map_err(|_| ClassFileError::CountTooLarge(attributes.0.len()))?;
        self.write_u16(attributes_count)?;
        attributes
            .0
            .iter()
            .try_for_each(|attribute| self.write_attribute(attribute))
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        Ok(self.w.write_u32::<Endian>(value)?)
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        Ok(self.w.write_u16::<Endian>(value)?)
    }

    fn write_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.w.write_u8(value)?)
    }
}
