use std::io::{BufReader, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::attributes::Attributes;
use crate::constant_pool::{ClassInfo, NameAndTypeInfo, RefInfo, StringInfo};

use super::{constant_pool::Constant, *};

type Result<T, E = ClassFileError> = std::result::Result<T, E>;
type Endian = BigEndian;

pub struct Parser<R> {
    r: BufReader<R>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: BufReader::new(r),
        }
    }

    pub fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;
        log::trace!("parsing constant pool, declared count {constant_pool_count}");

        let mut pool = ConstantPool::new();
        let mut index = 1u32;
        while index < u32::from(constant_pool_count) {
            let constant = self.parse_constant()?;
            // A long or double leaves the following slot empty.
            let width = u32::from(constant.width());
            pool.insert(index as u16, constant)?;
            index += width;
        }
        Ok(pool)
    }

    fn parse_constant(&mut self) -> Result<Constant> {
        let tag = self.read_u8()?;
        match tag {
            1 => self.parse_utf8(),
            3 => self.parse_integer(),
            4 => self.parse_float(),
            5 => self.parse_long(),
            6 => self.parse_double(),
            7 => self.parse_class_info(),
            8 => self.parse_string(),
            9 => Ok(Constant::FieldRef(self.parse_ref_info()?)),
            10 => Ok(Constant::MethodRef(self.parse_ref_info()?)),
            11 => Ok(Constant::InterfaceMethodRef(self.parse_ref_info()?)),
            12 => self.parse_name_and_type_info(),
            _ => Err(ClassFileError::InvalidConstantTag(tag)),
        }
    }

    fn parse_utf8(&mut self) -> Result<Constant> {
        let length = self.read_u16()?;
        let mut bytes = vec![0u8; length as usize];
        self.r.read_exact(&mut bytes)?;

        // Kept as raw modified-UTF-8 bytes; see Constant::Utf8.
        Ok(Constant::Utf8(bytes))
    }

    fn parse_integer(&mut self) -> Result<Constant> {
        Ok(Constant::Integer(self.read_i32()?))
    }

    fn parse_float(&mut self) -> Result<Constant> {
        // from_bits round-trips every bit pattern, NaN payloads included.
        Ok(Constant::Float(f32::from_bits(self.read_u32()?)))
    }

    fn parse_long(&mut self) -> Result<Constant> {
        Ok(Constant::Long(self.r.read_i64::<Endian>()?))
    }

    fn parse_double(&mut self) -> Result<Constant> {
        Ok(Constant::Double(f64::from_bits(self.r.read_u64::<Endian>()?)))
    }

    fn parse_class_info(&mut self) -> Result<Constant> {
        let name_index = self.read_u16()?;

        Ok(Constant::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<Constant> {
        let string_index = self.read_u16()?;

        Ok(Constant::String(StringInfo { string_index }))
    }

    fn parse_name_and_type_info(&mut self) -> Result<Constant> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(Constant::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let mut info = vec![0u8; attribute_length as usize];
        self.r.read_exact(&mut info)?;

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    pub fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}
