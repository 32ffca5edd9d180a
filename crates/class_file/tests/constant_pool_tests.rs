use pretty_assertions::assert_eq;

use javelin_class_file::{
    ClassFileError, ClassInfo, Constant, ConstantPool, NameAndTypeInfo, RefInfo, StringInfo,
};

fn encode(pool: &ConstantPool) -> Vec<u8> {
    let mut bytes = Vec::new();
    pool.encode(&mut bytes).unwrap();
    bytes
}

fn assert_round_trips(pool: &ConstantPool) {
    let bytes = encode(pool);
    let decoded = ConstantPool::decode(bytes.as_slice()).unwrap();
    assert_eq!(*pool, decoded);
    assert_eq!(bytes, encode(&decoded));
}

#[test]
fn test_every_tag_round_trips() {
    let mut pool = ConstantPool::new();
    pool.insert(1, Constant::Utf8(b"Foo".to_vec())).unwrap();
    pool.insert(2, Constant::Integer(-42)).unwrap();
    pool.insert(3, Constant::Float(1.5)).unwrap();
    pool.insert(4, Constant::Long(i64::MIN)).unwrap();
    // Slot 5 is the shadow of the long above.
    pool.insert(6, Constant::Double(2.25)).unwrap();
    pool.insert(8, Constant::Class(ClassInfo { name_index: 1 }))
        .unwrap();
    pool.insert(9, Constant::String(StringInfo { string_index: 1 }))
        .unwrap();
    pool.insert(
        10,
        Constant::FieldRef(RefInfo {
            class_index: 8,
            name_and_type_index: 13,
        }),
    )
    .unwrap();
    pool.insert(
        11,
        Constant::MethodRef(RefInfo {
            class_index: 8,
            name_and_type_index: 13,
        }),
    )
    .unwrap();
    pool.insert(
        12,
        Constant::InterfaceMethodRef(RefInfo {
            class_index: 8,
            name_and_type_index: 13,
        }),
    )
    .unwrap();
    pool.insert(
        13,
        Constant::NameAndType(NameAndTypeInfo {
            name_index: 1,
            descriptor_index: 1,
        }),
    )
    .unwrap();

    assert_round_trips(&pool);
}

#[test]
fn test_decode_known_bytes_and_reencode() {
    // {1: Utf8("Foo"), 2: Class(name_index = 1)}
    let bytes = vec![
        0x00, 0x03, // constant_pool_count
        0x01, 0x00, 0x03, b'F', b'o', b'o', // Utf8
        0x07, 0x00, 0x01, // Class
    ];

    let pool = ConstantPool::decode(bytes.as_slice()).unwrap();
    assert_eq!(Some(&Constant::Utf8(b"Foo".to_vec())), pool.get(1));
    assert_eq!(
        Some(&Constant::Class(ClassInfo { name_index: 1 })),
        pool.get(2)
    );
    assert_eq!(bytes, encode(&pool));
}

#[test]
fn test_nan_float_bits_survive_a_rewrite() {
    let bytes = vec![
        0x00, 0x02, // constant_pool_count
        0x04, 0x7F, 0xC0, 0x00, 0x01, // Float, a NaN with a payload
    ];

    let pool = ConstantPool::decode(bytes.as_slice()).unwrap();
    assert_eq!(bytes, encode(&pool));
}

#[test]
fn test_long_leaves_following_slot_empty() {
    let bytes = vec![
        0x00, 0x04, // constant_pool_count
        0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2A, // Long 42 in slots 1 and 2
        0x03, 0x00, 0x00, 0x00, 0x07, // Integer 7 in slot 3
    ];

    let pool = ConstantPool::decode(bytes.as_slice()).unwrap();
    assert_eq!(2, pool.len());
    assert_eq!(Some(&Constant::Long(42)), pool.get(1));
    assert_eq!(None, pool.get(2));
    assert_eq!(Some(&Constant::Integer(7)), pool.get(3));
    assert_eq!(bytes, encode(&pool));
}

#[test]
fn test_declared_count_for_trailing_double() {
    let mut pool = ConstantPool::new();
    pool.insert(1, Constant::Double(0.5)).unwrap();

    assert_eq!(3, pool.declared_count());
    assert_eq!(vec![0x00, 0x03], encode(&pool)[..2].to_vec());
}

#[test]
fn test_get_missing_index_is_soft() {
    let pool = ConstantPool::new();
    assert_eq!(None, pool.get(0));
    assert_eq!(None, pool.get(7));
    assert_eq!(
        &Constant::Integer(0),
        pool.get(7).unwrap_or(&Constant::Integer(0))
    );
}

#[test]
fn test_insert_overwrites_and_aliases() {
    let mut pool = ConstantPool::new();
    pool.insert(5, Constant::Utf8(b"Foo".to_vec())).unwrap();
    assert_eq!(Some(&Constant::Utf8(b"Foo".to_vec())), pool.get(5));

    pool.insert(5, Constant::Utf8(b"Bar".to_vec())).unwrap();
    assert_eq!(Some(&Constant::Utf8(b"Bar".to_vec())), pool.get(5));

    // A reference resolved before the overwrite follows the new value.
    let class_info = ClassInfo { name_index: 5 };
    assert_eq!(Some(&b"Bar"[..]), class_info.name(&pool));
    pool.insert(5, Constant::Utf8(b"Baz".to_vec())).unwrap();
    assert_eq!(Some(&b"Baz"[..]), class_info.name(&pool));
}

#[test]
fn test_insert_at_zero_is_malformed() {
    let mut pool = ConstantPool::new();
    assert!(matches!(
        pool.insert(0, Constant::Integer(1)),
        Err(ClassFileError::MalformedIndex)
    ));
}

#[test]
fn test_add_allocates_from_one() {
    let mut pool = ConstantPool::new();
    assert_eq!(1, pool.add(Constant::Integer(1)).unwrap());
    assert_eq!(2, pool.add(Constant::Integer(2)).unwrap());
    assert_eq!(3, pool.add(Constant::Integer(3)).unwrap());
}

#[test]
fn test_add_fills_the_lowest_gap() {
    let mut pool = ConstantPool::new();
    pool.insert(2, Constant::Integer(2)).unwrap();
    pool.insert(3, Constant::Integer(3)).unwrap();

    // Slot 1 is free even though the pool is not empty.
    assert_eq!(1, pool.add(Constant::Integer(1)).unwrap());
    assert_eq!(4, pool.add(Constant::Integer(4)).unwrap());
}

#[test]
fn test_resolution_accessors() {
    let mut pool = ConstantPool::new();
    pool.insert(1, Constant::Utf8(b"my/Owner".to_vec())).unwrap();
    pool.insert(2, Constant::Utf8(b"myField".to_vec())).unwrap();
    pool.insert(3, Constant::Utf8(b"I".to_vec())).unwrap();
    pool.insert(4, Constant::Class(ClassInfo { name_index: 1 }))
        .unwrap();
    pool.insert(
        5,
        Constant::NameAndType(NameAndTypeInfo {
            name_index: 2,
            descriptor_index: 3,
        }),
    )
    .unwrap();
    pool.insert(6, Constant::String(StringInfo { string_index: 2 }))
        .unwrap();

    let ref_info = RefInfo {
        class_index: 4,
        name_and_type_index: 5,
    };
    assert_eq!(Some(&b"my/Owner"[..]), ref_info.klass(&pool).unwrap().name(&pool));

    let name_and_type = ref_info.name_and_type(&pool).unwrap();
    assert_eq!(Some(&b"myField"[..]), name_and_type.name(&pool));
    assert_eq!(Some(&b"I"[..]), name_and_type.descriptor(&pool));

    match pool.get(6) {
        Some(Constant::String(string_info)) => {
            assert_eq!(Some(&b"myField"[..]), string_info.string(&pool))
        }
        other => panic!("expected a string constant, got {other:?}"),
    }

    // Dangling and wrongly-typed indices resolve softly.
    let dangling = RefInfo {
        class_index: 99,
        name_and_type_index: 1,
    };
    assert_eq!(None, dangling.klass(&pool));
    assert_eq!(None, dangling.name_and_type(&pool));
}

#[test]
fn test_unknown_constant_tag() {
    let bytes = vec![0x00, 0x02, 0x02];
    assert!(matches!(
        ConstantPool::decode(bytes.as_slice()),
        Err(ClassFileError::InvalidConstantTag(2))
    ));
}

#[test]
fn test_truncated_utf8_record() {
    let bytes = vec![0x00, 0x02, 0x01, 0x00, 0x05, b'F'];
    assert!(matches!(
        ConstantPool::decode(bytes.as_slice()),
        Err(ClassFileError::UnexpectedEndOfInput(_))
    ));
}

#[test]
fn test_encode_rejects_a_bare_gap() {
    let mut pool = ConstantPool::new();
    pool.insert(2, Constant::Integer(7)).unwrap();

    assert!(matches!(
        pool.encode(&mut Vec::new()),
        Err(ClassFileError::UnencodableSlot(1))
    ));
}

#[test]
fn test_encode_rejects_an_occupied_shadow_slot() {
    let mut pool = ConstantPool::new();
    pool.insert(1, Constant::Long(1)).unwrap();
    pool.insert(2, Constant::Integer(7)).unwrap();

    assert!(matches!(
        pool.encode(&mut Vec::new()),
        Err(ClassFileError::UnencodableSlot(2))
    ));
}

#[test]
fn test_empty_pool_encodes_as_count_one() {
    let pool = ConstantPool::new();
    assert_eq!(vec![0x00, 0x01], encode(&pool));
    assert_round_trips(&pool);
}
