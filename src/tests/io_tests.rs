//! Round-trip and failure-path tests driven entirely through
//! the public API, against real files in a temp directory.

use std::path::Path;

use ndarray::{s, Array2, ArrayD, IxDyn};
use tempfile::tempdir;

use corroics::{read, read_data, write, CorroicsError, IcsArray};

/// Writes a raw ICS file by hand: separator line, the given
/// header lines, `end`, then `data`.
fn craft_ics(path : &Path, lines : &[&str], data : &[u8]) {
    let mut text = String::from("\t\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("end\n");
    let mut bytes = text.into_bytes();
    bytes.extend_from_slice(data);
    std::fs::write(path, bytes).unwrap();
}

fn roundtrip_case<T>(name : &str, shape : &[usize], samples : Vec<T>)
where
    T : Clone + PartialEq + std::fmt::Debug,
    IcsArray : From<ArrayD<T>>,
{
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    let source = IcsArray::from(
        ArrayD::from_shape_vec(IxDyn(shape), samples).unwrap()
    );

    write(&path, &source, false).unwrap();
    let decoded = read_data(&path, false).unwrap();

    assert_eq!(decoded.sample_type(), source.sample_type());
    assert_eq!(decoded.shape(), shape);
    assert_eq!(decoded, source);
}

#[test]
fn two_by_three_float_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("two_by_three.ics");

    let source = Array2::from_shape_vec(
        (2, 3),
        vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]
    ).unwrap();
    let data = IcsArray::from(source.clone().into_dyn());

    write(&path, &data, false).unwrap();

    let loaded = read(&path, false).unwrap();
    assert_eq!(loaded.header, "<empty>");
    match loaded.data {
        IcsArray::Float64(arr) => assert_eq!(arr, source.into_dyn()),
        other => panic!("decoded to the wrong sample type: {:?}", other),
    }
}

#[test]
fn roundtrips_preserve_shape_type_and_contents() {
    roundtrip_case("u8.ics", &[5], (0u8..5).collect());
    roundtrip_case("i8.ics", &[2, 2], vec![-1i8, 2, -3, 4]);
    roundtrip_case("u16.ics", &[3, 2], (0u16..6).map(|v| v * 1000).collect());
    roundtrip_case("i16.ics", &[2, 3], vec![-30000i16, 0, 42, 7, -7, 30000]);
    roundtrip_case("u32.ics", &[2, 1, 3], (0u32..6).map(|v| v * 100_000).collect());
    roundtrip_case("i32.ics", &[1, 4], vec![i32::MIN, -1, 0, i32::MAX]);
    roundtrip_case("f32.ics", &[2, 2, 2, 2], (0..16).map(|v| v as f32 / 3.0).collect());
    roundtrip_case("f64.ics", &[2, 1, 2, 1, 3], (0..12).map(|v| (v as f64).sqrt()).collect());
}

#[test]
fn random_frames_survive_a_roundtrip() {
    let samples : Vec<u16> = (0..512).map(|_| rand::random::<u16>()).collect();
    roundtrip_case("random.ics", &[16, 32], samples);
}

#[test]
fn single_sample_roundtrip() {
    roundtrip_case("one.ics", &[1], vec![42u8]);
}

#[test]
fn container_dimensions_are_fastest_axis_first() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reversed.ics");

    let data = IcsArray::from(ArrayD::<u8>::zeros(IxDyn(&[2, 3, 4])));
    write(&path, &data, false).unwrap();

    // The file lists the extents fastest-varying first...
    let raw = std::fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(text.contains("layout\tsizes\t8\t4\t3\t2"));

    // ...and reading reverses them back.
    assert_eq!(read_data(&path, false).unwrap().shape(), &[2, 3, 4]);
}

#[test]
fn strided_sources_are_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("strided.ics");

    // Every other row of a packed 4x3 array.
    let packed = Array2::from_shape_vec((4, 3), (0i32..12).collect()).unwrap();
    let strided = packed.slice_move(s![..;2, ..]);
    assert!(!strided.is_standard_layout());

    let expected = Array2::from_shape_vec(
        (2, 3),
        vec![0, 1, 2, 6, 7, 8]
    ).unwrap();
    assert_eq!(strided, expected);

    write(&path, &IcsArray::from(strided.into_dyn()), false).unwrap();
    assert_eq!(
        read_data(&path, false).unwrap(),
        IcsArray::from(expected.into_dyn())
    );
}

#[test]
fn transposed_sources_are_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transposed.ics");

    let transposed = Array2::from_shape_vec((2, 3), (0u16..6).collect())
        .unwrap()
        .reversed_axes();
    assert!(!transposed.is_standard_layout());

    let expected = Array2::from_shape_vec(
        (3, 2),
        vec![0u16, 3, 1, 4, 2, 5]
    ).unwrap();
    assert_eq!(transposed, expected);

    write(&path, &IcsArray::from(transposed.into_dyn()), false).unwrap();
    assert_eq!(
        read_data(&path, false).unwrap(),
        IcsArray::from(expected.into_dyn())
    );
}

#[test]
fn unsupported_sample_types_create_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wide.ics");

    let data = IcsArray::from(ArrayD::<i64>::zeros(IxDyn(&[2, 2])));
    let err = write(&path, &data, false).unwrap_err();

    assert!(matches!(err, CorroicsError::UnsupportedType(_)));
    assert!(!path.exists());
}

#[test]
fn missing_files_fail_to_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.ics");
    assert!(matches!(
        read(&path, false),
        Err(CorroicsError::OpenFailed(_))
    ));
}

#[test]
fn garbage_files_fail_to_open() {
    let dir = tempdir().unwrap();

    let text = dir.path().join("text.ics");
    std::fs::write(&text, b"MZ this is not an ics file").unwrap();
    assert!(matches!(
        read(&text, false),
        Err(CorroicsError::OpenFailed(_))
    ));

    let binary = dir.path().join("binary.ics");
    std::fs::write(&binary, [0x89u8, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]).unwrap();
    assert!(matches!(
        read(&binary, false),
        Err(CorroicsError::OpenFailed(_))
    ));
}

#[test]
fn truncated_sample_data_fails_to_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("truncated.ics");

    let data = IcsArray::from(
        ArrayD::from_shape_vec(IxDyn(&[4]), vec![1u16, 2, 3, 4]).unwrap()
    );
    write(&path, &data, false).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    assert!(matches!(
        read(&path, false),
        Err(CorroicsError::ReadFailed(_))
    ));
}

#[test]
fn trailing_bytes_fail_to_close() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trailer.ics");

    let data = IcsArray::from(
        ArrayD::from_shape_vec(IxDyn(&[4]), vec![1u16, 2, 3, 4]).unwrap()
    );
    write(&path, &data, false).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(b"junk");
    std::fs::write(&path, bytes).unwrap();

    // The data was readable, but no partial result escapes.
    assert!(matches!(
        read(&path, false),
        Err(CorroicsError::CloseFailed(_))
    ));
}

#[test]
fn complex_files_are_rejected_as_unsupported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("complex.ics");

    craft_ics(
        &path,
        &[
            "ics_version\t2.0",
            "layout\tparameters\t2",
            "layout\torder\tbits\tx",
            "layout\tsizes\t64\t2",
            "representation\tformat\tcomplex",
            "representation\tsign\tsigned",
            "representation\tcompression\tuncompressed",
        ],
        &[0u8; 16],
    );

    assert!(matches!(
        read(&path, false),
        Err(CorroicsError::UnsupportedType(_))
    ));
}

#[test]
fn compressed_files_are_rejected_at_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("compressed.ics");

    craft_ics(
        &path,
        &[
            "ics_version\t2.0",
            "layout\tsizes\t8\t4",
            "representation\tformat\tinteger",
            "representation\tcompression\tgzip",
        ],
        &[0u8; 4],
    );

    assert!(matches!(
        read(&path, false),
        Err(CorroicsError::OpenFailed(_))
    ));
}

#[test]
fn foreign_byte_order_is_normalized_on_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big_endian.ics");

    let values = [513u16, 2, 65535];
    let mut data = Vec::new();
    for value in values {
        data.extend_from_slice(&value.to_be_bytes());
    }

    craft_ics(
        &path,
        &[
            "ics_version\t2.0",
            "layout\tsizes\t16\t3",
            "representation\tformat\tinteger",
            "representation\tsign\tunsigned",
            "representation\tbyte_order\t2\t1",
        ],
        &data,
    );

    let expected = IcsArray::from(
        ArrayD::from_shape_vec(IxDyn(&[3]), values.to_vec()).unwrap()
    );
    assert_eq!(read_data(&path, false).unwrap(), expected);
}

#[test]
fn version_one_headers_read_from_the_ids_companion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pair.ics");

    craft_ics(
        &path,
        &[
            "ics_version\t1.0",
            "layout\tsizes\t8\t4",
            "representation\tformat\tinteger",
            "representation\tsign\tunsigned",
        ],
        &[],
    );
    std::fs::write(dir.path().join("pair.ids"), [9u8, 8, 7, 6]).unwrap();

    let expected = IcsArray::from(
        ArrayD::from_shape_vec(IxDyn(&[4]), vec![9u8, 8, 7, 6]).unwrap()
    );
    assert_eq!(read_data(&path, false).unwrap(), expected);
}

#[test]
fn written_files_record_their_author() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.ics");

    let data = IcsArray::from(ArrayD::<u8>::zeros(IxDyn(&[2])));
    write(&path, &data, false).unwrap();

    let raw = std::fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(text.contains("history\tauthor\tcorroics "));
}

#[test]
fn debug_flag_does_not_change_results() {
    let dir = tempdir().unwrap();
    let quiet = dir.path().join("quiet.ics");
    let chatty = dir.path().join("chatty.ics");

    let data = IcsArray::from(
        ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.5f32, -2.5, 3.5, -4.5]).unwrap()
    );

    write(&quiet, &data, false).unwrap();
    write(&chatty, &data, true).unwrap();
    assert_eq!(
        std::fs::read(&quiet).unwrap(),
        std::fs::read(&chatty).unwrap()
    );

    assert_eq!(
        read(&quiet, false).unwrap(),
        read(&quiet, true).unwrap()
    );

    // Failure paths are debug-neutral too.
    let missing = dir.path().join("missing.ics");
    assert!(matches!(
        read(&missing, true),
        Err(CorroicsError::OpenFailed(_))
    ));
}
