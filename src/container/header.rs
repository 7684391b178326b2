//! The ICS text-header grammar: a separator declaration line,
//! then `category<sep>subcategory<sep>values...` lines, then
//! `end`. In a version 2.0 file the raw sample data follows
//! `end` directly; a version 1.0 header points at a companion
//! `.ids` file instead.
//!
//! Parsing is deliberately tolerant of categories it does not
//! know (real files carry `sensor`, `parameter`, and friends),
//! and deliberately strict about the features this crate does
//! not support: any compression other than `uncompressed` is
//! rejected at open.

use std::io::{BufRead, Write};

use itertools::Itertools;

use crate::dtype::{IcsDataType, IcsFormat};
use super::IcsLayout;

/// Problems with the header text itself. Converted into
/// [`CorroicsError::OpenFailed`](crate::CorroicsError) at the
/// crate boundary -- from the caller's point of view a file
/// with a bad header is a file that would not open.
#[derive(Debug)]
pub enum HeaderError {
    Io(std::io::Error),
    /// The file does not start with a separator declaration line.
    MissingSeparator,
    /// A required field never appeared before `end`.
    MissingField(&'static str),
    Malformed(String),
    UnsupportedVersion(String),
    UnsupportedCompression(String),
    UnsupportedByteOrder(String),
    BadLayout(String),
}

impl From<std::io::Error> for HeaderError {
    fn from(err : std::io::Error) -> Self {
        HeaderError::Io(err)
    }
}

impl std::error::Error for HeaderError {}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HeaderError::Io(err) => {
                write!(f, "I/O error while reading header: {}", err)
            },
            HeaderError::MissingSeparator => {
                write!(f, "file does not start with an ICS separator declaration")
            },
            HeaderError::MissingField(name) => {
                write!(f, "header is missing the `{}` field", name)
            },
            HeaderError::Malformed(msg) => {
                write!(f, "malformed header: {}", msg)
            },
            HeaderError::UnsupportedVersion(version) => {
                write!(f, "ICS version `{}` is not supported", version)
            },
            HeaderError::UnsupportedCompression(compression) => {
                write!(f, "compression `{}` is not supported, only uncompressed files are", compression)
            },
            HeaderError::UnsupportedByteOrder(order) => {
                write!(f, "byte order `{}` is not supported", order)
            },
            HeaderError::BadLayout(msg) => {
                write!(f, "bad layout: {}", msg)
            },
        }
    }
}

/// Which flavor of ICS file the header announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsVersion {
    /// Header in the `.ics` file, sample data in a companion `.ids`.
    V1,
    /// Single file, sample data follows the header's `end` line.
    V2,
}

/// Everything `IcsReader::open` needs from the header text.
#[derive(Debug)]
pub (crate) struct ParsedHeader {
    pub version : IcsVersion,
    pub layout : IcsLayout,
    /// Whether the file's byte order differs from the host's,
    /// i.e. whether every sample must be byte-reversed on read.
    pub byte_swap : bool,
}

/// The field separator written by this crate. Read-side code
/// accepts whatever separator the file declares.
const SEP : &str = "\t";

/// Parses a header from `reader`, leaving the reader positioned
/// on the first byte after the `end` line -- for a version 2.0
/// file, the first sample byte.
pub (crate) fn parse_header<R : BufRead>(reader : &mut R) -> Result<ParsedHeader, HeaderError> {
    let sep = read_separator_line(reader)?;

    let mut version : Option<IcsVersion> = None;
    let mut bits_and_sizes : Option<Vec<usize>> = None;
    let mut expected_parameters : Option<usize> = None;
    let mut order_labels : Option<Vec<String>> = None;
    let mut format : Option<IcsFormat> = None;
    let mut format_unrecognized = false;
    let mut sign : Option<bool> = None;
    let mut byte_order : Option<Vec<usize>> = None;
    let mut saw_end = false;

    loop {
        let mut raw = Vec::new();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = String::from_utf8(raw)
            .map_err(|_| HeaderError::Malformed("header is not valid text".to_string()))?;
        let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if line.is_empty() {
            continue;
        }

        let mut split = line.split(sep);
        let category = split.next().unwrap_or("");
        let tokens : Vec<&str> = split.collect();

        match category {
            "ics_version" => {
                version = Some(match tokens.first().copied() {
                    Some("1.0") => IcsVersion::V1,
                    Some("2.0") => IcsVersion::V2,
                    other => {
                        return Err(HeaderError::UnsupportedVersion(
                            other.unwrap_or("").to_string()
                        ));
                    },
                });
            },
            // TODO: honor a `significant_bits` value narrower than
            // the sample width instead of skipping the line.
            "layout" => match tokens.as_slice() {
                ["parameters", value, ..] => {
                    expected_parameters = Some(parse_size(value)?);
                },
                ["order", rest @ ..] => {
                    order_labels = Some(rest.iter().map(|s| s.to_string()).collect());
                },
                ["sizes", rest @ ..] => {
                    bits_and_sizes = Some(
                        rest.iter().map(|v| parse_size(v)).collect::<Result<_, _>>()?
                    );
                },
                _ => {},
            },
            "representation" => match tokens.as_slice() {
                ["format", value, ..] => {
                    format = match *value {
                        "integer" => Some(IcsFormat::Integer),
                        "real" => Some(IcsFormat::Real),
                        "complex" => Some(IcsFormat::Complex),
                        _ => {
                            format_unrecognized = true;
                            None
                        },
                    };
                },
                ["sign", value, ..] => {
                    sign = Some(*value == "signed");
                },
                ["compression", value, ..] => {
                    if *value != "uncompressed" {
                        return Err(HeaderError::UnsupportedCompression(value.to_string()));
                    }
                },
                ["byte_order", rest @ ..] => {
                    byte_order = Some(
                        rest.iter().map(|v| parse_size(v)).collect::<Result<_, _>>()?
                    );
                },
                _ => {},
            },
            // History is write-only metadata in this crate; the
            // decoder never surfaces it.
            "history" => {},
            "end" => {
                saw_end = true;
                break;
            },
            // Real files carry categories like `sensor` and
            // `parameter`; skip anything unrecognized.
            _ => {},
        }
    }

    if !saw_end {
        return Err(HeaderError::MissingField("end"));
    }
    let version = version.ok_or(HeaderError::MissingField("ics_version"))?;
    let sizes = bits_and_sizes.ok_or(HeaderError::MissingField("layout sizes"))?;
    if sizes.len() < 2 {
        return Err(HeaderError::Malformed(
            "layout sizes must hold the bit width and at least one dimension".to_string()
        ));
    }
    let bits = sizes[0];
    let dimensions = sizes[1..].to_vec();

    if let Some(labels) = &order_labels {
        if labels.first().map(|l| l.as_str()) != Some("bits") {
            return Err(HeaderError::Malformed(
                "first layout order parameter must be `bits`".to_string()
            ));
        }
        if labels.len() != dimensions.len() + 1 {
            return Err(HeaderError::Malformed(
                "layout order and layout sizes disagree on the parameter count".to_string()
            ));
        }
    }
    if let Some(parameters) = expected_parameters {
        if parameters != dimensions.len() + 1 {
            return Err(HeaderError::Malformed(format!(
                "layout declares {} parameters but sizes lists {}",
                parameters,
                dimensions.len() + 1
            )));
        }
    }

    // Integer data defaults to unsigned, floating point to
    // signed, when the header omits the sign line.
    let data_type = if format_unrecognized {
        IcsDataType::Unknown
    } else {
        let format = format.unwrap_or(IcsFormat::Integer);
        let signed = sign.unwrap_or(!matches!(format, IcsFormat::Integer));
        IcsDataType::from_props(format, signed, bits)
    };

    let layout = IcsLayout::new(data_type, dimensions);
    layout.validate().map_err(HeaderError::BadLayout)?;

    let byte_swap = match byte_order {
        Some(order) => byte_order_needs_swap(&order)?,
        None => false,
    };

    Ok(ParsedHeader { version, layout, byte_swap })
}

/// The first byte of an ICS file declares the field separator;
/// the rest of the first line is the (ignored) line terminator
/// declaration.
fn read_separator_line<R : BufRead>(reader : &mut R) -> Result<char, HeaderError> {
    let mut raw = Vec::new();
    if reader.read_until(b'\n', &mut raw)? == 0 {
        return Err(HeaderError::MissingSeparator);
    }
    let first = raw[0];
    if first.is_ascii_alphanumeric() || first == b'\n' {
        return Err(HeaderError::MissingSeparator);
    }
    Ok(first as char)
}

fn parse_size(token : &str) -> Result<usize, HeaderError> {
    token.trim().parse::<usize>().map_err(|_| {
        HeaderError::Malformed(format!("`{}` is not a valid size", token))
    })
}

/// An ascending `1 2 .. n` order is a little-endian file, a
/// descending one big-endian; anything else (PDP-style mixes)
/// is rejected. Returns whether samples must be byte-reversed
/// to match the host.
fn byte_order_needs_swap(order : &[usize]) -> Result<bool, HeaderError> {
    let n = order.len();
    let ascending = order.iter().copied().eq(1..=n);
    let descending = order.iter().copied().eq((1..=n).rev());
    if n <= 1 || (ascending && descending) {
        return Ok(false);
    }
    if ascending {
        Ok(cfg!(target_endian = "big"))
    } else if descending {
        Ok(cfg!(target_endian = "little"))
    } else {
        Err(HeaderError::UnsupportedByteOrder(
            order.iter().map(|v| v.to_string()).join(" ")
        ))
    }
}

/// Writes a version 2.0 header for `layout`, ending with the
/// `end` line so the sample bytes can follow directly.
pub (crate) fn write_header<W : Write>(
    writer : &mut W,
    layout : &IcsLayout,
    history : &[(String, String)],
    filename_stem : &str,
) -> std::io::Result<()> {
    let (format, signed, bits) = layout.data_type.props().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "data type has no header representation"
        )
    })?;

    writeln!(writer, "{}", SEP)?;
    writeln!(writer, "ics_version{}2.0", SEP)?;
    writeln!(writer, "filename{}{}", SEP, filename_stem)?;

    let ndim = layout.ndim();
    writeln!(writer, "layout{0}parameters{0}{1}", SEP, ndim + 1)?;
    writeln!(
        writer,
        "layout{0}order{0}bits{0}{1}",
        SEP,
        (0..ndim).map(axis_label).join(SEP)
    )?;
    writeln!(
        writer,
        "layout{0}sizes{0}{1}{0}{2}",
        SEP,
        bits,
        layout.dimensions.iter().map(|d| d.to_string()).join(SEP)
    )?;
    writeln!(writer, "layout{0}coordinates{0}video", SEP)?;
    writeln!(writer, "layout{0}significant_bits{0}{1}", SEP, bits)?;

    let format = match format {
        IcsFormat::Integer => "integer",
        IcsFormat::Real => "real",
        IcsFormat::Complex => "complex",
    };
    writeln!(writer, "representation{0}format{0}{1}", SEP, format)?;
    writeln!(
        writer,
        "representation{0}sign{0}{1}",
        SEP,
        if signed { "signed" } else { "unsigned" }
    )?;
    writeln!(writer, "representation{0}compression{0}uncompressed", SEP)?;

    // Samples are written in host order; the header records which
    // order that is.
    let sample_size = layout.data_type.size();
    let byte_order : Vec<usize> = if cfg!(target_endian = "little") {
        (1..=sample_size).collect()
    } else {
        (1..=sample_size).rev().collect()
    };
    writeln!(
        writer,
        "representation{0}byte_order{0}{1}",
        SEP,
        byte_order.iter().map(|v| v.to_string()).join(SEP)
    )?;

    for (key, value) in history {
        writeln!(writer, "history{0}{1}{0}{2}", SEP, sanitize(key), sanitize(value))?;
    }

    writeln!(writer, "end")?;
    Ok(())
}

/// Conventional ICS axis names, fastest-varying first.
fn axis_label(axis : usize) -> String {
    match axis {
        0 => "x".to_string(),
        1 => "y".to_string(),
        2 => "z".to_string(),
        3 => "t".to_string(),
        other => format!("dim_{}", other),
    }
}

/// History keys and values must not contain the characters the
/// grammar is built from.
fn sanitize(text : &str) -> String {
    text.replace(|c| c == '\t' || c == '\n' || c == '\r', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_str(text : &str) -> Result<ParsedHeader, HeaderError> {
        parse_header(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn written_headers_parse_back() {
        let layout = IcsLayout::new(IcsDataType::Sint16, vec![64, 32, 8]);
        let history = vec![("author".to_string(), "somebody".to_string())];

        let mut buffer = Vec::new();
        write_header(&mut buffer, &layout, &history, "stack").unwrap();

        let parsed = parse_header(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(parsed.version, IcsVersion::V2);
        assert_eq!(parsed.layout, layout);
        assert!(!parsed.byte_swap);
    }

    #[test]
    fn parser_stops_at_the_first_data_byte() {
        let layout = IcsLayout::new(IcsDataType::Uint8, vec![4]);
        let mut buffer = Vec::new();
        write_header(&mut buffer, &layout, &[], "tiny").unwrap();
        buffer.extend_from_slice(&[1, 2, 3, 4]);

        let mut cursor = Cursor::new(&buffer);
        parse_header(&mut cursor).unwrap();
        assert_eq!(buffer.len() - cursor.position() as usize, 4);
    }

    #[test]
    fn compression_other_than_uncompressed_is_rejected() {
        let text = "\t\n\
            ics_version\t2.0\n\
            layout\tsizes\t8\t4\n\
            representation\tcompression\tgzip\n\
            end\n";
        assert!(matches!(
            parse_str(text),
            Err(HeaderError::UnsupportedCompression(_))
        ));
    }

    #[test]
    fn exotic_formats_parse_as_unknown() {
        let text = "\t\n\
            ics_version\t2.0\n\
            layout\tsizes\t8\t4\n\
            representation\tformat\tquaternion\n\
            end\n";
        let parsed = parse_str(text).unwrap();
        assert_eq!(parsed.layout.data_type, IcsDataType::Unknown);
    }

    #[test]
    fn dimension_bounds_are_enforced() {
        // 11 dimensions, one past the limit
        let text = "\t\n\
            ics_version\t2.0\n\
            layout\tsizes\t8\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1\n\
            end\n";
        assert!(matches!(parse_str(text), Err(HeaderError::BadLayout(_))));

        let text = "\t\n\
            ics_version\t2.0\n\
            layout\tsizes\t8\t4\t0\n\
            end\n";
        assert!(matches!(parse_str(text), Err(HeaderError::BadLayout(_))));
    }

    #[test]
    fn parameter_count_mismatch_is_rejected() {
        let text = "\t\n\
            ics_version\t2.0\n\
            layout\tparameters\t4\n\
            layout\tsizes\t8\t4\t4\n\
            end\n";
        assert!(matches!(parse_str(text), Err(HeaderError::Malformed(_))));
    }

    #[test]
    fn reversed_byte_order_requests_a_swap() {
        let text = "\t\n\
            ics_version\t2.0\n\
            layout\tsizes\t16\t4\n\
            representation\tformat\tinteger\n\
            representation\tbyte_order\t2\t1\n\
            end\n";
        let parsed = parse_str(text).unwrap();
        assert_eq!(parsed.byte_swap, cfg!(target_endian = "little"));
    }

    #[test]
    fn garbage_is_not_a_header() {
        assert!(parse_str("not an ics file at all\n").is_err());
        assert!(parse_str("").is_err());
    }
}
