use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use super::basic::SError;

/// Every style writes non-ASCII text as raw UTF-8. It is never escaped to
/// \uXXXX, as Python's json.dumps does by default (ensure_ascii).
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum JsonStyle {
    /// Single line, with a space after each ',' and ':'
    #[default]
    Spaced,
    /// Single line, no extra whitespace
    Compact,
    /// Indented over multiple lines
    Pretty,
}

/// Same as the compact formatter, except that array/object separators are
/// ", " and key/value separators are ": ".
///
/// eg. {"a": [1, 2], "b": null}
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

pub fn write_json<T, W>(w: W, value: &T, style: JsonStyle) -> Result<(), serde_json::Error>
where
    T: ?Sized + Serialize,
    W: io::Write,
{
    match style {
        JsonStyle::Spaced => {
            let mut ser = serde_json::Serializer::with_formatter(w, SpacedFormatter);
            value.serialize(&mut ser)
        }
        JsonStyle::Compact => serde_json::to_writer(w, value),
        JsonStyle::Pretty => serde_json::to_writer_pretty(w, value),
    }
}

pub fn to_json_string<T>(value: &T, style: JsonStyle) -> Result<String, SError>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::<u8>::new();
    write_json(&mut buf, value, style).map_err(|e| e.to_string())?;
    String::from_utf8(buf).map_err(|e| e.to_string())
}
