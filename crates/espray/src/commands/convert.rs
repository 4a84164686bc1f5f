//! `espray convert`: text re-encoding through the byte codec.

use std::io::{self, Read};

use anyhow::{Context, Result};
use espray_codec::base64::{self, Base64Options};
use espray_codec::{format, parse, to_text, Encoding, FormatOptions};

/// Handle `espray convert`.
pub fn handle_convert_command(
    text: &str,
    from: Encoding,
    to: Encoding,
    pad: bool,
    separator: Option<String>,
    wrap: bool,
) -> Result<()> {
    let input = if text == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        text.to_string()
    };

    let bytes = parse(&input, from);
    println!("{}", render(&bytes, to, pad, separator, wrap));
    Ok(())
}

/// Render bytes in `encoding` with the CLI's formatting flags applied.
pub fn render(
    bytes: &[u8],
    encoding: Encoding,
    pad: bool,
    separator: Option<String>,
    wrap: bool,
) -> String {
    if encoding == Encoding::Base64 && wrap {
        return base64::encode(
            bytes,
            Base64Options {
                line_break: true,
                padding: true,
            },
        );
    }

    let mut options = FormatOptions::for_encoding(encoding);
    options.pad = pad;
    if let Some(separator) = separator {
        options.separator = separator;
    }
    format(&to_text(bytes, encoding, pad), encoding, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        assert_eq!(render(b"Hi", Encoding::Hexa, false, None, false), "48 69");
        assert_eq!(render(b"Hi", Encoding::Binary, true, None, false), "01001000 01101001");
        assert_eq!(render(b"Hi", Encoding::Text, false, None, false), "Hi");
        assert_eq!(render(b"Hi", Encoding::Base64, false, None, false), "SGk=");
    }

    #[test]
    fn test_render_separator() {
        assert_eq!(
            render(&[1, 2, 255], Encoding::Decimal, false, Some(",".into()), false),
            "1,2,255"
        );
    }

    #[test]
    fn test_render_wrapped_base64() {
        let out = render(&[0u8; 100], Encoding::Base64, false, None, true);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0].len(), 76);
        assert!(lines.len() > 1);
    }
}
