//! Flat `<xml>...</xml>` envelope used by every WeChat Pay v2 endpoint.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::WxPayError;
use crate::fields::{FieldMap, FieldValue};

const ROOT: &str = "xml";

/// Encode a field mapping as `<xml><k>v</k>...</xml>`, escaping values.
///
/// Values are written in their textual form, so `decode(encode(m))` yields
/// `FieldValue::Text` for every field. Integers come back as their decimal
/// text, which canonicalizes and signs identically.
pub fn encode(fields: &FieldMap) -> Result<String, WxPayError> {
    let mut writer = Writer::new(Vec::with_capacity(16 + fields.len() * 32));
    write(&mut writer, Event::Start(BytesStart::new(ROOT)))?;
    for (key, value) in fields {
        let text = value.to_string();
        write(&mut writer, Event::Start(BytesStart::new(key.as_str())))?;
        write(&mut writer, Event::Text(BytesText::new(&text)))?;
        write(&mut writer, Event::End(BytesEnd::new(key.as_str())))?;
    }
    write(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

    String::from_utf8(writer.into_inner()).map_err(|e| WxPayError::Encode(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), WxPayError> {
    writer
        .write_event(event)
        .map_err(|e| WxPayError::Encode(e.to_string()))
}

/// Decode the immediate children of the root element into a field mapping.
///
/// Text and CDATA content are both accepted. Anything that is not a single
/// well-formed root element is `WxPayError::MalformedEnvelope`.
pub fn decode(bytes: &[u8]) -> Result<FieldMap, WxPayError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut fields = FieldMap::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<String> = None;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                match depth {
                    1 => {
                        if seen_root {
                            return Err(malformed("multiple root elements"));
                        }
                        seen_root = true;
                    }
                    2 => {
                        current = Some(element_name(e.name().as_ref())?);
                        value.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => match depth {
                0 => {
                    if seen_root {
                        return Err(malformed("multiple root elements"));
                    }
                    seen_root = true;
                }
                1 => {
                    let key = element_name(e.name().as_ref())?;
                    fields.insert(key, FieldValue::Text(String::new()));
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if depth == 0 && !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed("text outside of root element"));
                }
                if depth == 2 {
                    let text = t.unescape().map_err(|e| malformed(&e.to_string()))?;
                    value.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if depth == 0 {
                    return Err(malformed("CDATA outside of root element"));
                }
                if depth == 2 {
                    let text = std::str::from_utf8(&c).map_err(|e| malformed(&e.to_string()))?;
                    value.push_str(text);
                }
            }
            Ok(Event::End(_)) => {
                if depth == 2 {
                    if let Some(key) = current.take() {
                        fields.insert(key, FieldValue::Text(std::mem::take(&mut value)));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(&e.to_string())),
        }
        buf.clear();
    }

    if !seen_root {
        return Err(malformed("no root element"));
    }
    if depth != 0 {
        return Err(malformed("unexpected end of document"));
    }
    Ok(fields)
}

fn element_name(raw: &[u8]) -> Result<String, WxPayError> {
    String::from_utf8(raw.to_vec()).map_err(|e| malformed(&format!("element name: {e}")))
}

fn malformed(reason: &str) -> WxPayError {
    WxPayError::MalformedEnvelope(reason.to_string())
}

/// Acknowledgement envelope a notification handler sends back to the gateway.
pub fn reply(message: &str, ok: bool) -> Result<String, WxPayError> {
    let mut fields = FieldMap::new();
    fields.insert(
        "return_code".into(),
        if ok { "SUCCESS" } else { "FAIL" }.into(),
    );
    fields.insert("return_msg".into(), message.into());
    encode(&fields)
}
