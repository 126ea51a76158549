//! XML: `<complianceLogs>` with one `<log>` per entry.
//!
//! Data keys that are valid XML names become elements of the same name;
//! any other key is written as `<field name="…">`. Null values are omitted.

use canna_core::{
  log::{LogEntry, timestamp},
  value::DataValue,
};
use quick_xml::{
  Reader,
  Writer,
  escape::escape,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
  Error,
  Result,
  error::xml_err,
  record::{RawRecord, infer_value},
};

const ROOT: &str = "complianceLogs";
const LOG: &str = "log";
const DATA: &str = "data";
const FIELD: &str = "field";

// ─── Export ──────────────────────────────────────────────────────────────────

type XmlWriter = Writer<Vec<u8>>;

fn write_start(w: &mut XmlWriter, tag: &str) -> Result<()> {
  w.write_event(Event::Start(BytesStart::new(tag))).map_err(xml_err)
}

fn write_end(w: &mut XmlWriter, tag: &str) -> Result<()> {
  w.write_event(Event::End(BytesEnd::new(tag))).map_err(xml_err)
}

fn write_text(w: &mut XmlWriter, text: &str) -> Result<()> {
  w.write_event(Event::Text(BytesText::from_escaped(escape(text))))
    .map_err(xml_err)
}

fn write_text_elem(w: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
  write_start(w, tag)?;
  write_text(w, text)?;
  write_end(w, tag)
}

/// Whether `key` can be used verbatim as an element name. Colons are refused
/// so no key is read back as a namespace prefix.
pub fn is_xml_name(key: &str) -> bool {
  let mut chars = key.chars();
  let Some(first) = chars.next() else { return false };
  (first.is_ascii_alphabetic() || first == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    && !key.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("xml"))
}

pub fn export(entries: &[LogEntry]) -> Result<Vec<u8>> {
  let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
  w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    .map_err(xml_err)?;
  write_start(&mut w, ROOT)?;

  for entry in entries {
    write_start(&mut w, LOG)?;
    write_text_elem(&mut w, "id", &entry.id)?;
    write_text_elem(&mut w, "type", entry.log_type.as_ref())?;
    write_text_elem(&mut w, "timestamp", &timestamp::format(&entry.timestamp))?;
    write_text_elem(&mut w, "jurisdiction", &entry.jurisdiction)?;
    write_text_elem(&mut w, "businessName", &entry.business_name)?;
    write_text_elem(&mut w, "licenseNumber", &entry.license_number)?;
    write_text_elem(&mut w, "location", &entry.location)?;

    write_start(&mut w, DATA)?;
    for (key, value) in &entry.data {
      if matches!(value, DataValue::Null) {
        continue;
      }
      if is_xml_name(key) {
        write_text_elem(&mut w, key, &value.to_text())?;
      } else {
        let mut el = BytesStart::new(FIELD);
        el.push_attribute(("name", key.as_str()));
        w.write_event(Event::Start(el)).map_err(xml_err)?;
        write_text(&mut w, &value.to_text())?;
        write_end(&mut w, FIELD)?;
      }
    }
    write_end(&mut w, DATA)?;

    write_end(&mut w, LOG)?;
  }

  write_end(&mut w, ROOT)?;
  Ok(w.into_inner())
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Where the reader is inside the current `<log>`.
#[derive(Default)]
struct Cursor {
  record:  Option<RawRecord>,
  in_data: bool,
  /// Name of the leaf element being read, and its text so far.
  leaf:    Option<(String, String)>,
}

impl Cursor {
  fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    match name.as_str() {
      LOG if self.record.is_none() => self.record = Some(RawRecord::default()),
      DATA if self.record.is_some() && !self.in_data && self.leaf.is_none() => {
        self.in_data = true;
      }
      _ if self.record.is_some() && self.leaf.is_none() => {
        let key = if self.in_data && name == FIELD {
          match e.try_get_attribute("name").map_err(xml_err)? {
            Some(attr) => attr.unescape_value().map_err(xml_err)?.into_owned(),
            None => name.clone(),
          }
        } else {
          name.clone()
        };
        self.leaf = Some((key, String::new()));
      }
      _ => {}
    }
    Ok(())
  }

  fn text(&mut self, text: &str) {
    if let Some((_, buf)) = self.leaf.as_mut() {
      buf.push_str(text);
    }
  }

  /// Close the innermost open element; a finished `<log>` is returned.
  fn close(&mut self, name: &[u8]) -> Option<RawRecord> {
    if let Some((key, text)) = self.leaf.take() {
      if let Some(record) = self.record.as_mut() {
        if self.in_data {
          if !text.is_empty() {
            record.data.insert(key, infer_value(&text));
          }
        } else {
          record.set_core(&key, text);
        }
      }
      return None;
    }
    match name {
      b"data" => {
        self.in_data = false;
        None
      }
      b"log" => self.record.take(),
      _ => None,
    }
  }
}

pub fn import(bytes: &[u8]) -> Result<Vec<LogEntry>> {
  let mut reader = Reader::from_reader(bytes);
  let mut cursor = Cursor::default();
  let mut entries = Vec::new();
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf) {
      Ok(Event::Start(ref e)) => cursor.open(e)?,
      Ok(Event::Empty(ref e)) => {
        cursor.open(e)?;
        let name = e.local_name();
        if let Some(raw) = cursor.close(name.as_ref()) {
          entries.push(raw.into_entry(entries.len() + 1)?);
        }
      }
      Ok(Event::Text(ref e)) => cursor.text(&e.unescape().map_err(xml_err)?),
      Ok(Event::CData(ref e)) => cursor.text(&String::from_utf8_lossy(e)),
      Ok(Event::End(ref e)) => {
        let name = e.local_name();
        if let Some(raw) = cursor.close(name.as_ref()) {
          entries.push(raw.into_entry(entries.len() + 1)?);
        }
      }
      Ok(Event::Eof) => break,
      Err(e) => return Err(Error::Xml(e.to_string())),
      _ => {}
    }
    buf.clear();
  }

  Ok(entries)
}
