//! Excel report: an XML Spreadsheet 2003 (SpreadsheetML) workbook. A
//! "Report" sheet carries the header and footer; each log type gets its own
//! sheet.

use quick_xml::{
  Writer,
  escape::escape,
  events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
  Result,
  columns::Cell,
  error::xml_err,
  report::{NOTICE, Report, TITLE},
};

const NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const PROLOG: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <?mso-application progid=\"Excel.Sheet\"?>\n";
const HEADER_STYLE: &str = "header";

/// Characters Excel refuses in sheet names.
const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

type XmlWriter = Writer<Vec<u8>>;

fn sheet_name(title: &str) -> String {
  title
    .chars()
    .filter(|c| !SHEET_NAME_FORBIDDEN.contains(c))
    .take(31)
    .collect()
}

fn start(w: &mut XmlWriter, el: BytesStart<'_>) -> Result<()> {
  w.write_event(Event::Start(el)).map_err(xml_err)
}

fn end(w: &mut XmlWriter, tag: &str) -> Result<()> {
  w.write_event(Event::End(BytesEnd::new(tag))).map_err(xml_err)
}

fn cell(w: &mut XmlWriter, value: &Cell, style: Option<&str>) -> Result<()> {
  let mut el = BytesStart::new("Cell");
  if let Some(style) = style {
    el.push_attribute(("ss:StyleID", style));
  }
  start(w, el)?;

  let (kind, text) = match value {
    Cell::Number(n) => ("Number", n.as_str()),
    Cell::Text(t) => ("String", t.as_str()),
  };
  let mut data = BytesStart::new("Data");
  data.push_attribute(("ss:Type", kind));
  start(w, data)?;
  w.write_event(Event::Text(BytesText::from_escaped(escape(text))))
    .map_err(xml_err)?;
  end(w, "Data")?;

  end(w, "Cell")
}

fn row(w: &mut XmlWriter, cells: &[Cell], style: Option<&str>) -> Result<()> {
  start(w, BytesStart::new("Row"))?;
  for value in cells {
    cell(w, value, style)?;
  }
  end(w, "Row")
}

fn worksheet(
  w: &mut XmlWriter,
  name: &str,
  rows: impl FnOnce(&mut XmlWriter) -> Result<()>,
) -> Result<()> {
  let mut sheet = BytesStart::new("Worksheet");
  sheet.push_attribute(("ss:Name", name));
  start(w, sheet)?;
  start(w, BytesStart::new("Table"))?;
  rows(w)?;
  end(w, "Table")?;
  end(w, "Worksheet")
}

fn text(s: &str) -> Cell { Cell::Text(s.to_owned()) }

pub fn export(report: &Report) -> Result<Vec<u8>> {
  let mut w = Writer::new_with_indent(PROLOG.to_vec(), b' ', 1);

  let mut workbook = BytesStart::new("Workbook");
  workbook.push_attribute(("xmlns", NS));
  workbook.push_attribute(("xmlns:ss", NS));
  start(&mut w, workbook)?;

  start(&mut w, BytesStart::new("Styles"))?;
  let mut style = BytesStart::new("Style");
  style.push_attribute(("ss:ID", HEADER_STYLE));
  start(&mut w, style)?;
  let mut font = BytesStart::new("Font");
  font.push_attribute(("ss:Bold", "1"));
  w.write_event(Event::Empty(font)).map_err(xml_err)?;
  end(&mut w, "Style")?;
  end(&mut w, "Styles")?;

  worksheet(&mut w, "Report", |w| {
    row(w, &[text(TITLE)], Some(HEADER_STYLE))?;
    for (label, value) in &report.header {
      row(w, &[text(label), text(value)], None)?;
    }
    row(w, &[text(&report.footer)], None)?;
    row(w, &[text(NOTICE)], None)
  })?;

  for section in &report.sections {
    let name = sheet_name(&section.log_type.readable());
    worksheet(&mut w, &name, |w| {
      let headers: Vec<Cell> = section.headers.iter().map(|h| text(h)).collect();
      row(w, &headers, Some(HEADER_STYLE))?;
      for cells in &section.rows {
        row(w, cells, None)?;
      }
      Ok(())
    })?;
  }

  end(&mut w, "Workbook")?;
  Ok(w.into_inner())
}
