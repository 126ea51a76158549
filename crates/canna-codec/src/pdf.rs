//! PDF report: a plain text-table PDF 1.4 document on US Letter pages, set in
//! the built-in Helvetica faces so no fonts need embedding.

use std::fmt::Write as _;

use crate::report::{NOTICE, Report, TITLE};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;
const BODY_SIZE: f32 = 8.0;
const LINE: f32 = 12.0;
/// Average Helvetica advance as a fraction of the font size.
const CHAR_WIDTH: f32 = 0.5;

#[derive(Clone, Copy)]
enum Font {
  Regular,
  Bold,
}

impl Font {
  fn resource(self) -> &'static str {
    match self {
      Self::Regular => "F1",
      Self::Bold => "F2",
    }
  }
}

/// PDF literal strings need `\`, `(` and `)` escaped; anything outside
/// printable ASCII is replaced since the base fonts only cover Latin text.
fn pdf_string(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '\\' | '(' | ')' => {
        out.push('\\');
        out.push(c);
      }
      ' '..='~' => out.push(c),
      _ => out.push('?'),
    }
  }
  out
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
fn fit(text: &str, max: usize) -> String {
  if text.chars().count() <= max {
    return text.to_owned();
  }
  let keep = max.saturating_sub(3);
  text.chars().take(keep).chain("...".chars()).take(max).collect()
}

/// Lays text out top-to-bottom, starting a new page when the current one is
/// full. Each page is a content stream.
struct Layout {
  pages: Vec<String>,
  y:     f32,
}

impl Layout {
  fn new() -> Self {
    Self { pages: vec![String::new()], y: PAGE_HEIGHT - MARGIN }
  }

  fn ensure_room(&mut self, height: f32) {
    if self.y - height < MARGIN {
      self.pages.push(String::new());
      self.y = PAGE_HEIGHT - MARGIN;
    }
  }

  fn text_at(&mut self, font: Font, size: f32, x: f32, text: &str) {
    if let Some(page) = self.pages.last_mut() {
      let _ = writeln!(
        page,
        "BT /{} {size} Tf {x:.1} {:.1} Td ({}) Tj ET",
        font.resource(),
        self.y,
        pdf_string(text)
      );
    }
  }

  fn line(&mut self, font: Font, size: f32, text: &str) {
    let height = size + 4.0;
    self.ensure_room(height);
    self.y -= height;
    self.text_at(font, size, MARGIN, text);
  }

  /// Word-wrap `text` to the page width.
  fn paragraph(&mut self, size: f32, text: &str) {
    let max = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * CHAR_WIDTH)) as usize;
    let mut current = String::new();
    for word in text.split_whitespace() {
      if !current.is_empty() && current.len() + 1 + word.len() > max {
        self.line(Font::Regular, size, &current);
        current.clear();
      }
      if !current.is_empty() {
        current.push(' ');
      }
      current.push_str(word);
    }
    if !current.is_empty() {
      self.line(Font::Regular, size, &current);
    }
  }

  fn gap(&mut self, height: f32) { self.y -= height; }

  fn row(&mut self, font: Font, cells: &[&str]) {
    let width = (PAGE_WIDTH - 2.0 * MARGIN) / cells.len().max(1) as f32;
    let max = ((width - 4.0) / (BODY_SIZE * CHAR_WIDTH)).max(1.0) as usize;
    self.ensure_room(LINE);
    self.y -= LINE;
    for (i, cell) in cells.iter().enumerate() {
      let x = MARGIN + width * i as f32;
      self.text_at(font, BODY_SIZE, x, &fit(cell, max));
    }
  }
}

pub fn export(report: &Report) -> Vec<u8> {
  let mut layout = Layout::new();

  layout.line(Font::Bold, 16.0, TITLE);
  layout.gap(6.0);
  for (label, value) in &report.header {
    layout.line(Font::Regular, 10.0, &format!("{label}: {value}"));
  }

  for section in &report.sections {
    layout.gap(10.0);
    // Keep a heading together with at least its column row.
    layout.ensure_room(14.0 + 2.0 * LINE);
    layout.line(Font::Bold, 12.0, &section.title);
    let headers: Vec<&str> = section.headers.to_vec();
    layout.row(Font::Bold, &headers);
    for row in &section.rows {
      let cells: Vec<&str> = row.iter().map(|c| c.text()).collect();
      layout.row(Font::Regular, &cells);
    }
  }

  layout.gap(16.0);
  layout.paragraph(BODY_SIZE, NOTICE);
  layout.line(Font::Regular, BODY_SIZE, &report.footer);

  assemble(&layout.pages)
}

/// Serialise the object graph: catalog, page tree, the two fonts, then a
/// page object and content stream per page, followed by the xref table.
fn assemble(pages: &[String]) -> Vec<u8> {
  // Objects 1-4 are fixed; page i uses objects 5 + 2i and 6 + 2i.
  let page_id = |i: usize| 5 + 2 * i;
  let kids = (0..pages.len())
    .map(|i| format!("{} 0 R", page_id(i)))
    .collect::<Vec<_>>()
    .join(" ");

  let mut objects: Vec<String> = vec![
    "<< /Type /Catalog /Pages 2 0 R >>".to_owned(),
    format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
      .to_owned(),
    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
      .to_owned(),
  ];
  for (i, content) in pages.iter().enumerate() {
    objects.push(format!(
      "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
       /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
      page_id(i) + 1
    ));
    objects.push(format!(
      "<< /Length {} >>\nstream\n{content}endstream",
      content.len()
    ));
  }

  let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
  let mut offsets = Vec::with_capacity(objects.len());
  for (i, body) in objects.iter().enumerate() {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
  }

  let xref_at = out.len();
  let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
  for offset in offsets {
    let _ = write!(xref, "{offset:010} 00000 n \n");
  }
  let _ = write!(
    xref,
    "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
    objects.len() + 1
  );
  out.extend_from_slice(xref.as_bytes());
  out
}
