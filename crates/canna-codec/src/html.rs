//! HTML report.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::report::{NOTICE, Report, TITLE};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; color: #333; }
h1 { color: #2E7D32; border-bottom: 2px solid #2E7D32; padding-bottom: 10px; }
h2 { color: #2E7D32; margin-top: 30px; }
.header-info p { margin: 5px 0; }
table { width: 100%; border-collapse: collapse; margin-bottom: 30px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
tr:nth-child(even) { background-color: #f9f9f9; }
.footer { margin-top: 50px; border-top: 1px solid #ddd; padding-top: 10px; font-size: 12px; color: #666; }
";

pub fn export(report: &Report) -> Vec<u8> {
  let mut out = String::new();
  // Writing to a String cannot fail.
  let _ = render(report, &mut out);
  out.into_bytes()
}

fn render(report: &Report, out: &mut String) -> std::fmt::Result {
  writeln!(out, "<!DOCTYPE html>")?;
  writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">")?;
  writeln!(out, "<title>{TITLE}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>")?;
  writeln!(out, "<h1>{TITLE}</h1>")?;

  writeln!(out, "<div class=\"header-info\">")?;
  for (label, value) in &report.header {
    writeln!(out, "<p><strong>{label}:</strong> {}</p>", escape(value))?;
  }
  writeln!(out, "</div>")?;

  for section in &report.sections {
    writeln!(out, "<h2>{}</h2>", escape(&section.title))?;
    writeln!(out, "<table>\n<thead>\n<tr>")?;
    for header in &section.headers {
      writeln!(out, "<th>{header}</th>")?;
    }
    writeln!(out, "</tr>\n</thead>\n<tbody>")?;
    for row in &section.rows {
      write!(out, "<tr>")?;
      for cell in row {
        write!(out, "<td>{}</td>", escape(cell.text()))?;
      }
      writeln!(out, "</tr>")?;
    }
    writeln!(out, "</tbody>\n</table>")?;
  }

  writeln!(out, "<div class=\"footer\">")?;
  writeln!(out, "<p>{NOTICE}</p>\n<p>{}</p>", escape(&report.footer))?;
  writeln!(out, "</div>\n</body>\n</html>")
}
