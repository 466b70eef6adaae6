//! `.docx` rendering of a [`Document`] through `docx-rs`.

use docx_rs::{
    BreakType, Docx, Paragraph, Pic, Run as DocxRun, RunFonts, Style, StyleType, Table, TableCell, TableRow,
};

use super::{Block, Document, MAX_HEADING_LEVEL, ParagraphStyle, Picture, Run};

/// English Metric Units per pixel at 96 dpi.
const EMU_PER_PIXEL: u32 = 9525;
const MONOSPACE_FONT: &str = "Courier New";

pub(super) fn render(document: &Document) -> Docx {
    let mut docx = with_styles(Docx::new());
    for block in document.blocks() {
        docx = match block {
            Block::Heading { text, level } => docx.add_paragraph(
                Paragraph::new()
                    .style(&heading_style(*level))
                    .add_run(DocxRun::new().add_text(text)),
            ),
            Block::Paragraph { runs, style } => docx.add_paragraph(paragraph(runs, *style)),
            Block::Table { rows } => docx.add_table(table(rows)),
            Block::Picture(picture) => docx.add_paragraph(Paragraph::new().add_run(picture_run(picture))),
            Block::PageBreak => docx.add_paragraph(Paragraph::new().add_run(DocxRun::new().add_break(BreakType::Page))),
        };
    }
    docx
}

fn heading_style(level: usize) -> String {
    match level {
        0 => "Title".to_string(),
        n => format!("Heading{}", n.min(MAX_HEADING_LEVEL)),
    }
}

fn with_styles(mut docx: Docx) -> Docx {
    docx = docx.add_style(Style::new("Title", StyleType::Paragraph).name("Title").size(56).bold());
    for level in 1..=MAX_HEADING_LEVEL {
        // Half-points: 32 for Heading1 down to 22.
        let size = 34usize.saturating_sub(2 * level).max(22);
        docx = docx.add_style(
            Style::new(&heading_style(level), StyleType::Paragraph)
                .name(format!("Heading {level}"))
                .size(size)
                .bold(),
        );
    }
    docx.add_style(Style::new("NoSpacing", StyleType::Paragraph).name("No Spacing"))
        .add_style(Style::new("ListBullet", StyleType::Paragraph).name("List Bullet"))
        .add_style(Style::new("ListNumber", StyleType::Paragraph).name("List Number"))
        .add_style(Style::new("Code", StyleType::Paragraph).name("Code").size(18))
}

fn paragraph(runs: &[Run], style: ParagraphStyle) -> Paragraph {
    let mut paragraph = Paragraph::new();
    if style != ParagraphStyle::Normal {
        paragraph = paragraph.style(style.style_id());
    }
    for run in runs {
        paragraph = paragraph.add_run(text_run(run, style == ParagraphStyle::Code));
    }
    paragraph
}

fn text_run(run: &Run, monospace: bool) -> DocxRun {
    if run.line_break {
        return DocxRun::new().add_break(BreakType::TextWrapping);
    }
    let mut out = DocxRun::new().add_text(&run.text);
    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    if run.underline {
        out = out.underline("single");
    }
    if run.monospace || monospace {
        out = out.fonts(RunFonts::new().ascii(MONOSPACE_FONT).hi_ansi(MONOSPACE_FONT));
    }
    out
}

fn table(rows: &[Vec<String>]) -> Table {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let cells = row
                .iter()
                .map(|cell| {
                    let mut run = DocxRun::new().add_text(cell);
                    if index == 0 {
                        run = run.bold();
                    }
                    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();
    Table::new(rows)
}

fn picture_run(picture: &Picture) -> DocxRun {
    let pic = Pic::new(&picture.bytes).size(
        picture.width.saturating_mul(EMU_PER_PIXEL),
        picture.height.saturating_mul(EMU_PER_PIXEL),
    );
    DocxRun::new().add_image(pic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles() {
        assert_eq!(heading_style(0), "Title");
        assert_eq!(heading_style(2), "Heading2");
        assert_eq!(heading_style(12), "Heading9");
    }
}
