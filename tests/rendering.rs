use chrono::NaiveDate;
use dashboard_report::builder::{RenderedPdf, ReportBuilder};
use dashboard_report::charts::{ChartBlock, ChartKind};
use dashboard_report::data::{DataPoint, LabelChain};
use dashboard_report::export::{self, ExportSection, PdfOptions};
use dashboard_report::fonts;
use dashboard_report::model::{Block, Cover, KpiCard, Section};
use dashboard_report::richtext::Span;
use sha2::{Digest, Sha256};

const SKIP_REASON: &str =
    "fonts missing. Set DASHBOARD_REPORT_FONTS_DIR or copy assets/fonts next to the binary.";

fn segments() -> Vec<DataPoint> {
    vec![
        DataPoint::new()
            .with("segment", "Particuliers")
            .with("n", 1_250_000.5)
            .with("n_1", 1_100_000),
        DataPoint::new()
            .with("segment", "Entreprises")
            .with("n", 830_000)
            .with("n_1", 910_000),
        DataPoint::new()
            .with("segment", "Institutionnels")
            .with("n", 0)
            .with("n_1", 15_000),
    ]
}

fn sample_report() -> ReportBuilder {
    let labels = LabelChain::field("segment").or_synthesized("Segment");
    ReportBuilder::new()
        .with_title("Portefeuille")
        .with_header(Some("Portefeuille".to_string()))
        .with_cover(
            Cover::new("Portefeuille")
                .with_subtitle(Some("Mars 2024".to_string()))
                .with_block(Block::Kpis(vec![
                    KpiCard::new("Encours", "2 080 000,5"),
                    KpiCard::new("Clients", "1 204").with_caption(Some("actifs".to_string())),
                ])),
        )
        .add_section(
            Section::builder("Répartition")
                .start_on_new_page(true)
                .push_block(Block::Chart(
                    ChartBlock::new(ChartKind::Pie, segments(), "n").with_labels(labels.clone()),
                ))
                .push_block(Block::Chart(
                    ChartBlock::new(ChartKind::Bar, Vec::new(), "n")
                        .with_title(Some("Sans données".to_string())),
                ))
                .build(),
        )
        .add_section(
            Section::builder("Comparaison")
                .start_on_new_page(true)
                .push_block(Block::paragraph(vec![Span::new("Évolution sur un an").bold()]))
                .push_block(Block::Chart(
                    ChartBlock::new(ChartKind::SectorComparison, segments(), "n")
                        .with_labels(labels.clone())
                        .with_comparison("n_1", "2024", "2023"),
                ))
                .push_block(Block::Chart(
                    ChartBlock::new(ChartKind::HorizontalBar, segments(), "n").with_labels(labels),
                ))
                .push_block(Block::table(&segments()))
                .build(),
        )
}

fn render_sample_pdf() -> Option<RenderedPdf> {
    if !fonts::default_fonts_available() {
        return None;
    }
    Some(sample_report().render().expect("render sample pdf"))
}

fn options() -> PdfOptions {
    PdfOptions::new("Encours").with_date(NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date"))
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            if let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            {
                let start_index = offset + start_pos + start.len();
                if let Some(end_pos) = data[start_index..]
                    .windows(end.len())
                    .position(|window| window == end)
                {
                    for byte in &mut data[start_index..start_index + end_pos] {
                        if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                            *byte = b'0';
                        }
                    }
                    offset = start_index + end_pos + end.len();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(
        &mut normalized,
        b"<xmp:MetadataDate>",
        b"</xmp:MetadataDate>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:DocumentID>",
        b"</xmpMM:DocumentID>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:InstanceID>",
        b"</xmpMM:InstanceID>",
    );
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn renders_non_empty_output() {
    let Some(pdf) = render_sample_pdf() else {
        eprintln!("Skipping renders_non_empty_output: {SKIP_REASON}");
        return;
    };
    assert!(pdf.bytes.starts_with(b"%PDF"), "rendered output should be a PDF");
    assert!(pdf.page_count >= 3);
}

#[test]
fn sections_start_on_their_own_pages() {
    let Some(pdf) = render_sample_pdf() else {
        eprintln!("Skipping sections_start_on_their_own_pages: {SKIP_REASON}");
        return;
    };
    assert_eq!(pdf.section_pages.len(), 2);
    assert_eq!(pdf.section_pages[0], Some(2));
    let second = pdf.section_pages[1].expect("second section rendered");
    assert!(second > 2, "second section starts after the first one");
    assert!(second <= pdf.page_count);
}

#[test]
fn rendering_is_deterministic() {
    let Some(pdf_a) = render_sample_pdf() else {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_REASON}");
        return;
    };
    let Some(pdf_b) = render_sample_pdf() else {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_REASON}");
        return;
    };

    assert_eq!(pdf_a.bytes.len(), pdf_b.bytes.len(), "PDF sizes should match");

    let hash_a = normalized_hash(&pdf_a.bytes);
    let hash_b = normalized_hash(&pdf_b.bytes);

    assert_eq!(
        hash_a, hash_b,
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn dashboard_has_cover_and_one_page_per_section() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping dashboard_has_cover_and_one_page_per_section: {SKIP_REASON}");
        return;
    }

    let sections = vec![
        ExportSection::new("Encours par agence", segments()),
        ExportSection::new("Impayés", Vec::new()),
    ];
    let pdf = export::to_dashboard_pdf(&sections, &options()).expect("render dashboard");

    assert_eq!(pdf.page_count, 3);
    assert_eq!(pdf.section_pages, vec![Some(2), Some(3)]);
}

#[test]
fn empty_table_export_is_a_single_page() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping empty_table_export_is_a_single_page: {SKIP_REASON}");
        return;
    }

    let pdf = export::to_pdf_table(&[], &options()).expect("render empty table");
    assert_eq!(pdf.page_count, 1);
    assert!(!pdf.bytes.is_empty());
}

#[test]
fn wide_table_export_renders() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping wide_table_export_renders: {SKIP_REASON}");
        return;
    }

    let row = (0..9).fold(DataPoint::new(), |row, column| {
        row.with(format!("col_{column}"), column * 1000)
    });
    let records = vec![row; 40];
    let pdf = export::to_pdf_table(&records, &options()).expect("render wide table");
    assert!(pdf.page_count >= 1);
    assert_eq!(pdf.section_pages.len(), 1);
}
