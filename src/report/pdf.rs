//! 보고서를 A4 PDF 바이트 스트림으로 만든다.
//!
//! 표준 Type1 글꼴(Helvetica)과 WinAnsi 인코딩을 사용하므로 그 밖의 문자는
//! 가까운 ASCII 표기로 바꿔 출력한다.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Report, ReportError};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 14;
const BODY_SIZE: i64 = 11;
const TITLE_SIZE: i64 = 14;
/// 로고 폭 30 mm
const LOGO_WIDTH: i64 = 85;
/// 로고 윗변과 페이지 위쪽 사이 여백
const LOGO_TOP: i64 = 23;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
            Font::Italic => b"F3",
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    font: Font,
    size: i64,
    centered: bool,
    warning: bool,
}

impl Line {
    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::Regular,
            size: BODY_SIZE,
            centered: false,
            warning: false,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            font: Font::Bold,
            size: 12,
            ..Self::body(text)
        }
    }

    fn blank() -> Self {
        Self::body("")
    }
}

struct Logo {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

fn load_logo(path: &Path) -> Result<Logo, image::ImageError> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Logo {
        width,
        height,
        rgb: img.into_raw(),
    })
}

/// 보고서를 PDF로 렌더링한다. 로고를 읽지 못하면 문서 안에 경고 줄을 남기고 계속한다.
pub fn render(report: &Report, logo: Option<&Path>) -> Result<Vec<u8>, ReportError> {
    let mut lines = Vec::new();
    let logo = match logo {
        Some(path) => match load_logo(path) {
            Ok(l) => Some(l),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "logo could not be loaded");
                lines.push(Line {
                    warning: true,
                    ..Line::body(format!("Logo load error: {e}"))
                });
                None
            }
        },
        None => None,
    };
    let logo_height = logo
        .as_ref()
        .map(|l| LOGO_WIDTH * l.height as i64 / l.width.max(1) as i64);

    lines.push(Line::body(format!("Engineer: {}", report.project.engineer_or_na())));
    lines.push(Line::body(format!("Job Number: {}", report.project.job_number_or_na())));
    lines.push(Line::body(format!("Date: {}", report.date.format("%Y-%m-%d"))));
    for section in &report.sections {
        lines.push(Line::blank());
        lines.push(Line::heading(section.title.clone()));
        for (label, value) in &section.rows {
            lines.push(Line::body(format!("{label}: {value}")));
        }
    }
    lines.push(Line::blank());
    lines.push(Line {
        font: Font::Italic,
        size: 10,
        centered: true,
        ..Line::body(report.footer.clone())
    });

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_ids = [
        add_font(&mut doc, "Helvetica"),
        add_font(&mut doc, "Helvetica-Bold"),
        add_font(&mut doc, "Helvetica-Oblique"),
    ];
    let logo_id = logo.as_ref().map(|l| add_image(&mut doc, l));

    let body_top = PAGE_HEIGHT - MARGIN - 2 * LINE_HEIGHT;
    // 로고는 제목 왼쪽 모서리에 놓이므로 본문은 로고 아랫변만 피하면 된다.
    let first_top = match logo_height {
        Some(h) => body_top.min(PAGE_HEIGHT - LOGO_TOP - h - LINE_HEIGHT),
        None => body_top,
    };
    let mut page_ids = Vec::new();
    let mut remaining = lines.as_slice();
    let mut first = true;
    while first || !remaining.is_empty() {
        let top = if first { first_top } else { body_top };
        let capacity = ((top - MARGIN) / LINE_HEIGHT).max(1) as usize;
        let take = capacity.min(remaining.len());
        let (page_lines, rest) = remaining.split_at(take);

        let mut ops = title_ops(&report.title);
        if let (true, Some(id), Some(height)) = (first, logo_id, logo_height) {
            ops.extend(image_ops(id.0, 28, PAGE_HEIGHT - LOGO_TOP - height, height));
        }
        let mut y = top;
        for line in page_lines {
            ops.extend(text_ops(line, y));
            y -= LINE_HEIGHT;
        }
        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(page_dict(pages_id, content_id, &font_ids, logo_id.filter(|_| first)));
        page_ids.push(page_id);

        remaining = rest;
        first = false;
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => page_ids.len() as i64,
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// PDF를 파일로 저장한다.
///
/// `path`가 디렉터리이거나 확장자가 없으면 디렉터리로 보고(없으면 만든다)
/// 기본 파일명을 붙인다. 파일 경로이면 상위 디렉터리를 만든다.
pub fn write(path: &Path, report: &Report, logo: Option<&Path>) -> Result<PathBuf, ReportError> {
    let target = if path.is_dir() || path.extension().is_none() {
        fs::create_dir_all(path)?;
        path.join(report.default_file_name())
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        path.to_path_buf()
    };
    let bytes = render(report, logo)?;
    fs::write(&target, bytes)?;
    tracing::info!(path = %target.display(), "report written");
    Ok(target)
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn add_image(doc: &mut Document, logo: &Logo) -> ObjectId {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => logo.width as i64,
        "Height" => logo.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    doc.add_object(Stream::new(dict, logo.rgb.clone()))
}

fn image_name(id: u32) -> Vec<u8> {
    format!("Im{id}").into_bytes()
}

fn page_dict(
    parent: ObjectId,
    content: ObjectId,
    fonts: &[ObjectId; 3],
    image: Option<ObjectId>,
) -> Dictionary {
    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => fonts[0],
            "F2" => fonts[1],
            "F3" => fonts[2],
        },
    };
    if let Some(id) = image {
        let mut xobjects = Dictionary::new();
        xobjects.set(image_name(id.0), Object::Reference(id));
        resources.set("XObject", xobjects);
    }
    let media_box: Vec<Object> = vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()];
    dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => media_box,
        "Contents" => content,
        "Resources" => resources,
    }
}

fn title_ops(title: &str) -> Vec<Operation> {
    let line = Line {
        font: Font::Bold,
        size: TITLE_SIZE,
        centered: true,
        ..Line::body(title)
    };
    text_ops(&line, PAGE_HEIGHT - MARGIN)
}

fn image_ops(object_number: u32, x: i64, y: i64, height: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                LOGO_WIDTH.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                y.into(),
            ],
        ),
        Operation::new("Do", vec![Object::Name(image_name(object_number))]),
        Operation::new("Q", vec![]),
    ]
}

fn text_ops(line: &Line, y: i64) -> Vec<Operation> {
    if line.text.is_empty() {
        return Vec::new();
    }
    let bytes = win_ansi(&line.text);
    let x = if line.centered {
        // Helvetica 평균 글자 폭 ≈ 0.5 em
        let width = bytes.len() as i64 * line.size / 2;
        ((PAGE_WIDTH - width) / 2).max(MARGIN)
    } else {
        MARGIN
    };
    let mut ops = Vec::with_capacity(7);
    if line.warning {
        ops.push(Operation::new("rg", vec![1.into(), 0.into(), 0.into()]));
    }
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(line.font.resource_name().to_vec()), line.size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(bytes, StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
    if line.warning {
        ops.push(Operation::new("rg", vec![0.into(), 0.into(), 0.into()]));
    }
    ops
}

/// WinAnsi로 표현되지 않는 기호는 ASCII 표기로 바꾼다.
fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'Ω' => out.extend_from_slice(b"Ohm"),
            '≤' => out.extend_from_slice(b"<="),
            '≥' => out.extend_from_slice(b">="),
            '–' => out.push(0x96),
            '—' => out.push(0x97),
            '×' => out.push(0xD7),
            c if (c as u32) < 0x100 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}
