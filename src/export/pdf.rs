use super::reduced_dimensions;
use crate::error::{Result, SlipPdfError};
use image::imageops::{self, FilterType};
use image::GrayImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, RawImageData, RawImageFormat,
    XObjectTransform,
};
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_DPI: f32 = 100.0;

const MM_PER_INCH: f32 = 25.4;

fn px_to_mm(px: u32, dpi: f32) -> Mm {
    Mm(px as f32 / dpi * MM_PER_INCH)
}

/// 縮小後の画像を `dpi` で置いたときのページサイズ（幅, 高さ）
pub fn page_size((width, height): (u32, u32), dpi: f32) -> (Mm, Mm) {
    (px_to_mm(width, dpi), px_to_mm(height, dpi))
}

/// 縮小した白黒画像を1ページのPDFとして保存
///
/// ページサイズは縮小後の画像を `dpi` で置いた大きさ。
pub fn save_as_pdf(
    image: &GrayImage,
    output_path: &Path,
    reduction_factor: u32,
    dpi: f32,
) -> Result<()> {
    let (width, height) = reduced_dimensions(image.dimensions(), reduction_factor);
    debug!(width, height, "出力サイズ");
    let resized = imageops::resize(image, width, height, FilterType::Triangle);

    let title = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut doc = PdfDocument::new(&title);

    let raw = RawImage {
        pixels: RawImageData::U8(resized.into_raw()),
        width: width as usize,
        height: height as usize,
        data_format: RawImageFormat::R8,
        tag: Vec::new(),
    };
    let image_id = doc.add_image(&raw);

    let (page_width, page_height) = page_size((width, height), dpi);
    let page = PdfPage::new(
        page_width,
        page_height,
        vec![Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                dpi: Some(dpi),
                ..Default::default()
            },
        }],
    );

    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(vec![page])
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "PDF生成時の警告あり");
    }

    std::fs::write(output_path, bytes).map_err(|e| {
        SlipPdfError::PdfGeneration(format!("PDF保存エラー: {}: {}", output_path.display(), e))
    })?;

    info!(path = %output_path.display(), "PDFを保存しました");
    Ok(())
}
