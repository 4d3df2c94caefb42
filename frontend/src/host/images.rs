use log::debug;
use web_sys::{Document, HtmlImageElement};
use wasm_bindgen::JsCast;

use super::dom::query_all;
use crate::error::HostError;

const BACKFILL_WIDTH: u32 = 400;
// used when the browser doesn't know the natural size yet
const FALLBACK_RATIO: (u32, u32) = (400, 200);

/// Width/height to reserve for an image of the given natural size, so lazy
/// images don't shift the layout when they arrive.
pub fn backfill_size(natural_width: u32, natural_height: u32) -> (u32, u32) {
    let width = if natural_width == 0 { FALLBACK_RATIO.0 } else { natural_width };
    let height = if natural_height == 0 { FALLBACK_RATIO.1 } else { natural_height };
    let ratio = f64::from(height) / f64::from(width);
    (BACKFILL_WIDTH, (f64::from(BACKFILL_WIDTH) * ratio).round() as u32)
}

pub fn backfill_lazy_images(document: &Document) -> Result<usize, HostError> {
    let mut filled = 0;
    for element in query_all(document, "img[loading=\"lazy\"]")? {
        let Ok(img) = element.dyn_into::<HtmlImageElement>() else {
            continue;
        };
        if img.width() > 0 && img.height() > 0 {
            continue;
        }
        let (width, height) = backfill_size(img.natural_width(), img.natural_height());
        img.set_width(width);
        img.set_height(height);
        filled += 1;
    }
    debug!("reserved space for {} lazy images", filled);
    Ok(filled)
}
