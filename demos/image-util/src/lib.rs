use std::path::Path;

use anyhow::{bail, Context};
use image::{Rgb, RgbImage};
use ndarray::Array2;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

pub fn save_plate(path: &Path, cells: &Array2<bool>, scale: u32) -> anyhow::Result<()> {
    let (width, height) = cells.dim();

    if width == 0 || height == 0 {
        bail!("plate is empty");
    }
    if scale == 0 {
        bail!("scale must be at least 1");
    }

    let mut img = RgbImage::new(width as u32 * scale, height as u32 * scale);

    for ((x, y), &lit) in cells.indexed_iter() {
        let l = if lit { 255 } else { 0 };
        for dx in 0..scale {
            for dy in 0..scale {
                img.put_pixel(x as u32 * scale + dx, y as u32 * scale + dy, Rgb([l, l, l]));
            }
        }
    }

    img.save(path)?;

    Ok(())
}

pub fn save_chart(path: &Path, stars: &Array2<i64>, size: u32) -> anyhow::Result<()> {
    const MARGIN: f32 = 12.0;
    const RADIUS: f32 = 2.5;

    if stars.nrows() == 0 {
        bail!("no stars to chart");
    }
    if (size as f32) <= 2.0 * MARGIN {
        bail!("chart size must exceed {} pixels", 2.0 * MARGIN);
    }

    let bound = |axis: usize| {
        let column = stars.column(axis);
        let min = column.iter().copied().min().unwrap_or(0);
        let max = column.iter().copied().max().unwrap_or(0);
        (min, max)
    };
    let (min_x, max_x) = bound(0);
    let (min_y, max_y) = bound(1);

    // One scale for both axes keeps the star layout undistorted.
    let span = (max_x - min_x).max(max_y - min_y).max(1) as f32;
    let fit = (size as f32 - 2.0 * MARGIN) / span;

    let mut pixmap = Pixmap::new(size, size).context("allocating pixmap")?;
    pixmap.fill(Color::from_rgba8(8, 10, 24, 255));

    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 243, 209, 255);
    paint.anti_alias = true;

    let mut dots = PathBuilder::new();
    for star in stars.rows() {
        let px = MARGIN + (star[0] - min_x) as f32 * fit;
        let py = MARGIN + (star[1] - min_y) as f32 * fit;
        dots.push_circle(px, py, RADIUS);
    }
    let dots = dots.finish().context("building chart path")?;

    pixmap.fill_path(&dots, &paint, FillRule::Winding, Transform::identity(), None);
    pixmap.save_png(path)?;

    Ok(())
}
