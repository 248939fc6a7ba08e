use super::extractor::{PaletteEntry, PaletteExtractor};
use crate::taxonomy::RgbSample;
use anyhow::{ensure, Result};
use image::{Rgb, RgbImage};
use kmeans_colors::get_kmeans;
use palette::Srgb;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Channel value above which a pixel counts as white when whites are ignored
const WHITE_THRESHOLD: u8 = 250;

/// Palette extractor built on seeded k-means in sRGB space
#[derive(Debug, Clone, Copy)]
pub struct KmeansPaletteExtractor {
    max_iterations: usize,
    convergence: f32,
    seed: u64,
}

impl Default for KmeansPaletteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansPaletteExtractor {
    pub fn new() -> Self {
        Self {
            max_iterations: 20,
            convergence: 0.0025,
            seed: 0,
        }
    }

    pub fn with_params(max_iterations: usize, convergence: f32, seed: u64) -> Self {
        Self {
            max_iterations,
            convergence,
            seed,
        }
    }

    fn sample_pixels(image: &RgbImage, quality: u32, ignore_white: bool) -> Vec<Rgb<u8>> {
        image
            .pixels()
            .step_by(quality as usize)
            .filter(|p| !(ignore_white && p.0.iter().all(|&c| c > WHITE_THRESHOLD)))
            .copied()
            .collect()
    }

    /// Exact palette for buffers with no more distinct colors than requested
    fn histogram(pixels: &[Rgb<u8>], color_count: usize) -> Option<Vec<(RgbSample, usize)>> {
        let mut counts: Vec<(RgbSample, usize)> = Vec::new();
        let mut positions: HashMap<Rgb<u8>, usize> = HashMap::new();

        for pixel in pixels {
            match positions.get(pixel) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    if counts.len() == color_count {
                        return None;
                    }
                    positions.insert(*pixel, counts.len());
                    counts.push(((*pixel).into(), 1));
                }
            }
        }

        Some(counts)
    }

    fn cluster(&self, pixels: &[Rgb<u8>], color_count: usize) -> Vec<(RgbSample, usize)> {
        let buf: Vec<Srgb> = pixels
            .iter()
            .map(|p| Srgb::new(p[0], p[1], p[2]).into_format())
            .collect();

        let kmeans = get_kmeans(
            color_count,
            self.max_iterations,
            self.convergence,
            false,
            &buf,
            self.seed,
        );

        let mut cluster_sizes = vec![0usize; kmeans.centroids.len()];
        for &index in &kmeans.indices {
            cluster_sizes[index as usize] += 1;
        }

        // Rounding to 8 bits can make centroids collide; merge them
        let mut counts: Vec<(RgbSample, usize)> = Vec::new();
        for (centroid, size) in kmeans.centroids.into_iter().zip(cluster_sizes) {
            if size == 0 {
                continue;
            }
            let rgb: Srgb<u8> = centroid.into_format();
            let color = RgbSample::new(rgb.red, rgb.green, rgb.blue);
            match counts.iter_mut().find(|(c, _)| *c == color) {
                Some(entry) => entry.1 += size,
                None => counts.push((color, size)),
            }
        }

        counts
    }
}

impl PaletteExtractor for KmeansPaletteExtractor {
    fn extract(
        &self,
        image: &RgbImage,
        color_count: usize,
        quality: u32,
        ignore_white: bool,
    ) -> Result<Vec<PaletteEntry>> {
        ensure!(color_count > 0, "at least one color must be requested");
        ensure!(quality > 0, "quality must be at least 1");

        let pixels = Self::sample_pixels(image, quality, ignore_white);
        if pixels.is_empty() {
            return Ok(Vec::new());
        }

        let counts = match Self::histogram(&pixels, color_count) {
            Some(counts) => counts,
            None => self.cluster(&pixels, color_count),
        };

        let total = pixels.len() as f32;
        let mut entries: Vec<PaletteEntry> = counts
            .into_iter()
            .map(|(color, count)| PaletteEntry::new(color, count as f32 / total))
            .collect();

        // Stable, so equal weights keep first-seen order
        entries.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(top: Rgb<u8>, bottom: Rgb<u8>, top_rows: u32) -> RgbImage {
        RgbImage::from_fn(20, 20, |_, y| if y < top_rows { top } else { bottom })
    }

    #[test]
    fn test_two_color_buffer_is_exact() {
        let image = striped(Rgb([255, 0, 255]), Rgb([30, 60, 90]), 18);
        let palette = KmeansPaletteExtractor::new()
            .extract(&image, 2, 1, false)
            .unwrap();

        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].color, RgbSample::new(255, 0, 255));
        assert_eq!(palette[1].color, RgbSample::new(30, 60, 90));
        assert!((palette[0].weight - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_buffer_has_one_entry() {
        let image = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let palette = KmeansPaletteExtractor::new()
            .extract(&image, 2, 10, false)
            .unwrap();
        assert_eq!(palette, vec![PaletteEntry::new(RgbSample::new(1, 2, 3), 1.0)]);
    }

    #[test]
    fn test_ignore_white() {
        let image = striped(Rgb([255, 255, 255]), Rgb([200, 10, 10]), 15);

        let with_white = KmeansPaletteExtractor::new()
            .extract(&image, 2, 1, false)
            .unwrap();
        assert_eq!(with_white[0].color, RgbSample::new(255, 255, 255));

        let without_white = KmeansPaletteExtractor::new()
            .extract(&image, 2, 1, true)
            .unwrap();
        assert_eq!(without_white.len(), 1);
        assert_eq!(without_white[0].color, RgbSample::new(200, 10, 10));
    }

    #[test]
    fn test_clusters_many_colors_into_requested_count() {
        let image = RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([250 - x as u8, 0, 0])
            } else {
                Rgb([0, 0, 200 + x as u8])
            }
        });

        let extractor = KmeansPaletteExtractor::with_params(50, 0.0001, 7);
        let palette = extractor.extract(&image, 2, 1, false).unwrap();

        assert_eq!(palette.len(), 2);
        let reds = palette.iter().filter(|e| e.color.r > 200 && e.color.b == 0).count();
        let blues = palette.iter().filter(|e| e.color.b > 200 && e.color.r == 0).count();
        assert_eq!((reds, blues), (1, 1));
        let total: f32 = palette.iter().map(|e| e.weight).sum();
        assert!((total - 1.0).abs() < 1e-5);

        assert_eq!(extractor.extract(&image, 2, 1, false).unwrap(), palette);
    }

    #[test]
    fn test_empty_after_filtering() {
        let image = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        let palette = KmeansPaletteExtractor::new()
            .extract(&image, 2, 1, true)
            .unwrap();
        assert!(palette.is_empty());
    }
}
