use image::GrayImage;

/// Pre-processed template: zero-mean luma values plus their energy,
/// so each placement only needs the cross term and the window statistics.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    width: u32,
    height: u32,
    zero_mean: Vec<f32>,
    /// Sum of squared zero-mean values
    energy: f64,
}

impl Template {
    pub fn from_gray(id: impl Into<String>, gray: &GrayImage) -> Self {
        let (mean, _) = compute_stats(gray);
        let zero_mean: Vec<f32> = gray.pixels().map(|p| (p[0] as f64 - mean) as f32).collect();
        let energy = zero_mean.iter().map(|v| (*v as f64).powi(2)).sum();

        Self {
            id: id.into(),
            width: gray.width(),
            height: gray.height(),
            zero_mean,
            energy,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Correlation score for every placement of a template inside an image.
/// Placement (x, y) puts the template's top-left corner at that pixel.
#[derive(Debug, Clone)]
pub struct ScoreMap {
    width: u32,
    height: u32,
    scores: Vec<f32>,
}

/// A placement whose score passed the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

impl ScoreMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn score(&self, x: u32, y: u32) -> f32 {
        self.scores[(y * self.width + x) as usize]
    }

    /// Placements scoring at or above `threshold`, in raster order
    pub fn candidates(&self, threshold: f64) -> Vec<Candidate> {
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s as f64 >= threshold)
            .map(|(i, s)| Candidate {
                x: i as u32 % self.width,
                y: i as u32 / self.width,
                score: *s,
            })
            .collect()
    }
}

/// Compute mean and standard deviation of pixel values
fn compute_stats(img: &GrayImage) -> (f64, f64) {
    let n = (img.width() * img.height()) as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let mean = img.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let variance = img
        .pixels()
        .map(|p| (p[0] as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

/// Summed-area tables of pixel values and squared pixel values
struct Integral {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl Integral {
    fn new(img: &GrayImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0.0; stride * (h + 1)];
        let mut sum_sq = vec![0.0; stride * (h + 1)];

        for y in 0..h {
            let mut row = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = img.get_pixel(x as u32, y as u32)[0] as f64;
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + (x + 1);
                sum[idx] = sum[idx - stride] + row;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// (sum, sum of squares) over the w*h window at (x, y)
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
        let a = y * self.stride + x;
        let b = y * self.stride + x + w;
        let c = (y + h) * self.stride + x;
        let d = (y + h) * self.stride + x + w;
        (
            self.sum[d] - self.sum[b] - self.sum[c] + self.sum[a],
            self.sum_sq[d] - self.sum_sq[b] - self.sum_sq[c] + self.sum_sq[a],
        )
    }
}

/// Zero-mean normalized cross-correlation of `template` at every placement in `image`.
/// Scores lie in [-1.0, 1.0]; flat windows score 0.
/// Returns `None` when the template does not fit inside the image.
pub fn match_template(image: &GrayImage, template: &Template) -> Option<ScoreMap> {
    let (iw, ih) = (image.width(), image.height());
    let (tw, th) = (template.width, template.height);
    if tw == 0 || th == 0 || tw > iw || th > ih {
        return None;
    }

    let out_w = iw - tw + 1;
    let out_h = ih - th + 1;
    let n = (tw * th) as f64;

    let pixels: Vec<f32> = image.pixels().map(|p| p[0] as f32).collect();
    let integral = Integral::new(image);

    let mut scores = vec![0.0f32; (out_w * out_h) as usize];
    for y in 0..out_h as usize {
        for x in 0..out_w as usize {
            let (sum, sum_sq) = integral.window(x, y, tw as usize, th as usize);
            let window_energy = sum_sq - sum * sum / n;
            let denom = (template.energy * window_energy).sqrt();
            if denom < 1e-6 {
                continue;
            }

            // Template values are zero-mean, so the window mean cancels out of the cross term
            let mut cross = 0.0f64;
            for ty in 0..th as usize {
                let img_row = &pixels[(y + ty) * iw as usize + x..][..tw as usize];
                let tmpl_row = &template.zero_mean[ty * tw as usize..][..tw as usize];
                let row: f32 = img_row.iter().zip(tmpl_row).map(|(i, t)| i * t).sum();
                cross += row as f64;
            }

            scores[y * out_w as usize + x] = (cross / denom).clamp(-1.0, 1.0) as f32;
        }
    }

    Some(ScoreMap {
        width: out_w,
        height: out_h,
        scores,
    })
}
