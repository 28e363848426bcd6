//! Built-in named palettes.
//!
//! Every preset expands to palette text in one of the accepted forms, so a
//! preset loads exactly like the equivalent hand-written palette.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use once_cell::sync::Lazy;

/// Samples taken from each continuous gradient.
const GRADIENT_SAMPLES: usize = 16;

const FIXED: &[(&str, &str)] = &[
    ("greyscale", "black white"),
    ("grayscale", "black white"),
    (
        "topology",
        "#66bb33 #00ff00 #3333ff #00ffff #ffff77 #ff8800 #ff0000 #000000",
    ),
    ("rainbow", "#a020f0 #0000ff #00ff00 #ffff00 #ffa500 #ff0000 #000000"),
    ("heat", "#000000 #ff0000 #ffff00 #ffffff"),
    ("bluered", "#0000ff #1e90ff #00ced1 #ffe4c4 #ffa500 #b22222"),
];

/// Blue to red through a light grey; good for temperature anomalies
#[rustfmt::skip]
const COOLWARM: [[u8; 3]; 32] = [
    [59, 76, 192], [68, 90, 204], [77, 104, 215], [87, 117, 225],
    [98, 130, 234], [108, 142, 241], [119, 154, 247], [130, 165, 251],
    [141, 176, 254], [152, 185, 255], [163, 194, 255], [174, 201, 253],
    [184, 208, 249], [194, 213, 244], [204, 217, 238], [213, 219, 230],
    [221, 221, 221], [229, 216, 209], [236, 211, 197], [241, 204, 185],
    [245, 196, 173], [247, 187, 160], [247, 177, 148], [247, 166, 135],
    [244, 154, 123], [241, 141, 111], [236, 127, 99], [229, 112, 88],
    [222, 96, 77], [213, 80, 66], [203, 62, 56], [192, 40, 47],
];

#[rustfmt::skip]
const SEISMIC: [[u8; 3]; 15] = [
    [0, 0, 127], [0, 0, 191], [0, 63, 255], [0, 127, 255], [0, 191, 255],
    [127, 223, 255], [191, 239, 255], [255, 255, 255], [255, 239, 191],
    [255, 223, 127], [255, 191, 0], [255, 127, 0], [255, 63, 0],
    [191, 0, 0], [127, 0, 0],
];

static PRESETS: Lazy<BTreeMap<&'static str, String>> = Lazy::new(|| {
    let mut presets: BTreeMap<&'static str, String> = FIXED
        .iter()
        .map(|&(name, palette)| (name, palette.to_string()))
        .collect();

    presets.insert("coolwarm", hex_list(COOLWARM.iter()));
    presets.insert("rdbu", hex_list(COOLWARM.iter().rev()));
    presets.insert("seismic", hex_list(SEISMIC.iter()));

    let gradients = [
        ("viridis", colorgrad::viridis()),
        ("plasma", colorgrad::plasma()),
        ("inferno", colorgrad::inferno()),
        ("magma", colorgrad::magma()),
        ("cividis", colorgrad::cividis()),
        ("turbo", colorgrad::turbo()),
        ("spectral", colorgrad::spectral()),
    ];
    for (name, gradient) in gradients {
        let samples: Vec<[u8; 3]> = (0..GRADIENT_SAMPLES)
            .map(|i| {
                let [r, g, b, _] = gradient
                    .at(i as f64 / (GRADIENT_SAMPLES - 1) as f64)
                    .to_rgba8();
                [r, g, b]
            })
            .collect();
        presets.insert(name, hex_list(samples.iter()));
    }

    presets.insert("cubehelix", cube_helix(&CubeHelix::default()));
    presets
});

fn hex_list<'a>(colours: impl Iterator<Item = &'a [u8; 3]>) -> String {
    colours
        .map(|[r, g, b]| format!("#{:02x}{:02x}{:02x}", r, g, b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Palette text for a named preset, matched case-insensitively.
pub fn lookup(name: &str) -> Option<String> {
    let name = name.trim().to_ascii_lowercase();
    PRESETS.get(name.as_str()).cloned()
}

/// Names of every built-in preset, sorted.
pub fn names() -> Vec<&'static str> {
    PRESETS.keys().copied().collect()
}

/// Parameters of a cubehelix spectrum (D.A. Green 2011, "A colour scheme
/// for the display of astronomical intensity images").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeHelix {
    /// Intervals produced; the palette has `samples + 1` stops
    pub samples: usize,
    /// Start colour, 1 = red, 2 = green, 3 = blue
    pub start: f64,
    /// Rotations through the spectrum, negative to reverse
    pub rotations: f64,
    /// Saturation, 0 = greyscale, above 1 oversaturates
    pub saturation: f64,
    pub gamma: f64,
    /// Alpha ramp `[min, max]`; opaque when unset
    pub alpha: Option<[f64; 2]>,
}

impl Default for CubeHelix {
    fn default() -> Self {
        CubeHelix {
            samples: 16,
            start: 0.5,
            rotations: -0.9,
            saturation: 1.0,
            gamma: 1.0,
            alpha: None,
        }
    }
}

/// Cubehelix palette as `position=rgba(...)` lines, with monotonic
/// intensity.
pub fn cube_helix(params: &CubeHelix) -> String {
    let samples = params.samples.max(1);
    let mut lines = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        let fraction = i as f64 / samples as f64;
        let angle = 2.0 * PI * (params.start / 3.0 + 1.0 + params.rotations * fraction);
        let amplitude = params.saturation * fraction * (1.0 - fraction);
        let fraction = fraction.powf(params.gamma);
        let (sin, cos) = angle.sin_cos();

        let r = fraction + amplitude * (-0.14861 * cos + 1.78277 * sin);
        let g = fraction + amplitude * (-0.29227 * cos - 0.90649 * sin);
        let b = fraction + amplitude * (1.97294 * cos);
        let a = match params.alpha {
            Some([low, high]) => low + (high - low) * fraction,
            None => 1.0,
        };
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;
        lines.push(format!(
            "{}=rgba({},{},{},{})",
            fraction,
            byte(r),
            byte(g),
            byte(b),
            byte(a)
        ));
    }
    lines.join("\n")
}
