use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Absorption band: centre (cm⁻¹), width (cm⁻¹), depth (%T).
type Band = (f64, f64, f64);

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Transmission trace: a flat baseline with Gaussian absorption bands
/// subtracted, plus noise.
fn generate_transmission(
    wavenumbers: &[f64],
    bands: &[Band],
    baseline: f64,
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavenumbers
        .iter()
        .map(|&wn| {
            let absorption: f64 = bands
                .iter()
                .map(|&(mu, sigma, depth)| gaussian(wn, mu, sigma, depth))
                .sum();
            (baseline - absorption + rng.gauss(0.0, noise_level)).clamp(0.0, 100.0)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_trace(path: &Path, wavenumbers: &[f64], transmission: &[f64]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Wavenumber", "Transmission"])?;
    for (wn, t) in wavenumbers.iter().zip(transmission) {
        writer.write_record([format!("{wn:.2}"), format!("{t:.3}")])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_spectra"));
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // Wavenumbers: 4000 → 400, step ~1.93 (typical ATR-FTIR resolution)
    let wavenumbers: Vec<f64> = (0..1868).map(|i| 4000.0 - i as f64 * 1.928).collect();

    let samples: Vec<(&str, Vec<Band>)> = vec![
        // O–H stretch, C–H stretch, C=O, C–O
        ("ethanol", vec![(3330.0, 120.0, 55.0), (2970.0, 20.0, 35.0), (1045.0, 15.0, 70.0), (880.0, 10.0, 30.0)]),
        ("acetone", vec![(3005.0, 15.0, 15.0), (1715.0, 12.0, 80.0), (1360.0, 10.0, 45.0), (1220.0, 12.0, 50.0)]),
        ("polystyrene", vec![(3026.0, 8.0, 40.0), (2920.0, 12.0, 45.0), (1601.0, 5.0, 30.0), (1493.0, 5.0, 55.0), (1452.0, 6.0, 50.0), (756.0, 6.0, 70.0), (698.0, 6.0, 85.0)]),
    ];

    for (name, bands) in &samples {
        let transmission = generate_transmission(&wavenumbers, bands, 95.0, 0.15, &mut rng);
        let path = out_dir.join(format!("{name}.csv"));
        write_trace(&path, &wavenumbers, &transmission)?;
        println!("Wrote {} ({} points)", path.display(), wavenumbers.len());
    }

    // A file whose transmission column never parses, for exercising skips.
    let broken = out_dir.join("broken.csv");
    let mut text = String::from("Wavenumber;Transmission\n");
    for wn in wavenumbers.iter().step_by(100) {
        text.push_str(&format!("{wn:.2};n/a\n"));
    }
    fs::write(&broken, text).with_context(|| format!("writing {}", broken.display()))?;
    println!("Wrote {}", broken.display());

    Ok(())
}
