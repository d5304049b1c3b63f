/// Data layer: core types, loading, windowing and peak extraction.
///
/// Architecture:
/// ```text
///  uploaded .csv bytes (`;`-separated, one header line)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → Series  (LoadError per file)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpectrumSet   │  name → SpectrumEntry { series, label, color }
///   └──────────────┘
///        │  per render / export
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  window   │ ──▶ │  peaks    │  top-N negative peaks by prominence
///   └──────────┘     └──────────┘
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod peaks;
pub mod spectrum_set;
pub mod window;
