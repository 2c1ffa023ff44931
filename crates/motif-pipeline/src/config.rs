//! Run configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use motif_storage::DataLayout;

use crate::error::{PipelineError, PipelineResult};

/// Prefix of every configuration environment variable.
pub const ENV_PREFIX: &str = "MOTIF";

/// Analysis run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Root directory with one sub-directory per video
    pub data_dir: PathBuf,
    /// Where the selected-video list, matrix, dendrogram and manifest go
    pub output_dir: PathBuf,
    /// Model output sub-directory inside each video directory
    #[validate(length(min = 1))]
    pub model_subdir: String,
    #[validate(custom(function = "validate_template"))]
    pub latent_template: String,
    #[validate(custom(function = "validate_template"))]
    pub label_template: String,
    /// Motif list; defaults to `<output_dir>/filtered_motifs.txt`
    pub filtered_motifs_file: Option<PathBuf>,
    /// Fraction of video directories to sample
    #[validate(range(min = 0.0, max = 1.0))]
    pub sample_fraction: f64,
    pub seed: u64,
    /// Height at which the tree is cut into communities
    #[validate(range(min = 0.0))]
    pub cut_height: f64,
    /// Evaluate distance pairs on the rayon pool
    pub parallel: bool,
    /// Reuse a cached matrix when the pools fingerprint matches
    pub reuse_cached_matrix: bool,
    /// Write a motif usage chart per loaded video
    pub plot_motif_usage: bool,
    #[validate(range(min = 100, max = 10000))]
    pub plot_width: u32,
    #[validate(range(min = 100, max = 10000))]
    pub plot_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("results"),
            output_dir: PathBuf::from("results/community"),
            model_subdir: "VAME/kmeans-15".to_string(),
            latent_template: "latent_vector_{}.npy".to_string(),
            label_template: "15_km_label_{}.npy".to_string(),
            filtered_motifs_file: None,
            sample_fraction: 0.2,
            seed: 42,
            cut_height: 0.2,
            parallel: true,
            reuse_cached_matrix: true,
            plot_motif_usage: false,
            plot_width: 1000,
            plot_height: 700,
        }
    }
}

impl AnalysisConfig {
    /// Load layered configuration: defaults, then the optional file, then
    /// `MOTIF_*` environment variables. The result is validated.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        Self::from_sources(path, None)
    }

    /// Create config from defaults and `MOTIF_*` environment variables only.
    ///
    /// A variable that does not parse as its field's type is an error, not
    /// a silent fallback to the default.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_sources(None, None)
    }

    /// `vars` replaces the process environment when given.
    fn from_sources(path: Option<&Path>, vars: Option<Map<String, String>>) -> PipelineResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(vars),
        );

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PipelineError::config_error(e.to_string()))?;

        config.validate_config()?;
        Ok(config)
    }

    /// Check ranges and templates.
    pub fn validate_config(&self) -> PipelineResult<()> {
        self.validate()
            .map_err(|e| PipelineError::config_error(e.to_string()))?;

        // Range checks let NaN through
        if !self.sample_fraction.is_finite() {
            return Err(PipelineError::config_error("sample_fraction must be finite"));
        }
        if !self.cut_height.is_finite() {
            return Err(PipelineError::config_error("cut_height must be finite"));
        }
        Ok(())
    }

    pub fn filtered_motifs_path(&self) -> PathBuf {
        self.filtered_motifs_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("filtered_motifs.txt"))
    }

    pub fn data_layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
            .with_model_subdir(&self.model_subdir)
            .with_templates(&self.latent_template, &self.label_template)
    }
}

fn validate_template(template: &str) -> Result<(), ValidationError> {
    if template.contains(motif_storage::layout::VIDEO_PLACEHOLDER) {
        Ok(())
    } else {
        Err(ValidationError::new("missing_video_placeholder"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate_config().is_ok());
        assert_eq!(
            config.filtered_motifs_path(),
            PathBuf::from("results/community/filtered_motifs.txt")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("motif.toml");
        fs::write(
            &path,
            r#"
data_dir = "/data/videos"
output_dir = "/data/out"
sample_fraction = 0.5
seed = 7
cut_height = 1.5
plot_motif_usage = true
"#,
        )
        .unwrap();

        let config = AnalysisConfig::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/videos"));
        assert_eq!(config.sample_fraction, 0.5);
        assert_eq!(config.seed, 7);
        assert_eq!(config.cut_height, 1.5);
        assert!(config.plot_motif_usage);
        // Untouched keys keep their defaults
        assert_eq!(config.model_subdir, "VAME/kmeans-15");
        assert!(config.parallel);
    }

    #[test]
    fn test_load_rejects_out_of_range_fraction() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("motif.toml");
        fs::write(&path, "sample_fraction = 1.5\n").unwrap();

        assert!(matches!(
            AnalysisConfig::load(Some(&path)),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(AnalysisConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_from_env_without_variables() {
        // No MOTIF_* variables are set under test
        assert_eq!(AnalysisConfig::from_env().unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_env_variables_override_defaults() {
        let config = AnalysisConfig::from_sources(
            None,
            vars(&[
                ("MOTIF_CUT_HEIGHT", "0.75"),
                ("MOTIF_SEED", "9"),
                ("MOTIF_PARALLEL", "false"),
                ("MOTIF_DATA_DIR", "/srv/videos"),
            ]),
        )
        .unwrap();

        assert_eq!(config.cut_height, 0.75);
        assert_eq!(config.seed, 9);
        assert!(!config.parallel);
        assert_eq!(config.data_dir, PathBuf::from("/srv/videos"));
        assert_eq!(config.sample_fraction, 0.2);
    }

    #[test]
    fn test_env_rejects_unparsable_cut_height() {
        assert!(matches!(
            AnalysisConfig::from_sources(None, vars(&[("MOTIF_CUT_HEIGHT", "0,5")])),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_values_are_validated() {
        assert!(matches!(
            AnalysisConfig::from_sources(None, vars(&[("MOTIF_SAMPLE_FRACTION", "7")])),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("motif.toml");
        fs::write(&path, "cut_height = 1.5\nseed = 7\n").unwrap();

        let config =
            AnalysisConfig::from_sources(Some(&path), vars(&[("MOTIF_CUT_HEIGHT", "3.0")]))
                .unwrap();
        assert_eq!(config.cut_height, 3.0);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AnalysisConfig {
            cut_height: -0.1,
            ..Default::default()
        };
        assert!(config.validate_config().is_err());

        let config = AnalysisConfig {
            sample_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate_config().is_err());

        let config = AnalysisConfig {
            label_template: "labels.npy".to_string(),
            ..Default::default()
        };
        assert!(config.validate_config().is_err());
    }

    #[test]
    fn test_data_layout() {
        let config = AnalysisConfig {
            data_dir: PathBuf::from("/d"),
            model_subdir: "hmm".to_string(),
            ..Default::default()
        };
        let layout = config.data_layout();
        assert_eq!(
            layout.latent_path(&"v".into()),
            PathBuf::from("/d/v/hmm/latent_vector_v.npy")
        );
    }
}
