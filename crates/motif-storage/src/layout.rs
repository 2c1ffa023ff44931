//! Results directory layout of the upstream embedding model.
//!
//! Every video has its own directory under the data root; the model writes
//! its outputs into a fixed sub-directory of it:
//!
//! ```text
//! <data_dir>/<video>/<model_subdir>/latent_vector_<video>.npy
//! <data_dir>/<video>/<model_subdir>/15_km_label_<video>.npy
//! ```

use std::path::{Path, PathBuf};

use motif_models::VideoId;

/// Placeholder replaced by the video id in file name templates.
pub const VIDEO_PLACEHOLDER: &str = "{}";

/// Where the per-video arrays live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    /// Root directory containing one directory per video
    pub data_dir: PathBuf,
    /// Model output sub-directory inside each video directory
    pub model_subdir: PathBuf,
    /// Latent file name template, `{}` is replaced by the video id
    pub latent_template: String,
    /// Label file name template, `{}` is replaced by the video id
    pub label_template: String,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_subdir: PathBuf::from("VAME/kmeans-15"),
            latent_template: "latent_vector_{}.npy".to_string(),
            label_template: "15_km_label_{}.npy".to_string(),
        }
    }

    pub fn with_model_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.model_subdir = subdir.into();
        self
    }

    pub fn with_templates(mut self, latent: impl Into<String>, label: impl Into<String>) -> Self {
        self.latent_template = latent.into();
        self.label_template = label.into();
        self
    }

    /// Directory holding one video's model outputs.
    pub fn video_dir(&self, video: &VideoId) -> PathBuf {
        self.data_dir.join(video.as_str()).join(&self.model_subdir)
    }

    pub fn latent_path(&self, video: &VideoId) -> PathBuf {
        self.video_dir(video)
            .join(render_template(&self.latent_template, video))
    }

    pub fn label_path(&self, video: &VideoId) -> PathBuf {
        self.video_dir(video)
            .join(render_template(&self.label_template, video))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn render_template(template: &str, video: &VideoId) -> String {
    template.replace(VIDEO_PLACEHOLDER, video.as_str())
}
