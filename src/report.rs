//! JSON run reports
//!
//! A report summarises one generate-and-train run for the CLI. Reports are
//! write-only; nothing in the crate reads them back.

use crate::api::TrainedPerceptron;
use crate::core::{
    BiasPolicy, GeneratorConfig, Granularity, PerceptronError, Result, TrainerConfig, UpdateRule,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializable summary of a training run
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Ground-truth hyperplane, bias first
    pub w_star: Vec<f64>,
    /// Learned hyperplane, bias first
    pub weights: Vec<f64>,
    pub epochs: usize,
    pub updates: usize,
    pub converged: bool,
    /// Fraction of training points the learned weights label correctly
    pub accuracy: f64,
    /// Cosine between learned and ground-truth coefficients
    pub alignment: Option<f64>,
    pub negative_points: usize,
    pub positive_points: usize,
    pub metadata: ReportMetadata,
}

/// Run metadata for tracking
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Library version used for the run
    pub library_version: String,
    /// Seed of the generation stream; training used `seed + 1`
    pub seed: Option<u64>,
    pub generation: GenerationParams,
    pub training: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Generation parameters for reference
#[derive(Debug, Serialize)]
pub struct GenerationParams {
    pub n: usize,
    pub gamma: f64,
    pub dimensionality: usize,
    pub scale: f64,
    pub bias_policy: String,
}

/// Training parameters for reference
#[derive(Debug, Serialize)]
pub struct TrainingParams {
    pub training_rate: f64,
    pub update_rule: String,
    pub granularity: String,
    pub max_epochs: Option<usize>,
}

impl From<&GeneratorConfig> for GenerationParams {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            n: config.n,
            gamma: config.gamma,
            dimensionality: config.dimensionality,
            scale: config.scale,
            bias_policy: match config.bias_policy {
                BiasPolicy::Random => "random",
                BiasPolicy::ThroughOrigin => "origin",
            }
            .to_string(),
        }
    }
}

impl From<&TrainerConfig> for TrainingParams {
    fn from(config: &TrainerConfig) -> Self {
        Self {
            training_rate: config.training_rate,
            update_rule: match config.update_rule {
                UpdateRule::Observed => "observed",
                UpdateRule::Textbook => "textbook",
            }
            .to_string(),
            granularity: match config.granularity {
                Granularity::Epoch => "epoch",
                Granularity::Point => "point",
            }
            .to_string(),
            max_epochs: config.max_epochs,
        }
    }
}

impl RunReport {
    /// Build a report from a finished run and the configuration that produced it
    pub fn new(
        trained: &TrainedPerceptron,
        generator: &GeneratorConfig,
        trainer: &TrainerConfig,
        seed: Option<u64>,
    ) -> Self {
        let outcome = trained.outcome();
        let (negative_points, positive_points) = trained.dataset().class_counts();

        Self {
            w_star: outcome.w_star.as_slice().to_vec(),
            weights: outcome.weights.as_slice().to_vec(),
            epochs: outcome.epochs,
            updates: outcome.updates,
            converged: outcome.converged,
            accuracy: trained.accuracy(),
            alignment: trained.alignment(),
            negative_points,
            positive_points,
            metadata: ReportMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                seed,
                generation: generator.into(),
                training: trainer.into(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PerceptronError::SerializationError(e.to_string()))
    }

    /// Write the report as JSON to `writer`
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PerceptronError::SerializationError(e.to_string()))
    }

    /// Write the report as JSON to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(PerceptronError::IoError)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(PerceptronError::IoError)?;
        Ok(())
    }

    /// Print a human readable summary
    pub fn print_summary(&self) {
        println!("=== Perceptron Run Summary ===");
        println!("w*: {:?}", self.w_star);
        println!("w:  {:?}", self.weights);
        println!(
            "Converged: {} after {} epochs ({} corrections)",
            self.converged, self.epochs, self.updates
        );
        println!("Training accuracy: {:.2}%", self.accuracy * 100.0);
        if let Some(alignment) = self.alignment {
            println!("cos(w, w*): {alignment:.4}");
        }
        println!(
            "Points: {} negative, {} positive",
            self.negative_points, self.positive_points
        );
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
    }
}
