use crate::{Result, VisualTestError};
use std::path::PathBuf;
use std::process::Command;

/// Example binary that renders scenes to PNG
pub const RENDER_EXAMPLE: &str = "outline_png";

/// Configuration for rendering a scene
pub struct CaptureConfig {
    /// Name of the scene to render
    pub scene: String,
    /// Path where the rendered image will be saved
    pub output_path: PathBuf,
}

/// Render a scene headlessly and save it to `output_path`
pub fn capture_scene(config: &CaptureConfig) -> Result<()> {
    let workspace_dir = env!("CARGO_MANIFEST_DIR").replace("/visual_tests", "");

    let output_path = config.output_path.to_str().ok_or_else(|| {
        VisualTestError::Capture(format!(
            "Output path is not valid UTF-8: {}",
            config.output_path.display()
        ))
    })?;

    let output = Command::new("cargo")
        .args(["run", "--example", RENDER_EXAMPLE, "--", &config.scene, output_path])
        .current_dir(&workspace_dir)
        .output()
        .map_err(|e| VisualTestError::Capture(format!("Failed to run cargo: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(VisualTestError::Capture(format!(
            "Scene '{}' failed to render:\nstdout: {}\nstderr: {}",
            config.scene, stdout, stderr
        )));
    }

    // Verify the image was created
    if !config.output_path.exists() {
        return Err(VisualTestError::Capture(format!(
            "Image was not created at {}",
            config.output_path.display()
        )));
    }

    Ok(())
}
