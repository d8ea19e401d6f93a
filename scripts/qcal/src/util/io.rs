use std::path::Path;

use anyhow::{bail, ensure, Context};
use dialoguer::Confirm;
use qcalendar::Calendar;

// -----------------------------------------------------------------------------
// DocFormat
// -----------------------------------------------------------------------------
/// Format of a calendar document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Json,
    Yaml,
}

impl DocFormat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(DocFormat::Json),
            Some("yaml" | "yml") => Ok(DocFormat::Yaml),
            _ => bail!("Unsupported calendar document {:?}. Use .json, .yaml or .yml", path),
        }
    }

    pub fn parse(&self, text: &str) -> anyhow::Result<Calendar> {
        let cal = match self {
            DocFormat::Json => serde_json::from_str(text)?,
            DocFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(cal)
    }

    pub fn render(&self, cal: &Calendar) -> anyhow::Result<String> {
        let text = match self {
            DocFormat::Json => serde_json::to_string_pretty(cal)? + "\n",
            DocFormat::Yaml => serde_yaml::to_string(cal)?,
        };
        Ok(text)
    }
}

// -----------------------------------------------------------------------------
// load / save
// -----------------------------------------------------------------------------
pub fn load_calendar(path: &Path) -> anyhow::Result<Calendar> {
    let format = DocFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar from {:?}", path))?;
    let cal = format
        .parse(&text)
        .with_context(|| format!("Invalid calendar document {:?}", path))?;
    log::info!(
        "Loaded calendar from {:?}: range={:?}, holidays={}",
        path,
        cal.valid_range(),
        cal.num_holidays()
    );
    Ok(cal)
}

pub fn save_calendar(cal: &Calendar, path: &Path, force: bool) -> anyhow::Result<()> {
    let text = DocFormat::from_path(path)?.render(cal)?;
    write_output(path, &text, force)
}

/// Write `text` to `path`, asking before overwriting an existing file unless `force` is set.
pub fn write_output(path: &Path, text: &str, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        let confirmed = Confirm::new()
            .default(false)
            .show_default(true)
            .with_prompt(format!(
                "Output file already exists at {:?}. \nDo you want to overwrite it?",
                path
            ))
            .interact()?;
        ensure!(confirmed, "Operation cancelled.");
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
    log::info!("Wrote {:?}", path);
    Ok(())
}

/// A path in the temporary directory unique to this process.
#[cfg(test)]
pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("qcal-{}-{name}", std::process::id()))
}
