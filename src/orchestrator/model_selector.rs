use crate::models::GeminiConfig;

/// What a model call is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTask {
    /// Rule review; `free` picks the cheaper model
    Review { free: bool },
    /// Patch generation from an existing report
    Patch,
}

/// Model selector for choosing the Gemini model per task
pub struct ModelSelector<'a> {
    config: &'a GeminiConfig,
}

impl<'a> ModelSelector<'a> {
    pub fn new(config: &'a GeminiConfig) -> Self {
        Self { config }
    }

    pub fn select(&self, task: ModelTask) -> &'a str {
        match task {
            ModelTask::Review { free: true } => &self.config.free_model,
            ModelTask::Review { free: false } => &self.config.paid_model,
            ModelTask::Patch => &self.config.patch_model,
        }
    }
}
