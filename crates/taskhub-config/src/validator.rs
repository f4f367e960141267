//! Configuration validation.

use std::collections::HashSet;

use taskhub_protocols::ChannelKind;

use crate::schema::Config;

/// Ids of templates every registry is seeded with.
const BUILTIN_TEMPLATE_IDS: [&str; 3] = ["default", "phase", "research"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_coordinator(config, &mut result);
        Self::validate_logging(config, &mut result);
        Self::validate_templates(config, &mut result);

        result
    }

    fn validate_coordinator(config: &Config, result: &mut ValidationResult) {
        let coordinator = &config.coordinator;

        if coordinator.save_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "coordinator.save_interval_secs",
                "save_interval_secs must be greater than 0",
            ));
        }

        if coordinator.cleanup_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "coordinator.cleanup_interval_secs",
                "cleanup_interval_secs must be greater than 0",
            ));
        }

        if coordinator.cleanup_interval_secs > 0
            && coordinator.cleanup_interval_secs < coordinator.save_interval_secs
        {
            result.add_warning(ValidationWarning::new(
                "coordinator.cleanup_interval_secs",
                "cleanup runs more often than saves; archived servers may vanish before being persisted",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "level cannot be empty",
            ));
        }
    }

    fn validate_templates(config: &Config, result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, template) in config.templates.iter().enumerate() {
            let path = format!("templates[{}]", i);

            if template.id.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.id", path),
                    "template id cannot be empty",
                ));
            } else if !seen.insert(template.id.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.id", path),
                    format!("duplicate template id '{}'", template.id),
                ));
            } else if BUILTIN_TEMPLATE_IDS.contains(&template.id.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.id", path),
                    format!("'{}' is a built-in template id", template.id),
                ));
            }

            if template.name_pattern.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.name_pattern", path),
                    "name_pattern cannot be empty",
                ));
            }

            if template.task_types.is_empty() {
                result.add_warning(ValidationWarning::new(
                    format!("{}.task_types", path),
                    "template has no task types and is only reachable by explicit id",
                ));
            }

            for (j, channel) in template.channels.iter().enumerate() {
                let channel_path = format!("{}.channels[{}]", path, j);

                if channel.name_pattern.trim().is_empty() {
                    result.add_error(ValidationError::new(
                        format!("{}.name_pattern", channel_path),
                        "name_pattern cannot be empty",
                    ));
                }

                if channel.agent_roles.is_some() && channel.kind != ChannelKind::Agent {
                    result.add_warning(ValidationWarning::new(
                        format!("{}.agent_roles", channel_path),
                        "agent_roles only applies to agent channels",
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
