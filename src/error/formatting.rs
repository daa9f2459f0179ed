//! Error formatting utilities
//!
//! Turns errors into the text shown in user notifications and into
//! structured records for logging.

use crate::Error;
use std::error::Error as StdError;

/// Format error for display, appending every nested cause
///
/// This is the "message plus trace" body used by free-tier notifications.
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::UploadFailed { message, stage } => match stage {
            Some(stage) => format!("Image upload failed at {}: {}", stage, message),
            None => format!("Image upload failed: {}", message),
        },

        Error::InvalidImage { file_name, reason } => {
            format!("Invalid image '{}': {}", file_name, reason)
        }

        Error::Internal { message, context } => match context {
            Some(context) => format!("Internal error in {}: {}", context, message),
            None => format!("Internal error: {}", message),
        },

        // For standard errors, use their Display implementation
        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{}\n  caused by: {}", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
        "provider_rejection": error.is_provider_rejection(),
    });

    match error {
        Error::UploadFailed {
            stage: Some(stage), ..
        } => {
            log_data["stage"] = serde_json::Value::String(stage.clone());
        }
        Error::InvalidImage { file_name, .. } => {
            log_data["file_name"] = serde_json::Value::String(file_name.clone());
        }
        Error::Http(e) => {
            if let Some(status) = e.status() {
                log_data["status"] = serde_json::Value::Number(status.as_u16().into());
            }
        }
        _ => {}
    }

    log_data
}
