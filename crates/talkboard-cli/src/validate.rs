use crate::output::CliError;
use talkboard_core::ErrorCode;
use talkboard_core::store::Collection;

/// Hex digits after the `<prefix>-` of a generated id.
pub const ID_HEX_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError {
            message: format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            suggestion: Some(self.suggestion.clone()),
            error_code: Some(ErrorCode::ValidationInvalid.code().to_string()),
        }
    }
}

/// Check that `raw` looks like an id from `collection` before hitting the
/// store, so a voice id passed to `tb idea advance` fails with a clear hint.
pub fn validate_record_id(collection: Collection, raw: &str) -> Result<(), ValidationError> {
    let prefix = collection.id_prefix();
    let suggestion = format!("run `tb {} list` to find a valid id", command_noun(collection));

    let Some(hex) = raw
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return Err(ValidationError::new(
            "id",
            raw,
            format!("{collection} ids start with '{prefix}-'"),
            suggestion,
        ));
    };

    if hex.len() != ID_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::new(
            "id",
            raw,
            format!("expected {ID_HEX_LEN} hex digits after '{prefix}-'"),
            suggestion,
        ));
    }
    Ok(())
}

const fn command_noun(collection: Collection) -> &'static str {
    match collection {
        Collection::Ideas => "idea",
        Collection::Actions => "action",
        Collection::VoiceMessages => "voice",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_generated_shape() {
        assert!(validate_record_id(Collection::Ideas, "id-0a1b2c3d4e").is_ok());
        assert!(validate_record_id(Collection::VoiceMessages, "vm-ffffffffff").is_ok());
    }

    #[test]
    fn rejects_wrong_prefix_with_list_hint() {
        let err = validate_record_id(Collection::Actions, "id-0a1b2c3d4e").expect_err("prefix");
        assert!(err.reason.contains("'ac-'"), "{}", err.reason);
        assert_eq!(err.suggestion, "run `tb action list` to find a valid id");
    }

    #[test]
    fn rejects_short_or_non_hex_suffix() {
        assert!(validate_record_id(Collection::Ideas, "id-abc").is_err());
        assert!(validate_record_id(Collection::Ideas, "id-zzzzzzzzzz").is_err());
        let cli = validate_record_id(Collection::Ideas, "x")
            .expect_err("bad")
            .to_cli_error();
        assert_eq!(cli.error_code.as_deref(), Some("E2005"));
    }
}
