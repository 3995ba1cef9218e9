//! Request models for the transform endpoints.

use std::str::FromStr;

use pdfsmith_core::WatermarkSpec;

use crate::error::ApiError;

/// Output selector for the convert endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvertTarget {
    #[default]
    Docx,
    Png,
}

impl FromStr for ConvertTarget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DOCX" => Ok(Self::Docx),
            "PNG" => Ok(Self::Png),
            other => Err(format!("unsupported fileType: {other}")),
        }
    }
}

/// Collected `add-watermark` form fields.
///
/// Unset fields fall back to the contract defaults ("Testing", 45, 45).
#[derive(Debug, Default)]
pub struct WatermarkForm {
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub rotation: Option<f32>,
}

impl WatermarkForm {
    pub fn set_text(&mut self, value: String) {
        self.text = Some(value);
    }

    pub fn set_font_size(&mut self, raw: &str) -> Result<(), ApiError> {
        let size: f32 = raw
            .trim()
            .parse()
            .map_err(|_| ApiError::InvalidField(format!("fontSize is not a number: {raw}")))?;
        if size <= 0.0 {
            return Err(ApiError::InvalidField(format!(
                "fontSize must be positive, got {size}"
            )));
        }
        self.font_size = Some(size);
        Ok(())
    }

    pub fn set_rotation(&mut self, raw: &str) -> Result<(), ApiError> {
        let degrees: f32 = raw
            .trim()
            .parse()
            .map_err(|_| ApiError::InvalidField(format!("rotation is not a number: {raw}")))?;
        self.rotation = Some(degrees);
        Ok(())
    }

    pub fn into_spec(self) -> WatermarkSpec {
        let defaults = WatermarkSpec::default();
        WatermarkSpec {
            text: self.text.unwrap_or(defaults.text),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            rotation: self.rotation.unwrap_or(defaults.rotation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn convert_target_defaults_to_docx() {
        assert_eq!(ConvertTarget::default(), ConvertTarget::Docx);
    }

    #[test]
    fn convert_target_parses_case_insensitively() {
        assert_eq!("docx".parse::<ConvertTarget>().unwrap(), ConvertTarget::Docx);
        assert_eq!("PNG".parse::<ConvertTarget>().unwrap(), ConvertTarget::Png);
        assert_eq!(" png ".parse::<ConvertTarget>().unwrap(), ConvertTarget::Png);
    }

    #[test]
    fn convert_target_rejects_unknown_values() {
        assert!("GIF".parse::<ConvertTarget>().is_err());
        assert!("".parse::<ConvertTarget>().is_err());
    }

    #[test]
    fn empty_form_yields_contract_defaults() {
        let spec = WatermarkForm::default().into_spec();
        assert_eq!(spec.text, "Testing");
        assert_eq!(spec.font_size, 45.0);
        assert_eq!(spec.rotation, 45.0);
    }

    #[test]
    fn font_size_must_be_a_positive_number() {
        let mut form = WatermarkForm::default();
        assert!(form.set_font_size("12.5").is_ok());
        assert!(form.set_font_size("0").is_err());
        assert!(form.set_font_size("-3").is_err());
        assert!(form.set_font_size("big").is_err());
    }

    #[test]
    fn rotation_accepts_any_angle() {
        let mut form = WatermarkForm::default();
        assert!(form.set_rotation("-90").is_ok());
        assert!(form.set_rotation("360").is_ok());
        assert!(form.set_rotation("sideways").is_err());
    }
}
