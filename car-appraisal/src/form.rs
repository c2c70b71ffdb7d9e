// Form state, validation, and request-body construction.
//
// Fields are kept as the raw text the user typed. Parsing and trimming happen
// only when the form is validated or turned into a `ValuationRequest`, so the
// same rules back both operations.

use thiserror::Error;

use crate::protocol::{Identification, ValuationRequest, VehicleData};
use crate::session::SessionId;

/// Oldest model year the valuation service accepts.
pub const MIN_YEAR: u16 = 1990;
/// Newest model year the valuation service accepts.
pub const MAX_YEAR: u16 = 2025;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The plate is required")]
    MissingPlate,

    #[error("The brand is required")]
    MissingBrand,

    #[error("The model is required")]
    MissingModel,

    #[error("The year must be between {min} and {max}", min = MIN_YEAR, max = MAX_YEAR)]
    YearOutOfRange,

    #[error("The mileage must be a whole number of kilometers")]
    InvalidMileage,
}

// ---------------------------------------------------------------------------
// Input mode and fields
// ---------------------------------------------------------------------------

/// Which identification the user is entering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Plate,
    Vehicle,
}

impl InputMode {
    pub fn toggle(self) -> Self {
        match self {
            InputMode::Plate => InputMode::Vehicle,
            InputMode::Vehicle => InputMode::Plate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputMode::Plate => "By plate",
            InputMode::Vehicle => "By vehicle data",
        }
    }

    /// Editable fields for this mode, in focus order. Mileage is shared.
    pub fn fields(self) -> &'static [FormField] {
        match self {
            InputMode::Plate => &[FormField::Plate, FormField::Kilometers],
            InputMode::Vehicle => &[
                FormField::Brand,
                FormField::Model,
                FormField::Year,
                FormField::Version,
                FormField::Kilometers,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Plate,
    Brand,
    Model,
    Year,
    Version,
    Kilometers,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Plate => "Plate *",
            FormField::Brand => "Brand *",
            FormField::Model => "Model *",
            FormField::Year => "Year *",
            FormField::Version => "Version (optional)",
            FormField::Kilometers => "Mileage (optional)",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Plate => "e.g. ABC123",
            FormField::Brand => "e.g. Toyota",
            FormField::Model => "e.g. Corolla",
            FormField::Year => "e.g. 2020",
            FormField::Version => "e.g. XLI, GLX",
            FormField::Kilometers => "e.g. 50000",
        }
    }

    /// Whether `c` may be typed into this field.
    pub fn accepts(self, c: char) -> bool {
        match self {
            FormField::Year | FormField::Kilometers => c.is_ascii_digit(),
            _ => !c.is_control(),
        }
    }
}

/// Raw text of every form field, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub version: String,
    pub kilometers: String,
}

impl FormFields {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Plate => &self.plate,
            FormField::Brand => &self.brand,
            FormField::Model => &self.model,
            FormField::Year => &self.year,
            FormField::Version => &self.version,
            FormField::Kilometers => &self.kilometers,
        }
    }

    pub fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Plate => &mut self.plate,
            FormField::Brand => &mut self.brand,
            FormField::Model => &mut self.model,
            FormField::Year => &mut self.year,
            FormField::Version => &mut self.version,
            FormField::Kilometers => &mut self.kilometers,
        }
    }

    /// Append a typed character, applying the field's input rules. Plates
    /// are stored upper-case. Returns false when the character was rejected.
    pub fn push_char(&mut self, field: FormField, c: char) -> bool {
        if !field.accepts(c) {
            return false;
        }
        let target = self.get_mut(field);
        if field == FormField::Plate {
            target.extend(c.to_uppercase());
        } else {
            target.push(c);
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Validation and request construction
// ---------------------------------------------------------------------------

/// Check the fields the active mode requires. The first failing rule is
/// reported, in plate / brand / model / year / mileage order.
pub fn validate(mode: InputMode, fields: &FormFields) -> Result<(), ValidationError> {
    parse_identification(mode, fields)?;
    parse_kilometers(&fields.kilometers)?;
    Ok(())
}

/// Build the request body for `mode`. Only the chosen identification is
/// included; blank optional fields are omitted.
pub fn build_request(
    mode: InputMode,
    fields: &FormFields,
    session_id: SessionId,
) -> Result<ValuationRequest, ValidationError> {
    let identification = parse_identification(mode, fields)?;
    let kilometers = parse_kilometers(&fields.kilometers)?;
    Ok(ValuationRequest {
        session_id,
        kilometers,
        identification,
    })
}

fn parse_identification(
    mode: InputMode,
    fields: &FormFields,
) -> Result<Identification, ValidationError> {
    match mode {
        InputMode::Plate => {
            let plate = fields.plate.trim();
            if plate.is_empty() {
                return Err(ValidationError::MissingPlate);
            }
            Ok(Identification::Plate(plate.to_uppercase()))
        }
        InputMode::Vehicle => {
            let brand = fields.brand.trim();
            if brand.is_empty() {
                return Err(ValidationError::MissingBrand);
            }
            let model = fields.model.trim();
            if model.is_empty() {
                return Err(ValidationError::MissingModel);
            }
            let year = parse_year(&fields.year)?;
            let version = fields.version.trim();
            Ok(Identification::Vehicle(VehicleData {
                brand: brand.to_string(),
                model: model.to_string(),
                year,
                version: (!version.is_empty()).then(|| version.to_string()),
            }))
        }
    }
}

fn parse_year(raw: &str) -> Result<u16, ValidationError> {
    match raw.trim().parse::<u16>() {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Ok(year),
        _ => Err(ValidationError::YearOutOfRange),
    }
}

fn parse_kilometers(raw: &str) -> Result<Option<u32>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidMileage)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
