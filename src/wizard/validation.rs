/// Per-step validation
///
/// `validate_step` is pure: it reads the draft and returns the complete error
/// set for one step. Callers replace their error map with the result rather
/// than merging it.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::branch::Branch;
use super::draft::{Field, LawyerWorkMode, RegistrationDraft};
use super::steps::WizardStep;

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_USERNAME_TOO_SHORT: &str = "Must be at least 3 characters";
pub const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub const MSG_INVALID_PHONE: &str = "Invalid mobile number, expected 05XXXXXXXX";
pub const MSG_INVITATION_REQUIRED: &str = "Invitation code is required";
pub const MSG_INVITATION_TOO_SHORT: &str = "Invitation code must be at least 4 characters";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_CHOOSE_OPTION: &str = "Please choose an option";
pub const MSG_SELECT_COURT: &str = "Select at least one court";
pub const MSG_SELECT_AT_LEAST_ONE: &str = "Select at least one option";
pub const MSG_MUST_AGREE: &str = "Please accept to continue";
pub const MSG_INVALID_NUMBER: &str = "Enter a whole number";

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_INVITATION_CODE_LEN: usize = 4;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^05[0-9]{8}$";

fn pattern_matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern_matches(&EMAIL, EMAIL_PATTERN, value)
}

/// Saudi mobile number: `05` followed by eight digits
pub fn is_valid_phone(value: &str) -> bool {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern_matches(&PHONE, PHONE_PATTERN, value)
}

/// Field-keyed validation messages for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<Field, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

/// Validate one numbered step of the draft's branch.
///
/// Steps outside the branch's plan (including step 0) yield no errors.
pub fn validate_step(step: usize, draft: &RegistrationDraft) -> ErrorMap {
    let mut errors = ErrorMap::new();

    let Some(branch) = Branch::from_draft(draft) else {
        if step == 1 {
            check_basic_info(None, draft, &mut errors);
        }
        return errors;
    };

    match branch.plan().step_at(step) {
        Some(WizardStep::BasicInfo) => check_basic_info(Some(branch), draft, &mut errors),
        Some(WizardStep::AccountAndLocation) => {
            check_password(draft, &mut errors);
            check_location(draft, &mut errors);
        }
        Some(WizardStep::AccountAndPhone) => {
            check_password(draft, &mut errors);
            check_phone(&draft.phone, Field::Phone, &mut errors);
        }
        Some(WizardStep::Location) => check_location(draft, &mut errors),
        Some(WizardStep::FirmDetails) => check_firm(draft, &mut errors),
        Some(WizardStep::Licensing) => {
            if draft.is_licensed.is_none() {
                errors.insert(Field::IsLicensed, MSG_CHOOSE_OPTION);
            }
        }
        Some(WizardStep::Courts) => {
            if !draft.has_selected_court() {
                errors.insert(Field::Courts, MSG_SELECT_COURT);
            }
        }
        Some(WizardStep::Experience) => {
            if draft.years_of_experience.trim().is_empty() {
                errors.insert(Field::YearsOfExperience, MSG_REQUIRED);
            } else if !is_whole_number(&draft.years_of_experience) {
                errors.insert(Field::YearsOfExperience, MSG_INVALID_NUMBER);
            }
            require_text(&draft.work_type, Field::WorkType, &mut errors);
            require_any(&draft.specializations, Field::Specializations, &mut errors);
            require_any(&draft.languages, Field::Languages, &mut errors);
        }
        Some(WizardStep::KhebraRegistration) => {
            if draft.is_registered_khebra.is_none() {
                errors.insert(Field::IsRegisteredKhebra, MSG_CHOOSE_OPTION);
            }
        }
        Some(WizardStep::Services) => {
            require_text(&draft.service_type, Field::ServiceType, &mut errors);
            require_any(&draft.pricing_model, Field::PricingModel, &mut errors);
            if draft.accepts_remote.is_none() {
                errors.insert(Field::AcceptsRemote, MSG_REQUIRED);
            }
            // Rates are optional, but must be numbers when given
            for (value, field) in [
                (&draft.hourly_rate_min, Field::HourlyRateMin),
                (&draft.hourly_rate_max, Field::HourlyRateMax),
            ] {
                if !value.trim().is_empty() && !is_whole_number(value) {
                    errors.insert(field, MSG_INVALID_NUMBER);
                }
            }
        }
        Some(WizardStep::Terms) => {
            if !draft.agreed_terms {
                errors.insert(Field::AgreedTerms, MSG_MUST_AGREE);
            }
            if !draft.agreed_privacy {
                errors.insert(Field::AgreedPrivacy, MSG_MUST_AGREE);
            }
            if branch.is_lawyer() && !draft.agreed_conflict {
                errors.insert(Field::AgreedConflict, MSG_MUST_AGREE);
            }
        }
        None => {}
    }

    errors
}

fn check_basic_info(branch: Option<Branch>, draft: &RegistrationDraft, errors: &mut ErrorMap) {
    require_text(&draft.first_name, Field::FirstName, errors);
    require_text(&draft.last_name, Field::LastName, errors);

    if draft.username.trim().is_empty() {
        errors.insert(Field::Username, MSG_REQUIRED);
    } else if draft.username.chars().count() < MIN_USERNAME_LEN {
        errors.insert(Field::Username, MSG_USERNAME_TOO_SHORT);
    }

    if draft.email.trim().is_empty() {
        errors.insert(Field::Email, MSG_REQUIRED);
    } else if !is_valid_email(&draft.email) {
        errors.insert(Field::Email, MSG_INVALID_EMAIL);
    }

    let Some(branch) = branch else {
        return;
    };

    if branch.collects_phone_with_identity() {
        check_phone(&draft.phone, Field::Phone, errors);
    }

    if branch.work_mode() == Some(LawyerWorkMode::JoinFirm) {
        let code = draft.invitation_code.trim();
        if code.is_empty() {
            errors.insert(Field::InvitationCode, MSG_INVITATION_REQUIRED);
        } else if code.chars().count() < MIN_INVITATION_CODE_LEN {
            errors.insert(Field::InvitationCode, MSG_INVITATION_TOO_SHORT);
        }
    }
}

fn check_password(draft: &RegistrationDraft, errors: &mut ErrorMap) {
    if draft.password.is_empty() {
        errors.insert(Field::Password, MSG_REQUIRED);
    } else if draft.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(Field::Password, MSG_PASSWORD_TOO_SHORT);
    }

    if draft.confirm_password.is_empty() {
        errors.insert(Field::ConfirmPassword, MSG_REQUIRED);
    } else if draft.password != draft.confirm_password {
        errors.insert(Field::ConfirmPassword, MSG_PASSWORD_MISMATCH);
    }
}

fn check_location(draft: &RegistrationDraft, errors: &mut ErrorMap) {
    require_text(&draft.nationality, Field::Nationality, errors);
    require_text(&draft.region, Field::Region, errors);
    require_text(&draft.city, Field::City, errors);
}

fn check_firm(draft: &RegistrationDraft, errors: &mut ErrorMap) {
    require_text(&draft.firm_name, Field::FirmName, errors);
    require_text(&draft.firm_license_number, Field::FirmLicenseNumber, errors);

    if draft.firm_email.trim().is_empty() {
        errors.insert(Field::FirmEmail, MSG_REQUIRED);
    } else if !is_valid_email(&draft.firm_email) {
        errors.insert(Field::FirmEmail, MSG_INVALID_EMAIL);
    }

    check_phone(&draft.firm_phone, Field::FirmPhone, errors);
    require_text(&draft.firm_address, Field::FirmAddress, errors);
}

fn check_phone(value: &str, field: Field, errors: &mut ErrorMap) {
    if value.is_empty() {
        errors.insert(field, MSG_REQUIRED);
    } else if !is_valid_phone(value) {
        errors.insert(field, MSG_INVALID_PHONE);
    }
}

/// Same parse the payload uses for numeric fields
pub fn is_whole_number(value: &str) -> bool {
    value.trim().parse::<u32>().is_ok()
}

fn require_text(value: &str, field: Field, errors: &mut ErrorMap) {
    if value.trim().is_empty() {
        errors.insert(field, MSG_REQUIRED);
    }
}

fn require_any(values: &[String], field: Field, errors: &mut ErrorMap) {
    if values.is_empty() {
        errors.insert(field, MSG_SELECT_AT_LEAST_ONE);
    }
}
