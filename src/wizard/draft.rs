/// Registration draft
///
/// The flat field store behind the wizard. It carries every branch's fields
/// at once; which subset matters is decided by the branch at validation and
/// submission time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::{CourtId, DEFAULT_LANGUAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Client,
    Lawyer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Lawyer => "lawyer",
        }
    }
}

/// How a lawyer intends to use the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawyerMode {
    /// Public profile listed for clients to hire
    Marketplace,
    /// Practice-management dashboard only
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawyerWorkMode {
    Solo,
    CreateFirm,
    JoinFirm,
}

/// Per-court entry of the courts map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourtSelection {
    pub selected: bool,
    pub case_count: Option<String>,
}

/// Every key the draft exposes; `as_str` is the error-map and wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    UserType,
    LawyerMode,
    LawyerWorkMode,
    FirstName,
    LastName,
    Username,
    Email,
    Password,
    ConfirmPassword,
    Phone,
    Nationality,
    Region,
    City,
    IsLicensed,
    LicenseNumber,
    Courts,
    YearsOfExperience,
    WorkType,
    Specializations,
    Languages,
    Bio,
    FirmName,
    FirmNameEn,
    FirmLicenseNumber,
    FirmEmail,
    FirmPhone,
    FirmAddress,
    FirmWebsite,
    FirmDescription,
    FirmSpecializations,
    InvitationCode,
    IsRegisteredKhebra,
    ServiceType,
    PricingModel,
    HourlyRateMin,
    HourlyRateMax,
    AcceptsRemote,
    AgreedTerms,
    AgreedPrivacy,
    AgreedConflict,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::UserType => "userType",
            Field::LawyerMode => "lawyerMode",
            Field::LawyerWorkMode => "lawyerWorkMode",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Phone => "phone",
            Field::Nationality => "nationality",
            Field::Region => "region",
            Field::City => "city",
            Field::IsLicensed => "isLicensed",
            Field::LicenseNumber => "licenseNumber",
            Field::Courts => "courts",
            Field::YearsOfExperience => "yearsOfExperience",
            Field::WorkType => "workType",
            Field::Specializations => "specializations",
            Field::Languages => "languages",
            Field::Bio => "bio",
            Field::FirmName => "firmName",
            Field::FirmNameEn => "firmNameEn",
            Field::FirmLicenseNumber => "firmLicenseNumber",
            Field::FirmEmail => "firmEmail",
            Field::FirmPhone => "firmPhone",
            Field::FirmAddress => "firmAddress",
            Field::FirmWebsite => "firmWebsite",
            Field::FirmDescription => "firmDescription",
            Field::FirmSpecializations => "firmSpecializations",
            Field::InvitationCode => "invitationCode",
            Field::IsRegisteredKhebra => "isRegisteredKhebra",
            Field::ServiceType => "serviceType",
            Field::PricingModel => "pricingModel",
            Field::HourlyRateMin => "hourlyRateMin",
            Field::HourlyRateMax => "hourlyRateMax",
            Field::AcceptsRemote => "acceptsRemote",
            Field::AgreedTerms => "agreedTerms",
            Field::AgreedPrivacy => "agreedPrivacy",
            Field::AgreedConflict => "agreedConflict",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat field store for one wizard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationDraft {
    // Branch selection
    pub user_type: Option<UserType>,
    pub lawyer_mode: Option<LawyerMode>,
    pub lawyer_work_mode: Option<LawyerWorkMode>,

    // Identity
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,

    // Location
    pub nationality: String,
    pub region: String,
    pub city: String,

    // Licensing
    pub is_licensed: Option<bool>,
    pub license_number: String,

    // Marketplace profile
    pub courts: BTreeMap<CourtId, CourtSelection>,
    pub years_of_experience: String,
    pub work_type: String,
    pub specializations: Vec<String>,
    pub languages: Vec<String>,
    pub bio: String,
    pub is_registered_khebra: Option<bool>,
    pub service_type: String,
    pub pricing_model: Vec<String>,
    pub hourly_rate_min: String,
    pub hourly_rate_max: String,
    pub accepts_remote: Option<bool>,

    // Firm creation
    pub firm_name: String,
    pub firm_name_en: String,
    pub firm_license_number: String,
    pub firm_email: String,
    pub firm_phone: String,
    pub firm_address: String,
    pub firm_website: String,
    pub firm_description: String,
    pub firm_specializations: Vec<String>,

    // Joining a firm
    pub invitation_code: String,

    // Consent
    pub agreed_terms: bool,
    pub agreed_privacy: bool,
    pub agreed_conflict: bool,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            user_type: None,
            lawyer_mode: None,
            lawyer_work_mode: None,
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            phone: String::new(),
            nationality: String::new(),
            region: String::new(),
            city: String::new(),
            is_licensed: None,
            license_number: String::new(),
            courts: BTreeMap::new(),
            years_of_experience: String::new(),
            work_type: String::new(),
            specializations: Vec::new(),
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            bio: String::new(),
            is_registered_khebra: None,
            service_type: String::new(),
            pricing_model: Vec::new(),
            hourly_rate_min: String::new(),
            hourly_rate_max: String::new(),
            accepts_remote: None,
            firm_name: String::new(),
            firm_name_en: String::new(),
            firm_license_number: String::new(),
            firm_email: String::new(),
            firm_phone: String::new(),
            firm_address: String::new(),
            firm_website: String::new(),
            firm_description: String::new(),
            firm_specializations: Vec::new(),
            invitation_code: String::new(),
            agreed_terms: false,
            agreed_privacy: false,
            agreed_conflict: false,
        }
    }
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_lawyer(&self) -> bool {
        self.user_type == Some(UserType::Lawyer)
    }

    /// Add the item if absent, remove it if present
    pub fn toggle_specialization(&mut self, item: &str) {
        toggle(&mut self.specializations, item);
    }

    pub fn toggle_pricing_model(&mut self, item: &str) {
        toggle(&mut self.pricing_model, item);
    }

    pub fn toggle_language(&mut self, item: &str) {
        toggle(&mut self.languages, item);
    }

    /// Update one court entry, keeping whatever else it already had
    pub fn set_court(&mut self, court: CourtId, selected: bool, case_count: Option<String>) {
        let entry = self.courts.entry(court).or_default();
        entry.selected = selected;
        if case_count.is_some() {
            entry.case_count = case_count;
        }
    }

    pub fn has_selected_court(&self) -> bool {
        self.courts.values().any(|c| c.selected)
    }

    /// Courts flagged `selected`, in id order
    pub fn selected_courts(&self) -> impl Iterator<Item = (&CourtId, &CourtSelection)> {
        self.courts.iter().filter(|(_, c)| c.selected)
    }
}

fn toggle(items: &mut Vec<String>, item: &str) {
    if let Some(pos) = items.iter().position(|i| i == item) {
        items.remove(pos);
    } else {
        items.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_defaults() {
        let draft = RegistrationDraft::new();
        assert!(draft.user_type.is_none());
        assert!(draft.is_licensed.is_none());
        assert_eq!(draft.languages, vec!["arabic".to_string()]);
        assert!(!draft.has_selected_court());
    }

    #[test]
    fn test_toggle_array_items() {
        let mut draft = RegistrationDraft::new();
        draft.toggle_specialization("labor");
        draft.toggle_specialization("family");
        assert_eq!(draft.specializations, vec!["labor", "family"]);

        draft.toggle_specialization("labor");
        assert_eq!(draft.specializations, vec!["family"]);

        draft.toggle_language("arabic");
        assert!(draft.languages.is_empty());
    }

    #[test]
    fn test_set_court_keeps_case_count() {
        let mut draft = RegistrationDraft::new();
        draft.set_court(CourtId::Labor, false, Some("11-30".to_string()));
        assert!(!draft.has_selected_court());

        draft.set_court(CourtId::Labor, true, None);
        assert!(draft.has_selected_court());

        let (id, entry) = draft.selected_courts().next().unwrap();
        assert_eq!(*id, CourtId::Labor);
        assert_eq!(entry.case_count.as_deref(), Some("11-30"));
    }

    #[test]
    fn test_draft_deserializes_partial_json() {
        let json = r#"{
            "userType": "lawyer",
            "lawyerMode": "dashboard",
            "lawyerWorkMode": "join_firm",
            "firstName": "Ali",
            "courts": { "labor": { "selected": true } }
        }"#;
        let draft: RegistrationDraft = serde_json::from_str(json).unwrap();

        assert_eq!(draft.user_type, Some(UserType::Lawyer));
        assert_eq!(draft.lawyer_mode, Some(LawyerMode::Dashboard));
        assert_eq!(draft.lawyer_work_mode, Some(LawyerWorkMode::JoinFirm));
        assert_eq!(draft.first_name, "Ali");
        assert!(draft.has_selected_court());
        assert_eq!(draft.languages, vec!["arabic".to_string()]);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::FirstName.as_str(), "firstName");
        assert_eq!(Field::InvitationCode.to_string(), "invitationCode");
        assert_eq!(Field::Courts.as_str(), "courts");
    }
}
