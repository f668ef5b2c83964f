/// Submission assembler
///
/// Builds the `/auth/register` body from the draft. Which keys exist depends
/// on the branch: firm data only for dashboard lawyers creating a firm, the
/// invitation code only for those joining one, and the marketplace profile
/// only for marketplace lawyers.

use serde::Serialize;
use std::collections::BTreeMap;

use super::branch::Branch;
use super::catalog::CourtId;
use super::draft::{LawyerMode, LawyerWorkMode, RegistrationDraft, UserType};
use crate::error::WizardError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub description: Option<String>,
    pub role: UserType,
    pub is_seller: bool,
    pub lawyer_mode: Option<LawyerMode>,
    pub country: String,
    pub nationality: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lawyer_work_mode: Option<LawyerWorkMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firm_data: Option<FirmData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,

    #[serde(flatten)]
    pub marketplace: Option<MarketplaceProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmData {
    pub name: String,
    pub name_en: Option<String>,
    pub license_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub specializations: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtEntry {
    pub selected: bool,
    pub case_count: Option<String>,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceProfile {
    pub is_licensed: Option<bool>,
    pub license_number: Option<String>,
    pub courts: BTreeMap<CourtId, CourtEntry>,
    pub years_of_experience: Option<u32>,
    pub work_type: Option<String>,
    pub specializations: Vec<String>,
    pub languages: Vec<String>,
    pub is_registered_khebra: Option<bool>,
    pub service_type: Option<String>,
    pub pricing_model: Vec<String>,
    pub hourly_rate_min: Option<u32>,
    pub hourly_rate_max: Option<u32>,
    pub accepts_remote: Option<bool>,
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn number(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Build the payload for the draft's branch
pub fn build_payload(
    draft: &RegistrationDraft,
    country: &str,
) -> Result<RegistrationPayload, WizardError> {
    let branch = Branch::from_draft(draft).ok_or(WizardError::BranchIncomplete)?;
    let is_lawyer = branch.is_lawyer();

    let mut payload = RegistrationPayload {
        username: draft.username.clone(),
        email: draft.email.clone(),
        password: draft.password.clone(),
        phone: draft.phone.clone(),
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        description: non_empty(&draft.bio),
        role: if is_lawyer { UserType::Lawyer } else { UserType::Client },
        is_seller: is_lawyer,
        lawyer_mode: if is_lawyer { draft.lawyer_mode } else { None },
        country: country.to_string(),
        nationality: non_empty(&draft.nationality),
        region: non_empty(&draft.region),
        city: non_empty(&draft.city),
        lawyer_work_mode: None,
        firm_data: None,
        invitation_code: None,
        marketplace: None,
    };

    match branch {
        Branch::Client => {}
        Branch::Dashboard(Some(LawyerWorkMode::CreateFirm)) => {
            payload.lawyer_work_mode = Some(LawyerWorkMode::CreateFirm);
            payload.firm_data = Some(firm_data(draft));
        }
        Branch::Dashboard(Some(LawyerWorkMode::JoinFirm)) => {
            payload.invitation_code = Some(draft.invitation_code.trim().to_string());
        }
        Branch::Dashboard(_) => {}
        Branch::Marketplace => payload.marketplace = Some(marketplace_profile(draft)),
    }

    Ok(payload)
}

fn firm_data(draft: &RegistrationDraft) -> FirmData {
    FirmData {
        name: draft.firm_name.clone(),
        name_en: non_empty(&draft.firm_name_en),
        license_number: draft.firm_license_number.clone(),
        email: non_empty(&draft.firm_email),
        phone: non_empty(&draft.firm_phone),
        address: non_empty(&draft.firm_address),
        website: non_empty(&draft.firm_website),
        description: non_empty(&draft.firm_description),
        specializations: if draft.firm_specializations.is_empty() {
            None
        } else {
            Some(draft.firm_specializations.clone())
        },
    }
}

fn marketplace_profile(draft: &RegistrationDraft) -> MarketplaceProfile {
    let courts = draft
        .selected_courts()
        .map(|(id, court)| {
            (
                *id,
                CourtEntry {
                    selected: true,
                    case_count: court.case_count.clone(),
                    name: id.display_name(),
                },
            )
        })
        .collect();

    MarketplaceProfile {
        is_licensed: draft.is_licensed,
        license_number: if draft.is_licensed == Some(true) {
            non_empty(draft.license_number.trim())
        } else {
            None
        },
        courts,
        years_of_experience: number(&draft.years_of_experience),
        work_type: non_empty(&draft.work_type),
        specializations: draft.specializations.clone(),
        languages: draft.languages.clone(),
        is_registered_khebra: draft.is_registered_khebra,
        service_type: non_empty(&draft.service_type),
        pricing_model: draft.pricing_model.clone(),
        hourly_rate_min: number(&draft.hourly_rate_min),
        hourly_rate_max: number(&draft.hourly_rate_max),
        accepts_remote: draft.accepts_remote,
    }
}
