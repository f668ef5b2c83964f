/// Wizard step definitions
///
/// Defines every screen of the registration flow and the ordered plan each
/// branch walks through.

use super::branch::Branch;
use super::draft::LawyerWorkMode;

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    /// Names, username, email (and phone / invitation code where applicable)
    BasicInfo,

    /// Password plus location (client and dashboard lawyers)
    AccountAndLocation,

    /// Password plus phone (marketplace lawyers)
    AccountAndPhone,

    /// Nationality, region and city (marketplace lawyers)
    Location,

    /// New firm details (dashboard lawyers creating a firm)
    FirmDetails,

    /// Licence status and number
    Licensing,

    /// Courts the lawyer has appeared before
    Courts,

    /// Experience, work type, specializations and languages
    Experience,

    /// Khebra platform registration status
    KhebraRegistration,

    /// Service type, pricing and remote work
    Services,

    /// Terms, privacy and conflict-of-interest consent
    Terms,
}

impl WizardStep {
    /// Get step title
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Information",
            WizardStep::AccountAndLocation => "Password & Location",
            WizardStep::AccountAndPhone => "Password & Phone",
            WizardStep::Location => "Location",
            WizardStep::FirmDetails => "Firm Details",
            WizardStep::Licensing => "Licensing",
            WizardStep::Courts => "Courts",
            WizardStep::Experience => "Experience",
            WizardStep::KhebraRegistration => "Khebra Registration",
            WizardStep::Services => "Services & Pricing",
            WizardStep::Terms => "Terms & Consent",
        }
    }

    /// Get step description
    pub fn description(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Tell us who you are and how to reach you",
            WizardStep::AccountAndLocation => "Secure your account and tell us where you live",
            WizardStep::AccountAndPhone => "Secure your account and add a mobile number",
            WizardStep::Location => "Tell us where you practise",
            WizardStep::FirmDetails => "Register the firm you are creating",
            WizardStep::Licensing => "Let clients know whether you hold a practising licence",
            WizardStep::Courts => "Select the courts you have experience with",
            WizardStep::Experience => "Describe your experience and areas of practice",
            WizardStep::KhebraRegistration => "Are you registered on the Khebra platform?",
            WizardStep::Services => "Choose how you offer and price your services",
            WizardStep::Terms => "Review and accept the terms to finish",
        }
    }

    /// Check if this is the consent step that ends every plan
    pub fn is_terms(&self) -> bool {
        matches!(self, WizardStep::Terms)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

const CLIENT_PLAN: &[WizardStep] = &[
    WizardStep::BasicInfo,
    WizardStep::AccountAndLocation,
    WizardStep::Terms,
];

const CREATE_FIRM_PLAN: &[WizardStep] = &[
    WizardStep::BasicInfo,
    WizardStep::AccountAndLocation,
    WizardStep::FirmDetails,
    WizardStep::Terms,
];

const MARKETPLACE_PLAN: &[WizardStep] = &[
    WizardStep::BasicInfo,
    WizardStep::AccountAndPhone,
    WizardStep::Location,
    WizardStep::Licensing,
    WizardStep::Courts,
    WizardStep::Experience,
    WizardStep::KhebraRegistration,
    WizardStep::Services,
    WizardStep::Terms,
];

/// Ordered steps for one branch. Step numbers are 1-indexed; step 0 is
/// branch selection and sits outside the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    steps: &'static [WizardStep],
}

impl StepPlan {
    /// Total used while the branch is still undetermined
    pub const FALLBACK_TOTAL: usize = 3;

    pub fn for_branch(branch: Branch) -> Self {
        let steps = match branch {
            Branch::Client => CLIENT_PLAN,
            Branch::Marketplace => MARKETPLACE_PLAN,
            Branch::Dashboard(Some(LawyerWorkMode::CreateFirm)) => CREATE_FIRM_PLAN,
            Branch::Dashboard(_) => CLIENT_PLAN,
        };
        Self { steps }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Step at a 1-indexed position
    pub fn step_at(&self, number: usize) -> Option<WizardStep> {
        number.checked_sub(1).and_then(|i| self.steps.get(i)).copied()
    }

    /// 1-indexed position of a step within this plan
    pub fn number_of(&self, step: WizardStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step).map(|i| i + 1)
    }

    pub fn terms_step(&self) -> usize {
        self.total_steps()
    }

    pub fn is_final(&self, number: usize) -> bool {
        number == self.total_steps()
    }

    pub fn steps(&self) -> &'static [WizardStep] {
        self.steps
    }
}
