//! Script catalog: per-state message templates.
//!
//! Each state owns an ordered list of templates. Normal flow only ever
//! renders the first entry; the rest document what a human agent would say
//! next and are kept so alternate scripts can carry them too.

use std::collections::BTreeMap;

use super::state::DialogueState;

/// Mapping of dialogue state to its ordered message templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptCatalog {
    templates: BTreeMap<DialogueState, Vec<String>>,
}

impl ScriptCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the templates for a state.
    pub fn with_templates<I, S>(mut self, state: DialogueState, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(state, templates.into_iter().map(Into::into).collect());
        self
    }

    /// Adds (or replaces) the templates for a state.
    pub fn insert(&mut self, state: DialogueState, templates: Vec<String>) {
        self.templates.insert(state, templates);
    }

    /// All templates for a state; empty when the state has no entry.
    pub fn templates(&self, state: DialogueState) -> &[String] {
        self.templates
            .get(&state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The template rendered when a state is entered.
    pub fn opening_template(&self, state: DialogueState) -> Option<&str> {
        self.templates(state).first().map(String::as_str)
    }

    /// Returns true if the catalog has an entry (possibly empty) for the state.
    pub fn has_entry(&self, state: DialogueState) -> bool {
        self.templates.contains_key(&state)
    }

    /// States with an entry, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = DialogueState> + '_ {
        self.templates.keys().copied()
    }

    /// The Hinglish overdraft script the product ships with.
    pub fn reference() -> Self {
        Self::new()
            .with_templates(DialogueState::Greeting, GREETING)
            .with_templates(DialogueState::ScriptIntroduction, SCRIPT_INTRODUCTION)
            .with_templates(DialogueState::RecordingNotice, RECORDING_NOTICE)
            .with_templates(DialogueState::EmploymentStatus, EMPLOYMENT_STATUS)
            .with_templates(DialogueState::SalaryCollection, SALARY_COLLECTION)
            .with_templates(DialogueState::BenefitsExplanation, BENEFITS_EXPLANATION)
            .with_templates(DialogueState::PersonalDetails, PERSONAL_DETAILS)
            .with_templates(DialogueState::EligibilityCheck, ELIGIBILITY_CHECK)
            .with_templates(DialogueState::BureauConsent, BUREAU_CONSENT)
            .with_templates(DialogueState::DocumentRequirements, DOCUMENT_REQUIREMENTS)
            .with_templates(DialogueState::CallClosing, CALL_CLOSING)
    }
}

// ============================================================================
// Reference script
// ============================================================================

const GREETING: [&str; 2] = [
    "Greetings!! {customer_name} Main {agent_name} Baat kar raha hun on Behalf of Bajaj Finance Limited.",
    "Kaise hain Aap Sir/Mam?",
];

const SCRIPT_INTRODUCTION: [&str; 1] = [
    "{customer_name} Ji ye call meine aap ko kiya hain ek Unique Financial Back up Plan ke liye jo ki Personal Loan Nahi hain Balki ek Flexi Overdraft Facility hain jo ki specially design Ki Gayi hain Salaried employees ke liye.",
];

const RECORDING_NOTICE: [&str; 1] = [
    "Sir/Mam..Aage badhne se pehle btana chahunga ki ye call training ya quality purpose k liye record ho rahi hai",
];

const EMPLOYMENT_STATUS: [&str; 1] = [
    "Sir Kya main Jaan Sakta Hun Aap Abhi Job Karte Hain Ya Apka apna Business Hain.",
];

const SALARY_COLLECTION: [&str; 2] = [
    "Thank You for the information Sir, Mein Batana Chahunga is Flexi Overdraft ke Antargat Aap Apni Net Salary Ka 10 Se 24 guna tak Financial Backup Le Sakte Hain jisme aap Ko Monthly EMI nahi deni hain Sirf Byaj ( Interest ) Dena hain wo bhi us amount par jo ki aap use karte hain Aur Ye Facility apke pass agle 8 saalo tak rahegi.",
    "{customer_name} Ji agar aap Mind na kare to kya mein Jaan Sakta hun Aap ki Net Take home salary kitni Hogi After all deductions.",
];

const BENEFITS_EXPLANATION: [&str; 3] = [
    "Dhanyawad Sir Jaisa apne bataya ki aap ki Monthly Net Salary {salary} Rupaye hain to aap 10 -22 lacs tak ka financial backup le sakte hain bina kissi security ke aur iss par Interest Rate Matr 1.25% monthly reducing method me hain example ke liye agar aap 100000 Rupees withdraw karte aap ki assign limit mein se aur 30 days ke liye use karte hain to aap ko 30 din ke liye Sirf 1250 rupees interest dena hoga who bhi jitna amount aap use kar rahe hain uspar na ki poore loan amount par.",
    "Aur Sir Ye 100000 Rupe aap Bajaj ko 30 din ke andar kabhi bhi lauta sakte hain. Kehne ka matlab yeh hain sir ki ap ko interest per day ke hisab se lagega aur utne din ke liye dena hoga jitney din ke liye aap funds ka istemal karenge",
    "{customer_name} Ji Ye Sukar App ko Kaisa Laga ?",
];

const PERSONAL_DETAILS: [&str; 9] = [
    "Sir Itna hi nahi Ye amount aap Jarurat padne par kitni bhi baar Withdraw kar sakte hain aur Kissi Bhi Purpose Ya emergency ke liye use kar sakte hain jaise ghar mein koi renovation Karwana ho / Ya koi Shadi Ho / Yaa ap ko kahi Investment Karna chahte Ho / Ya Bacho Ki Higher Studies ke liye bhi ye paise use kar sakte hain aur jab aap ke pass extra funds available ho to kabhi bhi repay back karke part payment facility ka laabh utha sakte hain aur apna monthly interest save kar sakte hain with no extra charges.",
    "{customer_name} Ji Age ki jankari dene se pehle Kya mein Jaan Sakta Hun App Private Sector Mein Job Karte Hain Ya Government Sector Mein",
    "{customer_name} Ji Kya aap apni Company ka Poora Naam Bata Sakte Hain.",
    "Sir/mam Iss Flexi Overdraft Facility Ki Eligibility Check Karne ke liye Kya Mein Jaan Sakta Hun Aapka Poora Naam As per Pan Card",
    "Sir Aap Ka Date of Birth Kya Hoga",
    "Sir aap Apna Poora Pan Card Number Bata Denge please",
    "Sir Aap abhi/ Presently Kiss City Mein Reh rahe hain, Iska Area Pincode Kya Hoga",
    "Aur Sir Apne Apni Company Ka Poora Name Mujhe Bataya Tha Yaha Apka Designation Kya Hoga",
    "Aur Jaisa Apne mujhe Bataya Tha apki Net Salary {salary} Monthly Hain.",
];

const ELIGIBILITY_CHECK: [&str; 1] = [
    "{customer_name} Ji Saari Jankari Dene Ke liye Dhanyawad Mein Sir abhi Bajaj Ke portal mein aap ki exact eligibility check karne ja raha hun jiske antargat mein aap ka credit Score aur aap ki monthly obligation check kaunga jiske liye aap ko ek link bhej raha hun Jo aap ko Bajaj ki Taraf se ayega aap uspar apna go ahead de dijiyega. Sir Link Bhej Kar mein aap ko again 10-15 min mein call back karta hun I hope Sir Ye number aap ka whats app par bhi available hoga.",
];

const BUREAU_CONSENT: [&str; 1] = [
    "Batana chahunga bank one time bureau report check karta hai jo ki minorly impact karta hai but timely apne repayments karne se ye recover ho jata hai.",
];

const DOCUMENT_REQUIREMENTS: [&str; 6] = [
    "Required document list shared with the customer – (As per Bank )",
    "1. 3 Months bank statement",
    "2. Last 3 months salary slips",
    "3. Aadhar/Pan card",
    "4. 1 photograph",
    "5. Address Proof",
];

const CALL_CLOSING: [&str; 4] = [
    "Sir/Ma'am batana chahunga main aapki details aage bank me forward kar raha hu eligibility check ka liye and uske baad mai apko 15-20 minute me wapas call karunga agge ki processiosng k liye.",
    "Thank You ! Sir/Ma'am",
    "Is OD se related Kya mai aur kisi prakaar se aapki sahayta kar sakta/sakti hoon?",
    "Apna kimti samay dene ke liye dhanyavaad aapka din shubh ho",
];
