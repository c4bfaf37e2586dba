use fest_common::Rupees;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    db_types::{NewRegistration, ParticipationType, Registration, TeamMember},
    fest_api::errors::RegistrationError,
    helpers::{normalise_email, normalise_text, PaymentProof},
};

pub const PAYMENT_ID_PREFIX: &str = "pay_";
pub const ORDER_ID_PREFIX: &str = "order_";

/// Accepts a JSON string or number and yields its text. `null` and absent fields become `None`.
fn lenient_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected a string or a number, found {other}"))),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub college: Option<String>,
}

impl TeamMemberSubmission {
    fn validate(&self, position: usize) -> Result<TeamMember, RegistrationError> {
        let field = |value: &Option<String>, name: &str| {
            present(value).map(str::to_string).ok_or_else(|| {
                RegistrationError::Validation(format!("Missing required field: team member {position} {name}"))
            })
        };
        Ok(TeamMember {
            name: normalise_text(&field(&self.name, "name")?),
            mobile: normalise_text(&field(&self.mobile, "mobile")?),
            email: normalise_email(&field(&self.email, "email")?),
            college: normalise_text(&field(&self.college, "college")?),
        })
    }
}

/// The registration form exactly as the client sent it.
///
/// Every field is optional at this stage so that a missing field can be reported with a useful message instead of a
/// generic deserialisation failure. Numeric fields may arrive as JSON numbers or as numeric strings. The payment proof
/// may use either the form's own names (`paymentId`, ...) or the gateway's (`razorpay_payment_id`, ...); the gateway's
/// names take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_mobile: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_college: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_department: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leader_city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub selected_event: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub paper_presentation_dept: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub participation_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub team_size: Option<String>,
    #[serde(default)]
    pub team_members: Option<Vec<TeamMemberSubmission>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub signature: Option<String>,
    #[serde(default, rename = "razorpay_payment_id", deserialize_with = "lenient_text")]
    pub razorpay_payment_id: Option<String>,
    #[serde(default, rename = "razorpay_order_id", deserialize_with = "lenient_text")]
    pub razorpay_order_id: Option<String>,
    #[serde(default, rename = "razorpay_signature", deserialize_with = "lenient_text")]
    pub razorpay_signature: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub total_fee: Option<String>,
}

impl RegistrationSubmission {
    /// The payment proof carried by the form. Absent values are returned as empty strings.
    pub fn payment_proof(&self) -> PaymentProof {
        let pick = |gateway: &Option<String>, form: &Option<String>| {
            gateway
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(form.as_deref())
                .unwrap_or_default()
                .to_string()
        };
        PaymentProof {
            order_id: pick(&self.razorpay_order_id, &self.order_id),
            payment_id: pick(&self.razorpay_payment_id, &self.payment_id),
            signature: pick(&self.razorpay_signature, &self.signature),
        }
    }

    /// Checks the payment proof for presence and for the gateway's id prefixes.
    pub fn validate_payment_proof(&self) -> Result<PaymentProof, RegistrationError> {
        let proof = self.payment_proof();
        if !proof.is_complete() {
            return Err(RegistrationError::PaymentRequired);
        }
        if !proof.payment_id.starts_with(PAYMENT_ID_PREFIX) || !proof.order_id.starts_with(ORDER_ID_PREFIX) {
            return Err(RegistrationError::InvalidPaymentFormat);
        }
        Ok(proof)
    }

    /// A positive fee, parsed from a number or a numeric string.
    pub fn validate_fee(&self) -> Result<Rupees, RegistrationError> {
        let fee = present(&self.total_fee)
            .and_then(|s| s.parse::<Rupees>().ok())
            .ok_or(RegistrationError::InvalidFee)?;
        if fee.is_positive() {
            Ok(fee)
        } else {
            Err(RegistrationError::InvalidFee)
        }
    }

    /// Validates the whole submission and produces the normalised record to store.
    ///
    /// Checks run in this order: payment proof, fee, then the remaining fields, so the payment-related failures always
    /// take precedence.
    pub fn validate(&self) -> Result<NewRegistration, RegistrationError> {
        let proof = self.validate_payment_proof()?;
        let total_fee = self.validate_fee()?;
        let required = |value: &Option<String>, name: &str| {
            present(value)
                .map(str::to_string)
                .ok_or_else(|| RegistrationError::Validation(format!("Missing required field: {name}")))
        };
        let leader_name = normalise_text(&required(&self.leader_name, "leaderName")?);
        let leader_email = normalise_email(&required(&self.leader_email, "leaderEmail")?);
        let leader_mobile = normalise_text(&required(&self.leader_mobile, "leaderMobile")?);
        let leader_college = normalise_text(&required(&self.leader_college, "leaderCollege")?);
        let leader_department = normalise_text(&required(&self.leader_department, "leaderDepartment")?);
        let leader_year = normalise_text(&required(&self.leader_year, "leaderYear")?);
        let leader_city = normalise_text(&required(&self.leader_city, "leaderCity")?);
        let selected_event = normalise_text(&required(&self.selected_event, "selectedEvent")?);
        let participation_type = required(&self.participation_type, "participationType")?
            .parse::<ParticipationType>()
            .map_err(|_| RegistrationError::Validation("participationType must be either 'solo' or 'team'".into()))?;
        let team_size = required(&self.team_size, "teamSize")?
            .parse::<f64>()
            .ok()
            .filter(|n| n.fract() == 0.0 && *n >= 1.0 && *n <= f64::from(u16::MAX))
            .ok_or_else(|| RegistrationError::Validation("teamSize must be a whole number of at least 1".into()))?;
        #[allow(clippy::cast_possible_truncation)]
        let team_size = team_size as i64;
        let team_members = self
            .team_members
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, m)| m.validate(i + 1))
            .collect::<Result<Vec<TeamMember>, RegistrationError>>()?;
        let paper_presentation_dept = present(&self.paper_presentation_dept).map(normalise_text).unwrap_or_default();
        Ok(NewRegistration {
            leader_name,
            leader_email,
            leader_mobile,
            leader_college,
            leader_department,
            leader_year,
            leader_city,
            selected_event,
            paper_presentation_dept,
            participation_type,
            team_size,
            team_members,
            payment_id: proof.payment_id.trim().to_string(),
            order_id: proof.order_id.trim().to_string(),
            signature: proof.signature.trim().to_string(),
            total_fee,
        })
    }
}

/// The result of a successful registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    pub registration: Registration,
    /// False if the registration was stored but the confirmation mail could not be delivered.
    pub notification_sent: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    fn form() -> serde_json::Value {
        serde_json::json!({
            "leaderName": "  Ana Patil ",
            "leaderEmail": " Ana@Example.com",
            "leaderMobile": 9876543210u64,
            "leaderCollege": "ADCET",
            "leaderDepartment": "CSE",
            "leaderYear": "Third Year",
            "leaderCity": "Sangli",
            "selectedEvent": " TechFest ",
            "participationType": "team",
            "teamSize": "2",
            "teamMembers": [{ "name": "Ravi", "mobile": "9000000001", "email": "RAVI@example.com ", "college": "ADCET" }],
            "paymentId": "pay_P1",
            "orderId": "order_O1",
            "signature": "abc",
            "totalFee": "200"
        })
    }

    fn submission(value: serde_json::Value) -> RegistrationSubmission {
        serde_json::from_value(value).expect("valid submission json")
    }

    #[test]
    fn normalises_a_valid_form() {
        let reg = submission(form()).validate().expect("form is valid");
        assert_eq!(reg.leader_name, "Ana Patil");
        assert_eq!(reg.leader_email, "ana@example.com");
        assert_eq!(reg.leader_mobile, "9876543210");
        assert_eq!(reg.selected_event, "TechFest");
        assert_eq!(reg.participation_type, ParticipationType::Team);
        assert_eq!(reg.team_size, 2);
        assert_eq!(reg.team_members, vec![TeamMember::new("Ravi", "9000000001", "ravi@example.com", "ADCET")]);
        assert_eq!(reg.total_fee, Rupees::from(200));
        assert_eq!(reg.paper_presentation_dept, "");
    }

    #[test]
    fn payment_problems_take_precedence() {
        let mut value = form();
        value["leaderCity"] = serde_json::Value::Null;
        value["signature"] = serde_json::Value::Null;
        assert_eq!(submission(value.clone()).validate(), Err(RegistrationError::PaymentRequired));
        value["signature"] = "abc".into();
        value["paymentId"] = "P1".into();
        assert_eq!(submission(value.clone()).validate(), Err(RegistrationError::InvalidPaymentFormat));
        value["paymentId"] = "pay_P1".into();
        value["orderId"] = "O1".into();
        assert_eq!(submission(value.clone()).validate(), Err(RegistrationError::InvalidPaymentFormat));
        value["orderId"] = "order_O1".into();
        value["totalFee"] = 0.into();
        assert_eq!(submission(value.clone()).validate(), Err(RegistrationError::InvalidFee));
        value["totalFee"] = "free".into();
        assert_eq!(submission(value.clone()).validate(), Err(RegistrationError::InvalidFee));
        value["totalFee"] = 100.into();
        assert_eq!(
            submission(value).validate(),
            Err(RegistrationError::Validation("Missing required field: leaderCity".into()))
        );
    }

    #[test]
    fn gateway_field_names_win() {
        let mut value = form();
        value["razorpay_payment_id"] = "pay_GATEWAY".into();
        value["razorpay_signature"] = "".into();
        let proof = submission(value).payment_proof();
        assert_eq!(proof.payment_id, "pay_GATEWAY");
        assert_eq!(proof.order_id, "order_O1");
        assert_eq!(proof.signature, "abc");
    }

    #[test]
    fn rejects_bad_participation_and_team_size() {
        let mut value = form();
        value["participationType"] = "duo".into();
        assert!(matches!(submission(value).validate(), Err(RegistrationError::Validation(_))));
        let mut value = form();
        value["teamSize"] = 0.into();
        assert!(matches!(submission(value).validate(), Err(RegistrationError::Validation(_))));
        let mut value = form();
        value["teamSize"] = "1.5".into();
        assert!(matches!(submission(value).validate(), Err(RegistrationError::Validation(_))));
    }

    #[test]
    fn incomplete_team_member() {
        let mut value = form();
        value["teamMembers"][0]["college"] = "  ".into();
        assert_eq!(
            submission(value).validate(),
            Err(RegistrationError::Validation("Missing required field: team member 1 college".into()))
        );
    }
}
