// Form validation: raw field text in, request bodies out.
//
// Runs before any request is made. A form that fails here sends nothing and
// stays open with the error shown inline.

use buildbidz_core::model::{
    JobCategory, NewBid, NewJob, PaymentConfirmation, ProfileUpdate, RegisterRequest,
    ResetPassword, Role, SalesmanBid,
};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid price")]
    InvalidPrice,

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Role must be buyer or supplier")]
    InvalidRole,

    #[error("New passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn email(value: &str) -> Result<String, FormError> {
    let value = required(value, "Email")?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value),
        _ => Err(FormError::InvalidEmail),
    }
}

fn new_password(password: &str, confirm: &str) -> Result<String, FormError> {
    if password.is_empty() {
        return Err(FormError::Required("Password"));
    }
    if password != confirm {
        return Err(FormError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    Ok(password.to_string())
}

/// Price must parse as a finite number greater than zero. Thousands
/// separators and a leading rupee sign are tolerated.
pub fn parse_price(value: &str) -> Result<f64, FormError> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(FormError::InvalidPrice),
    }
}

// ---------------------------------------------------------------------------
// Session forms
// ---------------------------------------------------------------------------

pub fn login(email_field: &str, password: &str) -> Result<(String, String), FormError> {
    let email = email(email_field)?;
    if password.is_empty() {
        return Err(FormError::Required("Password"));
    }
    Ok((email, password.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub company_name: String,
    pub contact_phone: String,
    pub role: String,
    pub gst_number: String,
    pub address: String,
}

pub fn register(input: &RegisterInput) -> Result<RegisterRequest, FormError> {
    let email = email(&input.email)?;
    let company_name = required(&input.company_name, "Company name")?;
    let contact_phone = required(&input.contact_phone, "Contact phone")?;
    let role = Role::parse(&input.role)
        .filter(|r| Role::self_service().contains(r))
        .ok_or(FormError::InvalidRole)?;
    let password = new_password(&input.password, &input.confirm_password)?;
    Ok(RegisterRequest {
        email,
        password,
        company_name,
        contact_phone,
        role,
        gst_number: optional(&input.gst_number),
        address: optional(&input.address),
    })
}

pub fn forgot_password(email_field: &str) -> Result<String, FormError> {
    email(email_field)
}

pub fn reset_password(
    email_field: &str,
    reset_code: &str,
    password: &str,
    confirm: &str,
) -> Result<ResetPassword, FormError> {
    Ok(ResetPassword {
        email: email(email_field)?,
        reset_code: required(reset_code, "Reset code")?,
        new_password: new_password(password, confirm)?,
    })
}

/// Returns `(current, new)`.
pub fn change_password(
    current: &str,
    password: &str,
    confirm: &str,
) -> Result<(String, String), FormError> {
    if current.is_empty() {
        return Err(FormError::Required("Current password"));
    }
    Ok((current.to_string(), new_password(password, confirm)?))
}

pub fn profile(
    company_name: &str,
    contact_phone: &str,
    gst_number: &str,
    address: &str,
) -> Result<ProfileUpdate, FormError> {
    Ok(ProfileUpdate {
        company_name: required(company_name, "Company name")?,
        contact_phone: required(contact_phone, "Contact phone")?,
        gst_number: optional(gst_number),
        address: optional(address),
    })
}

// ---------------------------------------------------------------------------
// Marketplace forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct JobInput {
    pub title: String,
    pub category: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub delivery_timeline: String,
    pub budget_range: String,
}

pub fn new_job(input: &JobInput) -> Result<NewJob, FormError> {
    let title = required(&input.title, "Title")?;
    let category_text = required(&input.category, "Category")?;
    let category = JobCategory::parse(&category_text)
        .ok_or(FormError::InvalidCategory(category_text))?;
    Ok(NewJob {
        title,
        category,
        description: required(&input.description, "Description")?,
        quantity: optional(&input.quantity),
        location: required(&input.location, "Location")?,
        delivery_timeline: required(&input.delivery_timeline, "Delivery timeline")?,
        budget_range: optional(&input.budget_range),
    })
}

pub fn bid(price: &str, delivery_estimate: &str, notes: &str) -> Result<NewBid, FormError> {
    Ok(NewBid {
        price_quote: parse_price(price)?,
        delivery_estimate: required(delivery_estimate, "Delivery estimate")?,
        notes: optional(notes),
    })
}

#[derive(Debug, Clone, Default)]
pub struct SalesmanBidInput {
    pub price: String,
    pub delivery_estimate: String,
    pub notes: String,
    pub company_name: String,
    pub company_contact_phone: String,
    pub company_email: String,
    pub company_gst_number: String,
    pub company_address: String,
}

pub fn salesman_bid(input: &SalesmanBidInput) -> Result<SalesmanBid, FormError> {
    let base = bid(&input.price, &input.delivery_estimate, &input.notes)?;
    Ok(SalesmanBid {
        price_quote: base.price_quote,
        delivery_estimate: base.delivery_estimate,
        notes: base.notes,
        company_name: required(&input.company_name, "Company name")?,
        company_contact_phone: required(&input.company_contact_phone, "Company phone")?,
        company_email: email(&input.company_email)?,
        company_gst_number: optional(&input.company_gst_number),
        company_address: optional(&input.company_address),
    })
}

/// A message needs text unless files are attached.
pub fn message(text: &str, has_attachments: bool) -> Result<String, FormError> {
    let trimmed = text.trim();
    if trimmed.is_empty() && !has_attachments {
        return Err(FormError::Required("Message"));
    }
    Ok(trimmed.to_string())
}

pub fn payment_confirmation(
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<PaymentConfirmation, FormError> {
    Ok(PaymentConfirmation {
        order_id: required(order_id, "Order id")?,
        payment_id: required(payment_id, "Payment id")?,
        signature: required(signature, "Signature")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bid_with_empty_notes() {
        let bid = bid("125000", "10 days", "   ").unwrap();
        assert_eq!(bid.price_quote, 125_000.0);
        assert_eq!(bid.delivery_estimate, "10 days");
        assert_eq!(bid.notes, None);
    }

    #[test]
    fn price_must_be_positive_number() {
        assert_eq!(parse_price("₹1,25,000").unwrap(), 125_000.0);
        assert_eq!(parse_price("99.50").unwrap(), 99.5);
        assert_eq!(parse_price("abc"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price(""), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("0"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("-5"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("NaN"), Err(FormError::InvalidPrice));
    }

    #[test]
    fn bid_requires_delivery_estimate() {
        assert_eq!(
            bid("500", "", ""),
            Err(FormError::Required("Delivery estimate"))
        );
    }

    #[test]
    fn passwords_must_match_and_be_long_enough() {
        assert_eq!(
            change_password("old", "secret1", "secret2"),
            Err(FormError::PasswordMismatch)
        );
        assert_eq!(
            change_password("old", "abc", "abc"),
            Err(FormError::PasswordTooShort)
        );
        assert_eq!(
            change_password("", "secret1", "secret1"),
            Err(FormError::Required("Current password"))
        );
        assert_eq!(
            change_password("old", "secret1", "secret1").unwrap(),
            ("old".to_string(), "secret1".to_string())
        );
    }

    #[test]
    fn register_only_offers_buyer_and_supplier() {
        let mut input = RegisterInput {
            email: "site@acme.in".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            company_name: " Acme Infra ".into(),
            contact_phone: "9876543210".into(),
            role: "Supplier".into(),
            ..Default::default()
        };
        let req = register(&input).unwrap();
        assert_eq!(req.role, Role::Supplier);
        assert_eq!(req.company_name, "Acme Infra");
        assert_eq!(req.gst_number, None);

        input.role = "admin".into();
        assert_eq!(register(&input), Err(FormError::InvalidRole));
    }

    #[test]
    fn login_checks_email_shape() {
        assert_eq!(login("nobody", "pw"), Err(FormError::InvalidEmail));
        assert_eq!(login("a@b.in", ""), Err(FormError::Required("Password")));
        assert!(login(" a@b.in ", "pw").is_ok());
    }

    #[test]
    fn job_category_and_optional_fields() {
        let input = JobInput {
            title: "Ready-mix concrete".into(),
            category: "materials".into(),
            description: "M25 grade".into(),
            quantity: "".into(),
            location: "Pune".into(),
            delivery_timeline: "2 weeks".into(),
            budget_range: "5-6 lakh".into(),
        };
        let job = new_job(&input).unwrap();
        assert_eq!(job.category, JobCategory::Material);
        assert_eq!(job.quantity, None);
        assert_eq!(job.budget_range.as_deref(), Some("5-6 lakh"));

        let bad = JobInput {
            category: "plumbing".into(),
            ..input
        };
        assert_eq!(
            new_job(&bad),
            Err(FormError::InvalidCategory("plumbing".into()))
        );
    }

    #[test]
    fn message_may_be_empty_with_attachments() {
        assert_eq!(message("  ", false), Err(FormError::Required("Message")));
        assert_eq!(message("", true).unwrap(), "");
        assert_eq!(message(" hi ", false).unwrap(), "hi");
    }

    #[test]
    fn salesman_bid_needs_company_details() {
        let input = SalesmanBidInput {
            price: "4500".into(),
            delivery_estimate: "3 days".into(),
            company_name: "Sharma Traders".into(),
            company_contact_phone: "9000000000".into(),
            company_email: "".into(),
            ..Default::default()
        };
        assert_eq!(salesman_bid(&input), Err(FormError::Required("Email")));
    }
}
